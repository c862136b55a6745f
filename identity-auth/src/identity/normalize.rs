//! Shared normalization steps applied by every provider adapter.

use super::Email;

/// Ordered builder for the canonical email list.
///
/// Addresses taken from a provider's email listing are emitted in the order
/// they were pushed, and the profile's own address is always emitted after
/// them, whatever order the calls are made in. Empty addresses are dropped.
/// Duplicates are kept.
#[derive(Debug, Default)]
pub struct EmailList {
    listed: Vec<Email>,
    primary: Option<Email>,
}

impl EmailList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address from an email listing that carries no verification signal.
    pub fn push_unverified(&mut self, address: &str) {
        self.push_listed(address, false, false);
    }

    /// Add an address from an email listing with the flags the provider reported.
    pub fn push_listed(&mut self, address: &str, verified: bool, primary: bool) {
        if address.is_empty() {
            return;
        }
        self.listed.push(Email {
            email: address.to_string(),
            verified,
            primary,
        });
    }

    /// Set the address from the main profile resource.
    pub fn set_primary(&mut self, address: &str, verified: bool) {
        if address.is_empty() {
            return;
        }
        self.primary = Some(Email {
            email: address.to_string(),
            verified,
            primary: true,
        });
    }

    pub fn into_emails(self) -> Vec<Email> {
        let mut emails = self.listed;
        emails.extend(self.primary);
        emails
    }
}

/// Treat a missing or `null` provider string the same as an empty one.
pub fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
