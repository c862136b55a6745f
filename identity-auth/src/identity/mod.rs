//! Canonical identity record produced by every provider adapter.

mod claims;
mod normalize;

use serde::{Deserialize, Serialize};

pub use claims::Claims;
pub use normalize::{text, EmailList};

/// An email address attached to a provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub email: String,
    pub verified: bool,
    pub primary: bool,
}

/// Normalized identity handed to the rest of the authentication system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProvidedData {
    pub emails: Vec<Email>,
    pub metadata: Claims,
}

impl UserProvidedData {
    /// The email flagged as primary, if the provider supplied one.
    pub fn primary_email(&self) -> Option<&Email> {
        self.emails.iter().find(|email| email.primary)
    }
}
