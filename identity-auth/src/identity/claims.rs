//! Canonical identity metadata.

use serde::{Deserialize, Serialize, Serializer};

/// Normalized metadata about the provider account.
///
/// Only canonical fields are stored. The legacy names older consumers read
/// (`avatar_url`, `full_name`, `provider_id`, `user_name`) are mirrored from
/// them when serializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ClaimsRecord")]
pub struct Claims {
    /// Provider host the identity was issued by.
    pub issuer: String,
    /// Stable provider user id.
    pub subject: String,
    pub name: String,
    pub picture: String,
    pub preferred_username: String,
    pub email: String,
    pub email_verified: bool,
}

impl Claims {
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = picture.into();
        self
    }

    pub fn with_preferred_username(mut self, username: impl Into<String>) -> Self {
        self.preferred_username = username.into();
        self
    }

    /// Account email as reported by the provider, with its verification state.
    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = email.into();
        self.email_verified = verified;
        self
    }

    /// Legacy alias of `picture`.
    pub fn avatar_url(&self) -> &str {
        &self.picture
    }

    /// Legacy alias of `name`.
    pub fn full_name(&self) -> &str {
        &self.name
    }

    /// Legacy alias of `subject`.
    pub fn provider_id(&self) -> &str {
        &self.subject
    }

    /// Legacy alias of `preferred_username`.
    pub fn user_name(&self) -> &str {
        &self.preferred_username
    }
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Wire form of `Claims`, canonical and legacy names side by side.
#[derive(Serialize)]
struct ClaimsWire<'a> {
    #[serde(rename = "iss", skip_serializing_if = "is_blank")]
    issuer: &'a str,
    #[serde(rename = "sub", skip_serializing_if = "is_blank")]
    subject: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    name: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    picture: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    preferred_username: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    email: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    email_verified: bool,

    #[serde(skip_serializing_if = "is_blank")]
    avatar_url: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    full_name: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    provider_id: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    user_name: &'a str,
}

impl Serialize for Claims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ClaimsWire {
            issuer: &self.issuer,
            subject: &self.subject,
            name: &self.name,
            picture: &self.picture,
            preferred_username: &self.preferred_username,
            email: &self.email,
            email_verified: self.email_verified,
            avatar_url: self.avatar_url(),
            full_name: self.full_name(),
            provider_id: self.provider_id(),
            user_name: self.user_name(),
        }
        .serialize(serializer)
    }
}

/// Stored metadata as read back; records written by older consumers may only
/// carry the legacy names.
#[derive(Deserialize)]
struct ClaimsRecord {
    #[serde(rename = "iss", default)]
    issuer: Option<String>,
    #[serde(rename = "sub", default)]
    subject: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    provider_id: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
}

// Missing and null both read as empty.
fn prefer(canonical: Option<String>, legacy: Option<String>) -> String {
    match canonical.filter(|value| !value.is_empty()) {
        Some(value) => value,
        None => legacy.unwrap_or_default(),
    }
}

impl From<ClaimsRecord> for Claims {
    fn from(record: ClaimsRecord) -> Self {
        Self {
            issuer: record.issuer.unwrap_or_default(),
            subject: prefer(record.subject, record.provider_id),
            name: prefer(record.name, record.full_name),
            picture: prefer(record.picture, record.avatar_url),
            preferred_username: prefer(record.preferred_username, record.user_name),
            email: record.email.unwrap_or_default(),
            email_verified: record.email_verified.unwrap_or_default(),
        }
    }
}
