//! Error types for the `identity-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct
//! holding an error kind and an optional chained source.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for identity-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in identity-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
}

/// Provider configuration rejected at construction time.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    Disabled,
    MissingClientId,
    MissingSecret,
    MissingRedirectUri,
    MissingHost,
    InvalidUrl,
    UnknownProvider,
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    TokenExchangeFailed,
    ProfileFetchFailed,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    /// Connection, TLS, timeout or middleware failure.
    Transport,
    /// Non-2xx response status.
    Status(u16),
    /// Body was not JSON or did not match the expected shape.
    Decode,
}

impl Error {
    /// The innermost `HttpErrorKind` in the chain, if any.
    ///
    /// Profile fetch failures wrap the executor error, so callers that want to
    /// distinguish a 401 from a timeout can look through the wrapper.
    pub fn http_kind(&self) -> Option<&HttpErrorKind> {
        if let ErrorKind::Http(kind) = &self.error_kind {
            return Some(kind);
        }
        self.source
            .as_ref()
            .and_then(|source| source.downcast_ref::<Error>())
            .and_then(Error::http_kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "Provider configuration error: {:?}", kind)?,
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_decode() {
            ErrorKind::Http(HttpErrorKind::Decode)
        } else if let Some(status) = err.status() {
            ErrorKind::Http(HttpErrorKind::Status(status.as_u16()))
        } else {
            ErrorKind::Http(HttpErrorKind::Transport)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Error {
                source: Some(err.into()),
                error_kind: ErrorKind::Http(HttpErrorKind::Transport),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::Decode),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create HTTP errors.
pub fn http_error(kind: HttpErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Http(kind),
    }
}

/// Wrap a failed profile or email fetch, keeping the executor error as source.
pub fn profile_fetch_error(source: Error) -> Error {
    Error {
        source: Some(Box::new(source)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::ProfileFetchFailed),
    }
}
