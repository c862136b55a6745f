//! OAuth 2.0 authorization-code flows against external identity providers.
//!
//! Each provider adapter turns a redirect callback's code into tokens and the
//! tokens into a normalized [`UserProvidedData`](crate::identity::UserProvidedData).

mod client;
mod config;
mod provider;
mod registry;

pub mod providers;
pub mod token;

pub use client::{random_state, OAuthClient};
pub use config::{choose_host, split_scopes, ProviderConfig};
pub use provider::{AuthorizationRequest, Provider, ProviderKind};
pub use registry::{new_provider, new_provider_with_client, Registry};
