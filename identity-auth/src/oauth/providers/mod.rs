//! External identity provider adapters.

mod api_v4;

pub mod github;
pub mod gitlab;
pub mod nextcloud;
