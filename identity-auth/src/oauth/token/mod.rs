//! OAuth token types produced by the authorization-code exchange.

mod tokens;

pub use tokens::Tokens;
