//! Credential persistence.

pub mod token;

pub use token::{StoredToken, TokenStore};
