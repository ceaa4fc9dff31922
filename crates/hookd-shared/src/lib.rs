//! # hookd-shared
//!
//! Request-scoped helpers shared by the hookd transport layer: the
//! field-level validation accumulator and the endpoint secret issuer.
//! Nothing in this crate touches persistent state.

pub mod secret;
pub mod validator;

pub use secret::new_secret;
pub use validator::Validator;
