//! Shared foundations for profilingpoll.
//!
//! Error type, configuration loading, ID generation and the HMAC token
//! signer used for result URLs and session cookies.

pub mod config;
pub mod error;
pub mod id;
pub mod signing;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use signing::TokenSigner;
