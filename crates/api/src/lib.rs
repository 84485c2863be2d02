//! HTTP layer for profilingpoll.
//!
//! This crate provides the questionnaire's web surface:
//!
//! - **Endpoints**: poll listing, question walkthrough, signed result page
//! - **Session**: signed-cookie session carrying walkthrough identifiers
//! - **Extractors**: client metadata (IP, user agent)
//!
//! Built on Axum 0.8. Workflow control uses 303 redirects; page payloads
//! are JSON, rendered by whatever front end sits on top.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod session;

pub use endpoints::router;
pub use middleware::AppState;
pub use session::Session;
