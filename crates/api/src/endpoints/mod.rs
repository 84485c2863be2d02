//! API endpoints.

mod polls;
mod questions;
mod results;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::AppState;

/// Create the router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(polls::index))
        .route("/result/{token}", get(results::show))
        .route("/result/{token}/email", post(results::record_email))
        .route("/{poll_slug}", get(polls::poll_detail))
        .route(
            "/{poll_slug}/{question_id}",
            get(questions::show).post(questions::submit),
        )
}
