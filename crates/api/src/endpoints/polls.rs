//! Poll listing and entry endpoints.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use profilingpoll_common::{AppError, AppResult};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Poll listing entry.
#[derive(Serialize)]
pub struct PollSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Poll listing.
#[derive(Serialize)]
pub struct PollListing {
    pub polls: Vec<PollSummary>,
}

/// Entry point: a single active poll is entered directly, anything else
/// degrades to a listing (including the empty one).
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let polls = state.poll_service.list_active().await?;

    if polls.len() == 1 {
        return Ok(Redirect::to(&format!("/{}", polls[0].slug)).into_response());
    }

    let listing = PollListing {
        polls: polls
            .into_iter()
            .map(|poll| PollSummary {
                id: poll.id,
                title: poll.title,
                slug: poll.slug,
                description: poll.description,
            })
            .collect(),
    };
    Ok(ApiResponse::ok(listing).into_response())
}

/// A poll is entered at its first question.
pub async fn poll_detail(
    State(state): State<AppState>,
    Path(poll_slug): Path<String>,
) -> AppResult<Response> {
    let poll = state.poll_service.get_by_slug(&poll_slug).await?;
    let first = state
        .poll_service
        .first_question(&poll.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Poll has no questions: {poll_slug}")))?;

    Ok(Redirect::to(&format!("/{}/{}", poll.slug, first.id)).into_response())
}
