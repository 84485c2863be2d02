//! Result endpoints.
//!
//! The result page is addressed by a signed token wrapping the walkthrough
//! ID, so it can be bookmarked and shared without exposing the raw
//! identifier. Verification failures surface as 404.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use profilingpoll_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse, session::Session};

/// Rendered result page.
#[derive(Serialize)]
pub struct ResultPage {
    pub poll_slug: String,
    pub poll_title: String,
    pub profile_id: String,
    pub profile_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Render the best-matching profile of a completed walkthrough.
pub async fn show(
    State(state): State<AppState>,
    Path(token): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let walkthrough_id = state.signer.unsign(&token)?;
    let walkthrough = state.walkthrough_service.get_by_id(&walkthrough_id).await?;
    let profile = state
        .walkthrough_service
        .matching_profile(&walkthrough.id)
        .await?;
    let poll = state.poll_service.get_by_id(&walkthrough.poll_id).await?;

    // When this result belongs to the session's in-progress walkthrough,
    // move it into the completed bucket; later visits to the same URL keep
    // rendering without a session.
    let mut session = Session::load(&jar, &state.signer, &state.session_cookie);
    let jar = if session.current_walkthrough.as_deref() == Some(walkthrough.id.as_str()) {
        session.complete(&walkthrough.id);
        session.store(jar, &state.signer, &state.session_cookie)?
    } else {
        jar
    };

    let page = ResultPage {
        poll_slug: poll.slug,
        poll_title: poll.title,
        profile_id: profile.id,
        profile_text: profile.text,
        progress: walkthrough.progress,
        completed_at: walkthrough.completed_at.map(|at| at.to_rfc3339()),
    };
    Ok((jar, ApiResponse::ok(page)).into_response())
}

/// Optional respondent email.
#[derive(Debug, Deserialize)]
pub struct EmailSubmission {
    pub email: String,
}

/// Store the respondent's email on the walkthrough behind the token.
pub async fn record_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<EmailSubmission>,
) -> AppResult<Response> {
    let walkthrough_id = state.signer.unsign(&token)?;
    state
        .walkthrough_service
        .record_email(&walkthrough_id, &form.email)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
