//! Question walkthrough endpoints.
//!
//! One GET/POST pair per question. Both enforce the workflow invariant: a
//! question may only be visited if it is already answered (revisits change
//! the given answer) or if it is the next unanswered question in poll
//! order. Deviating requests are redirected, never failed.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use profilingpoll_common::{AppError, AppResult};
use profilingpoll_db::entities::{poll, question, walkthrough};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::ClientMeta,
    middleware::AppState,
    response::ApiResponse,
    session::Session,
};

/// Submitted answer choice.
#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    /// Selected answer ID; missing when the form was sent empty.
    pub answer: Option<String>,
}

/// Rendered question page.
#[derive(Serialize)]
pub struct QuestionPage {
    pub poll_slug: String,
    pub poll_title: String,
    pub question_id: String,
    pub question_text: String,
    pub answers: Vec<AnswerOption>,
    /// Previously given answer, for form prefill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// One selectable answer.
#[derive(Serialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

/// Where a request stands in the walkthrough workflow.
enum Workflow {
    /// No walkthrough yet; the requested question is the poll's first.
    Start,
    /// An in-progress walkthrough governs this request.
    Active {
        walkthrough: walkthrough::Model,
        state: profilingpoll_core::WalkthroughState,
    },
    /// Out of order; go there instead.
    Redirect(String),
}

/// Resolve the session's walkthrough for this poll, if it still exists.
///
/// A stale identifier or one belonging to another poll does not govern
/// this poll's workflow.
async fn session_walkthrough(
    state: &AppState,
    session: &Session,
    poll: &poll::Model,
) -> AppResult<Option<walkthrough::Model>> {
    let Some(id) = session.current_walkthrough.as_deref() else {
        return Ok(None);
    };
    let Some(walkthrough) = state.walkthrough_service.find_by_id(id).await? else {
        return Ok(None);
    };
    if walkthrough.poll_id != poll.id {
        return Ok(None);
    }
    Ok(Some(walkthrough))
}

async fn classify(
    state: &AppState,
    session: &Session,
    poll: &poll::Model,
    question: &question::Model,
) -> AppResult<Workflow> {
    match session_walkthrough(state, session, poll).await? {
        None => {
            let first = state
                .poll_service
                .first_question(&poll.id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Poll has no questions: {}", poll.slug)))?;
            if first.id == question.id {
                Ok(Workflow::Start)
            } else {
                Ok(Workflow::Redirect(format!("/{}/{}", poll.slug, first.id)))
            }
        }
        Some(walkthrough) => {
            let engine_state = state.walkthrough_service.load_state(&walkthrough).await?;
            if !engine_state.is_answered(&question.id) {
                let questions = state.poll_service.questions(&poll.id).await?;
                if let Some(next) = questions.iter().find(|q| !engine_state.is_answered(&q.id))
                    && next.id != question.id
                {
                    return Ok(Workflow::Redirect(format!("/{}/{}", poll.slug, next.id)));
                }
            }
            Ok(Workflow::Active {
                walkthrough,
                state: engine_state,
            })
        }
    }
}

async fn build_page(
    state: &AppState,
    poll: &poll::Model,
    question: &question::Model,
    walkthrough: Option<&walkthrough::Model>,
    progress: Option<f64>,
) -> AppResult<QuestionPage> {
    let answers = state
        .poll_service
        .answers(&question.id)
        .await?
        .into_iter()
        .map(|answer| AnswerOption {
            id: answer.id,
            text: answer.text,
        })
        .collect();

    let selected_answer = match walkthrough {
        Some(w) => state
            .walkthrough_service
            .selected_answer_for(&w.id, &question.id)
            .await?
            .map(|answer| answer.id),
        None => None,
    };

    Ok(QuestionPage {
        poll_slug: poll.slug.clone(),
        poll_title: poll.title.clone(),
        question_id: question.id.clone(),
        question_text: question.text.clone(),
        answers,
        selected_answer,
        progress,
    })
}

/// Render a question.
pub async fn show(
    State(state): State<AppState>,
    Path((poll_slug, question_id)): Path<(String, String)>,
    jar: CookieJar,
) -> AppResult<Response> {
    let poll = state.poll_service.get_by_slug(&poll_slug).await?;
    let question = state.poll_service.question_in_poll(&poll, &question_id).await?;
    let session = Session::load(&jar, &state.signer, &state.session_cookie);

    match classify(&state, &session, &poll, &question).await? {
        Workflow::Redirect(location) => Ok(Redirect::to(&location).into_response()),
        Workflow::Start => {
            let page = build_page(&state, &poll, &question, None, None).await?;
            Ok(ApiResponse::ok(page).into_response())
        }
        Workflow::Active {
            walkthrough,
            state: engine_state,
        } => {
            let page = build_page(
                &state,
                &poll,
                &question,
                Some(&walkthrough),
                engine_state.progress(),
            )
            .await?;
            Ok(ApiResponse::ok(page).into_response())
        }
    }
}

/// Submit an answer, advancing to the next question or to the result.
pub async fn submit(
    State(state): State<AppState>,
    Path((poll_slug, question_id)): Path<(String, String)>,
    client: ClientMeta,
    jar: CookieJar,
    Form(form): Form<AnswerSubmission>,
) -> AppResult<Response> {
    let poll = state.poll_service.get_by_slug(&poll_slug).await?;
    let question = state.poll_service.question_in_poll(&poll, &question_id).await?;
    let mut session = Session::load(&jar, &state.signer, &state.session_cookie);

    let workflow = classify(&state, &session, &poll, &question).await?;
    let walkthrough = match workflow {
        Workflow::Redirect(location) => return Ok(Redirect::to(&location).into_response()),
        Workflow::Start => None,
        Workflow::Active { walkthrough, .. } => Some(walkthrough),
    };

    // Resolve the submitted choice; a bad one redisplays the form without
    // touching any state.
    let answer = match &form.answer {
        None => {
            let page =
                build_page(&state, &poll, &question, walkthrough.as_ref(), None).await?;
            return Ok(ApiResponse::invalid(page, "An answer is required").into_response());
        }
        Some(answer_id) => {
            match state
                .poll_service
                .get_answer_in_question(&question, answer_id)
                .await
            {
                Ok(answer) => answer,
                Err(AppError::Validation(message)) => {
                    let page =
                        build_page(&state, &poll, &question, walkthrough.as_ref(), None).await?;
                    return Ok(ApiResponse::invalid(page, message).into_response());
                }
                Err(other) => return Err(other),
            }
        }
    };

    // The walkthrough is created on first answer submission, never on render.
    let walkthrough = match walkthrough {
        Some(w) => w,
        None => {
            let w = state
                .walkthrough_service
                .start(
                    &poll.id,
                    profilingpoll_core::ClientInfo {
                        ip: client.ip,
                        user_agent: client.user_agent,
                    },
                )
                .await?;
            session.current_walkthrough = Some(w.id.clone());
            w
        }
    };

    let updated = state
        .walkthrough_service
        .add_answer(&walkthrough.id, &answer.id)
        .await?;

    let jar = session.store(jar, &state.signer, &state.session_cookie)?;

    match state.walkthrough_service.next_question(&updated).await? {
        Some(next) => {
            Ok((jar, Redirect::to(&format!("/{}/{}", poll.slug, next.id))).into_response())
        }
        None => {
            let token = state.signer.sign(&updated.id)?;
            Ok((jar, Redirect::to(&format!("/result/{token}"))).into_response())
        }
    }
}
