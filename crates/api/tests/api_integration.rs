//! API integration tests.
//!
//! Drive the router end to end against a mock database, verifying workflow
//! redirects, listings and token handling.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use profilingpoll_api::{AppState, router};
use profilingpoll_common::TokenSigner;
use profilingpoll_core::{PollService, WalkthroughService};
use profilingpoll_db::entities::{answer, poll, question};
use profilingpoll_db::repositories::{
    AnswerProfileRepository, AnswerRepository, PollRepository, ProfileRepository,
    QuestionRepository, WalkthroughProfileRepository, WalkthroughRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let answer_repo = AnswerRepository::new(Arc::clone(&db));
    let answer_profile_repo = AnswerProfileRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let walkthrough_repo = WalkthroughRepository::new(Arc::clone(&db));
    let score_repo = WalkthroughProfileRepository::new(Arc::clone(&db));

    let state = AppState {
        poll_service: PollService::new(
            poll_repo.clone(),
            question_repo.clone(),
            answer_repo.clone(),
        ),
        walkthrough_service: WalkthroughService::new(
            walkthrough_repo,
            score_repo,
            poll_repo,
            question_repo,
            answer_repo,
            answer_profile_repo,
            profile_repo,
        ),
        signer: TokenSigner::new("test-secret"),
        session_cookie: "pp_session".to_string(),
    };

    router().with_state(state)
}

fn test_poll(slug: &str) -> poll::Model {
    poll::Model {
        id: format!("poll-{slug}"),
        title: "Best course".to_string(),
        slug: slug.to_string(),
        description: None,
        active: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_question(id: &str, poll_id: &str, ordering: i32) -> question::Model {
    question::Model {
        id: id.to_string(),
        poll_id: poll_id.to_string(),
        text: format!("Question {id}"),
        ordering,
        multiple_answers: false,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_answer(id: &str, question_id: &str, ordering: i32) -> answer::Model {
    answer::Model {
        id: id.to_string(),
        question_id: question_id.to_string(),
        text: format!("Answer {id}"),
        ordering,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_with_no_active_polls_lists_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<poll::Model>::new()])
        .into_connection();

    let response = test_app(db).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["polls"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_root_with_single_active_poll_redirects() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_poll("best-course")]])
        .into_connection();

    let response = test_app(db).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/best-course"
    );
}

#[tokio::test]
async fn test_root_with_many_active_polls_lists_all() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_poll("first"), test_poll("second")]])
        .into_connection();

    let response = test_app(db).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["polls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_poll_slug_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<poll::Model>::new()])
        .into_connection();

    let response = test_app(db).oneshot(get("/no-such-poll")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_poll_entry_redirects_to_first_question() {
    let poll = test_poll("best-course");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![
            test_question("q1", &poll.id, 0),
            test_question("q2", &poll.id, 1),
        ]])
        .into_connection();

    let response = test_app(db).oneshot(get("/best-course")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/best-course/q1"
    );
}

#[tokio::test]
async fn test_question_out_of_order_redirects_to_first() {
    let poll = test_poll("best-course");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![test_question("q2", &poll.id, 1)]])
        .append_query_results([vec![
            test_question("q1", &poll.id, 0),
            test_question("q2", &poll.id, 1),
        ]])
        .into_connection();

    // No session: only the first question may be viewed.
    let response = test_app(db).oneshot(get("/best-course/q2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/best-course/q1"
    );
}

#[tokio::test]
async fn test_first_question_renders_with_choices() {
    let poll = test_poll("best-course");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![test_question("q1", &poll.id, 0)]])
        .append_query_results([vec![
            test_question("q1", &poll.id, 0),
            test_question("q2", &poll.id, 1),
        ]])
        .append_query_results([vec![
            test_answer("a1", "q1", 0),
            test_answer("a2", "q1", 1),
        ]])
        .into_connection();

    let response = test_app(db).oneshot(get("/best-course/q1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let page = &body["data"];
    assert_eq!(page["question_id"], "q1");
    assert_eq!(page["answers"].as_array().unwrap().len(), 2);
    assert!(page.get("selected_answer").is_none());
}

#[tokio::test]
async fn test_question_of_wrong_poll_is_not_found() {
    let poll = test_poll("best-course");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![test_question("q9", "some-other-poll", 0)]])
        .into_connection();

    let response = test_app(db).oneshot(get("/best-course/q9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_result_with_garbled_token_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let response = test_app(db)
        .oneshot(get("/result/garbled-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_result_with_foreign_signature_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let foreign = TokenSigner::new("some-other-secret");
    let token = foreign.sign("w1").unwrap();

    let response = test_app(db)
        .oneshot(get(&format!("/result/{token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_email_rejects_invalid_address() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let token = TokenSigner::new("test-secret").sign("w1").unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/result/{token}/email"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=not-an-email"))
        .unwrap();

    let response = test_app(db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_empty_answer_submission_redisplays_form() {
    let poll = test_poll("best-course");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![test_question("q1", &poll.id, 0)]])
        .append_query_results([vec![
            test_question("q1", &poll.id, 0),
            test_question("q2", &poll.id, 1),
        ]])
        .append_query_results([vec![
            test_answer("a1", "q1", 0),
            test_answer("a2", "q1", 1),
        ]])
        .into_connection();

    let request = Request::builder()
        .method("POST")
        .uri("/best-course/q1")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(""))
        .unwrap();

    let response = test_app(db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    // The form redisplays with its choices intact.
    assert_eq!(body["data"]["answers"].as_array().unwrap().len(), 2);
}
