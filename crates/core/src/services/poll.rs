//! Poll catalog service.

use chrono::Utc;
use profilingpoll_common::{AppError, AppResult, IdGenerator};
use profilingpoll_db::{
    entities::{answer, poll, question},
    repositories::{AnswerRepository, PollRepository, QuestionRepository},
};
use sea_orm::Set;

/// Poll catalog service: polls, their ordered questions and answers.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    id_gen: IdGenerator,
}

/// Input for creating a poll.
pub struct CreatePollInput {
    /// Poll title.
    pub title: String,
    /// URL slug, lowercase alphanumerics and dashes.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the poll is routable right away.
    pub active: bool,
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl PollService {
    /// Create a new poll catalog service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            poll_repo,
            question_repo,
            answer_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List active polls. Zero, one and many are all valid outcomes.
    pub async fn list_active(&self) -> AppResult<Vec<poll::Model>> {
        self.poll_repo.list_active().await
    }

    /// Get a poll by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_by_slug(slug).await
    }

    /// Get a poll by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_by_id(id).await
    }

    /// A poll's questions in poll order.
    pub async fn questions(&self, poll_id: &str) -> AppResult<Vec<question::Model>> {
        self.question_repo.list_by_poll(poll_id).await
    }

    /// The first question of a poll, if it has any.
    pub async fn first_question(&self, poll_id: &str) -> AppResult<Option<question::Model>> {
        Ok(self
            .question_repo
            .list_by_poll(poll_id)
            .await?
            .into_iter()
            .next())
    }

    /// The question following `current` in poll order, if any remains.
    pub async fn next_question_after(
        &self,
        current: &question::Model,
    ) -> AppResult<Option<question::Model>> {
        let questions = self.question_repo.list_by_poll(&current.poll_id).await?;
        let position = questions.iter().position(|q| q.id == current.id);
        Ok(position.and_then(|idx| questions.into_iter().nth(idx + 1)))
    }

    /// Resolve a question, requiring it to belong to the given poll.
    pub async fn question_in_poll(
        &self,
        poll: &poll::Model,
        question_id: &str,
    ) -> AppResult<question::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;
        if question.poll_id != poll.id {
            return Err(AppError::QuestionNotFound(question_id.to_string()));
        }
        Ok(question)
    }

    /// A question's answers in display order.
    pub async fn answers(&self, question_id: &str) -> AppResult<Vec<answer::Model>> {
        self.answer_repo.list_by_question(question_id).await
    }

    /// Resolve a submitted answer choice against its question.
    ///
    /// A choice outside the question's answer set is a validation error,
    /// not a 404: the form redisplays.
    pub async fn get_answer_in_question(
        &self,
        question: &question::Model,
        answer_id: &str,
    ) -> AppResult<answer::Model> {
        let answer = self
            .answer_repo
            .find_by_id(answer_id)
            .await?
            .filter(|a| a.question_id == question.id);
        answer.ok_or_else(|| {
            AppError::Validation(format!(
                "Answer {answer_id} is not a choice of question {}",
                question.id
            ))
        })
    }

    /// Create a poll.
    pub async fn create_poll(&self, input: CreatePollInput) -> AppResult<poll::Model> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Poll title cannot be empty".to_string()));
        }
        if input.title.len() > 128 {
            return Err(AppError::Validation(
                "Poll title is too long (max 128 chars)".to_string(),
            ));
        }
        if !is_valid_slug(&input.slug) {
            return Err(AppError::Validation(format!(
                "Invalid poll slug: {}",
                input.slug
            )));
        }
        if self.poll_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Poll slug already in use: {}",
                input.slug
            )));
        }

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            active: Set(input.active),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.poll_repo.create(model).await
    }

    /// Add a question to a poll.
    pub async fn add_question(
        &self,
        poll_id: &str,
        text: &str,
        ordering: i32,
        multiple_answers: bool,
    ) -> AppResult<question::Model> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Question text cannot be empty".to_string(),
            ));
        }
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id),
            text: Set(text.to_string()),
            ordering: Set(ordering),
            multiple_answers: Set(multiple_answers),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.question_repo.create(model).await
    }

    /// Add an answer to a question.
    pub async fn add_answer(
        &self,
        question_id: &str,
        text: &str,
        ordering: i32,
    ) -> AppResult<answer::Model> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Answer text cannot be empty".to_string(),
            ));
        }
        let question = self.question_repo.get_by_id(question_id).await?;

        let model = answer::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id),
            text: Set(text.to_string()),
            ordering: Set(ordering),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.answer_repo.create(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

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

    fn service_with_questions(questions: Vec<question::Model>) -> PollService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([questions])
                .into_connection(),
        );
        PollService::new(
            PollRepository::new(Arc::clone(&db)),
            QuestionRepository::new(Arc::clone(&db)),
            AnswerRepository::new(db),
        )
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("best-course"));
        assert!(is_valid_slug("poll2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Spaces here"));
        assert!(!is_valid_slug("Uppercase"));
        assert!(!is_valid_slug("umlaut-ä"));
    }

    #[tokio::test]
    async fn test_first_question_follows_poll_order() {
        let service = service_with_questions(vec![
            test_question("q1", "poll1", 0),
            test_question("q2", "poll1", 1),
        ]);

        let first = service.first_question("poll1").await.unwrap().unwrap();
        assert_eq!(first.id, "q1");
    }

    #[tokio::test]
    async fn test_first_question_of_empty_poll() {
        let service = service_with_questions(vec![]);
        assert!(service.first_question("poll1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_question_after() {
        let q1 = test_question("q1", "poll1", 0);
        let service = service_with_questions(vec![
            q1.clone(),
            test_question("q2", "poll1", 1),
            test_question("q3", "poll1", 2),
        ]);

        let next = service.next_question_after(&q1).await.unwrap().unwrap();
        assert_eq!(next.id, "q2");
    }

    #[tokio::test]
    async fn test_next_question_after_last_is_none() {
        let q2 = test_question("q2", "poll1", 1);
        let service =
            service_with_questions(vec![test_question("q1", "poll1", 0), q2.clone()]);

        assert!(service.next_question_after(&q2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_question_in_poll_rejects_foreign_question() {
        let poll = poll::Model {
            id: "poll1".to_string(),
            title: "Poll".to_string(),
            slug: "poll".to_string(),
            description: None,
            active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let service = service_with_questions(vec![test_question("q9", "other-poll", 0)]);

        let result = service.question_in_poll(&poll, "q9").await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(_))));
    }
}
