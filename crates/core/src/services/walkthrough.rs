//! Walkthrough service.
//!
//! Orchestrates the pure engine against the repositories: load the
//! denormalized state, apply one [`AnswerChange`], persist the returned
//! mutations together with the recomputed progress/completion fields.

use std::collections::HashSet;

use chrono::Utc;
use profilingpoll_common::{AppError, AppResult, IdGenerator};
use profilingpoll_db::{
    entities::{
        answer, profile, question, walkthrough, walkthrough_answer, walkthrough_profile,
        walkthrough_question,
    },
    repositories::{
        AnswerProfileRepository, AnswerRepository, PollRepository, ProfileRepository,
        QuestionRepository, WalkthroughProfileRepository, WalkthroughRepository,
    },
};
use sea_orm::Set;
use tracing::debug;
use validator::ValidateEmail;

use crate::engine::{
    AnswerChange, AnswerSnapshot, Mutation, ProfileScore, ProfileWeight, SelectedAnswer,
    WalkthroughState,
};

/// Request metadata recorded on a new walkthrough.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Respondent IP, if known.
    pub ip: Option<String>,
    /// Respondent user agent, if sent.
    pub user_agent: Option<String>,
}

/// Walkthrough service: progression, scoring and result resolution.
#[derive(Clone)]
pub struct WalkthroughService {
    walkthrough_repo: WalkthroughRepository,
    score_repo: WalkthroughProfileRepository,
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    answer_profile_repo: AnswerProfileRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl WalkthroughService {
    /// Create a new walkthrough service.
    #[must_use]
    pub const fn new(
        walkthrough_repo: WalkthroughRepository,
        score_repo: WalkthroughProfileRepository,
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
        answer_profile_repo: AnswerProfileRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            walkthrough_repo,
            score_repo,
            poll_repo,
            question_repo,
            answer_repo,
            answer_profile_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a walkthrough of a poll.
    pub async fn start(
        &self,
        poll_id: &str,
        client: ClientInfo,
    ) -> AppResult<walkthrough::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let model = walkthrough::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id.clone()),
            email: Set(None),
            ip: Set(client.ip),
            user_agent: Set(client.user_agent),
            completed_at: Set(None),
            progress: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let walkthrough = self.walkthrough_repo.create(model).await?;
        debug!(walkthrough_id = %walkthrough.id, poll_id = %poll.id, "Started walkthrough");
        Ok(walkthrough)
    }

    /// Find a walkthrough by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<walkthrough::Model>> {
        self.walkthrough_repo.find_by_id(id).await
    }

    /// Get a walkthrough by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<walkthrough::Model> {
        self.walkthrough_repo.get_by_id(id).await
    }

    /// Load the denormalized state of a walkthrough.
    pub async fn load_state(
        &self,
        walkthrough: &walkthrough::Model,
    ) -> AppResult<WalkthroughState> {
        let total = self.question_repo.count_by_poll(&walkthrough.poll_id).await?;

        let selected = self
            .walkthrough_repo
            .list_answers(&walkthrough.id)
            .await?
            .into_iter()
            .map(|row| SelectedAnswer {
                answer_id: row.answer_id,
                question_id: row.question_id,
            })
            .collect();

        let answered = self
            .walkthrough_repo
            .list_answered_questions(&walkthrough.id)
            .await?
            .into_iter()
            .map(|row| row.question_id)
            .collect();

        let scores = self
            .score_repo
            .list_by_walkthrough(&walkthrough.id)
            .await?
            .into_iter()
            .map(|row| ProfileScore {
                profile_id: row.profile_id,
                quantifier: row.quantifier,
            })
            .collect();

        Ok(WalkthroughState::from_parts(total, selected, answered, scores))
    }

    /// Select an answer for a walkthrough.
    ///
    /// Re-selecting the same answer is a no-op; selecting a different answer
    /// of an already-answered single-answer question replaces the prior one.
    pub async fn add_answer(
        &self,
        walkthrough_id: &str,
        answer_id: &str,
    ) -> AppResult<walkthrough::Model> {
        let walkthrough = self.walkthrough_repo.get_by_id(walkthrough_id).await?;
        let answer = self.answer_repo.get_by_id(answer_id).await?;
        let question = self.question_repo.get_by_id(&answer.question_id).await?;
        if question.poll_id != walkthrough.poll_id {
            return Err(AppError::BadRequest(format!(
                "Answer {answer_id} does not belong to poll {}",
                walkthrough.poll_id
            )));
        }

        let mut state = self.load_state(&walkthrough).await?;
        let snapshot = self.snapshot(&answer.id, &question).await?;

        let mut displaced = Vec::new();
        if !question.multiple_answers && state.is_answered(&question.id) {
            for row in self
                .walkthrough_repo
                .find_answers_for_question(&walkthrough.id, &question.id)
                .await?
            {
                if row.answer_id != answer.id {
                    displaced.push(self.snapshot(&row.answer_id, &question).await?);
                }
            }
        }

        let mutations = state.apply(AnswerChange::Select {
            answer: snapshot,
            displaced,
        });
        debug!(
            walkthrough_id = %walkthrough.id,
            answer_id = %answer.id,
            mutation_count = mutations.len(),
            "Applied answer selection"
        );
        self.persist(&walkthrough, &state, mutations).await
    }

    /// Deselect an answer from a walkthrough.
    pub async fn remove_answer(
        &self,
        walkthrough_id: &str,
        answer_id: &str,
    ) -> AppResult<walkthrough::Model> {
        let walkthrough = self.walkthrough_repo.get_by_id(walkthrough_id).await?;
        let answer = self.answer_repo.get_by_id(answer_id).await?;
        let question = self.question_repo.get_by_id(&answer.question_id).await?;

        let mut state = self.load_state(&walkthrough).await?;
        let snapshot = self.snapshot(&answer.id, &question).await?;

        let mutations = state.apply(AnswerChange::Deselect(snapshot));
        self.persist(&walkthrough, &state, mutations).await
    }

    /// Drop all answers, answered marks and scores of a walkthrough.
    pub async fn clear(&self, walkthrough_id: &str) -> AppResult<walkthrough::Model> {
        let walkthrough = self.walkthrough_repo.get_by_id(walkthrough_id).await?;
        let mut state = self.load_state(&walkthrough).await?;

        let mutations = state.apply(AnswerChange::Clear);
        self.persist(&walkthrough, &state, mutations).await
    }

    /// The first unanswered question in poll order; `None` once complete.
    pub async fn next_question(
        &self,
        walkthrough: &walkthrough::Model,
    ) -> AppResult<Option<question::Model>> {
        let questions = self.question_repo.list_by_poll(&walkthrough.poll_id).await?;
        let answered: HashSet<String> = self
            .walkthrough_repo
            .list_answered_questions(&walkthrough.id)
            .await?
            .into_iter()
            .map(|row| row.question_id)
            .collect();

        Ok(questions.into_iter().find(|q| !answered.contains(&q.id)))
    }

    /// The answer currently selected for a question, for form prefill.
    pub async fn selected_answer_for(
        &self,
        walkthrough_id: &str,
        question_id: &str,
    ) -> AppResult<Option<answer::Model>> {
        let rows = self
            .walkthrough_repo
            .find_answers_for_question(walkthrough_id, question_id)
            .await?;
        match rows.first() {
            Some(row) => self.answer_repo.find_by_id(&row.answer_id).await,
            None => Ok(None),
        }
    }

    /// Resolve the best-matching profile of a walkthrough.
    ///
    /// Highest quantifier wins; equal quantifiers resolve to the score row
    /// created first. A walkthrough with no score entries has no result.
    pub async fn matching_profile(&self, walkthrough_id: &str) -> AppResult<profile::Model> {
        let scores = self.score_repo.list_by_walkthrough(walkthrough_id).await?;

        let best = scores
            .iter()
            .fold(None::<&walkthrough_profile::Model>, |best, row| match best {
                Some(b) if row.quantifier > b.quantifier => Some(row),
                None => Some(row),
                keep => keep,
            })
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No profile scored for walkthrough: {walkthrough_id}"
                ))
            })?;

        self.profile_repo.get_by_id(&best.profile_id).await
    }

    /// Store the respondent's email on a walkthrough.
    pub async fn record_email(
        &self,
        walkthrough_id: &str,
        email: &str,
    ) -> AppResult<walkthrough::Model> {
        if !email.validate_email() {
            return Err(AppError::Validation(format!(
                "Invalid email address: {email}"
            )));
        }

        let walkthrough = self.walkthrough_repo.get_by_id(walkthrough_id).await?;
        let mut active: walkthrough::ActiveModel = walkthrough.into();
        active.email = Set(Some(email.to_string()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.walkthrough_repo.update(active).await
    }

    /// Build the engine's view of one answer.
    async fn snapshot(
        &self,
        answer_id: &str,
        question: &question::Model,
    ) -> AppResult<AnswerSnapshot> {
        let links = self
            .answer_profile_repo
            .list_by_answer(answer_id)
            .await?
            .into_iter()
            .map(|link| ProfileWeight {
                profile_id: link.profile_id,
                quantifier: link.quantifier,
            })
            .collect();

        Ok(AnswerSnapshot {
            answer_id: answer_id.to_string(),
            question_id: question.id.clone(),
            multiple_answers: question.multiple_answers,
            links,
        })
    }

    /// Write the mutations, then the recomputed walkthrough row.
    async fn persist(
        &self,
        walkthrough: &walkthrough::Model,
        state: &WalkthroughState,
        mutations: Vec<Mutation>,
    ) -> AppResult<walkthrough::Model> {
        for mutation in mutations {
            match mutation {
                Mutation::SelectAnswer {
                    answer_id,
                    question_id,
                } => {
                    self.walkthrough_repo
                        .add_answer_row(walkthrough_answer::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            walkthrough_id: Set(walkthrough.id.clone()),
                            answer_id: Set(answer_id),
                            question_id: Set(question_id),
                            created_at: Set(Utc::now().into()),
                        })
                        .await?;
                }
                Mutation::DeselectAnswer { answer_id } => {
                    self.walkthrough_repo
                        .remove_answer_row(&walkthrough.id, &answer_id)
                        .await?;
                }
                Mutation::MarkAnswered { question_id } => {
                    self.walkthrough_repo
                        .mark_answered(walkthrough_question::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            walkthrough_id: Set(walkthrough.id.clone()),
                            question_id: Set(question_id),
                            created_at: Set(Utc::now().into()),
                        })
                        .await?;
                }
                Mutation::UnmarkAnswered { question_id } => {
                    self.walkthrough_repo
                        .unmark_answered(&walkthrough.id, &question_id)
                        .await?;
                }
                Mutation::CreateScore {
                    profile_id,
                    quantifier,
                } => {
                    self.score_repo
                        .create(walkthrough_profile::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            walkthrough_id: Set(walkthrough.id.clone()),
                            profile_id: Set(profile_id),
                            quantifier: Set(quantifier),
                            created_at: Set(Utc::now().into()),
                            updated_at: Set(None),
                        })
                        .await?;
                }
                Mutation::AdjustScore { profile_id, delta } => {
                    let row = self
                        .score_repo
                        .find_by_profile(&walkthrough.id, &profile_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::Internal(format!(
                                "Missing score row for profile {profile_id}"
                            ))
                        })?;
                    let quantifier = row.quantifier + delta;
                    let mut active: walkthrough_profile::ActiveModel = row.into();
                    active.quantifier = Set(quantifier);
                    active.updated_at = Set(Some(Utc::now().into()));
                    self.score_repo.update(active).await?;
                }
                Mutation::ClearAll => {
                    self.walkthrough_repo.clear_answers(&walkthrough.id).await?;
                    self.walkthrough_repo.clear_answered(&walkthrough.id).await?;
                    self.score_repo.clear(&walkthrough.id).await?;
                }
            }
        }

        let mut active: walkthrough::ActiveModel = walkthrough.clone().into();
        active.progress = Set(state.progress());
        active.completed_at = Set(if state.is_complete() {
            Some(Utc::now().into())
        } else {
            None
        });
        active.updated_at = Set(Some(Utc::now().into()));
        self.walkthrough_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> WalkthroughService {
        WalkthroughService::new(
            WalkthroughRepository::new(Arc::clone(&db)),
            WalkthroughProfileRepository::new(Arc::clone(&db)),
            PollRepository::new(Arc::clone(&db)),
            QuestionRepository::new(Arc::clone(&db)),
            AnswerRepository::new(Arc::clone(&db)),
            AnswerProfileRepository::new(Arc::clone(&db)),
            ProfileRepository::new(db),
        )
    }

    fn score_row(id: &str, profile_id: &str, quantifier: i32) -> walkthrough_profile::Model {
        walkthrough_profile::Model {
            id: id.to_string(),
            walkthrough_id: "w1".to_string(),
            profile_id: profile_id.to_string(),
            quantifier,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn profile_row(id: &str, text: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            text: text.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_matching_profile_picks_highest_quantifier() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    score_row("s1", "p1", 10),
                    score_row("s2", "p2", 25),
                ]])
                .append_query_results([vec![profile_row("p2", "Decisive")]])
                .into_connection(),
        );

        let profile = service(db).matching_profile("w1").await.unwrap();
        assert_eq!(profile.id, "p2");
    }

    #[tokio::test]
    async fn test_matching_profile_tie_resolves_to_earliest_row() {
        // Rows arrive in creation order; the first of the tied pair wins.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    score_row("s1", "p1", 20),
                    score_row("s2", "p2", 20),
                ]])
                .append_query_results([vec![profile_row("p1", "Earliest")]])
                .into_connection(),
        );

        let profile = service(db).matching_profile("w1").await.unwrap();
        assert_eq!(profile.id, "p1");
    }

    #[tokio::test]
    async fn test_matching_profile_without_scores_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<walkthrough_profile::Model>::new()])
                .into_connection(),
        );

        let result = service(db).matching_profile("w1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_next_question_skips_answered() {
        let walkthrough = walkthrough::Model {
            id: "w1".to_string(),
            poll_id: "poll1".to_string(),
            email: None,
            ip: None,
            user_agent: None,
            completed_at: None,
            progress: Some(0.5),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let questions = vec![
            question::Model {
                id: "q1".to_string(),
                poll_id: "poll1".to_string(),
                text: "First".to_string(),
                ordering: 0,
                multiple_answers: false,
                created_at: Utc::now().into(),
                updated_at: None,
            },
            question::Model {
                id: "q2".to_string(),
                poll_id: "poll1".to_string(),
                text: "Second".to_string(),
                ordering: 1,
                multiple_answers: false,
                created_at: Utc::now().into(),
                updated_at: None,
            },
        ];
        let answered = vec![walkthrough_question::Model {
            id: "wq1".to_string(),
            walkthrough_id: "w1".to_string(),
            question_id: "q1".to_string(),
            created_at: Utc::now().into(),
        }];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([questions])
                .append_query_results([answered])
                .into_connection(),
        );

        let next = service(db).next_question(&walkthrough).await.unwrap();
        assert_eq!(next.unwrap().id, "q2");
    }

    #[tokio::test]
    async fn test_record_email_rejects_invalid_address() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let result = service(db).record_email("w1", "not-an-email").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
