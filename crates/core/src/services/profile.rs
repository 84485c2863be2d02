//! Profile catalog service.

use chrono::Utc;
use profilingpoll_common::{AppError, AppResult, IdGenerator};
use profilingpoll_db::{
    entities::{answer_profile, profile},
    repositories::{AnswerProfileRepository, AnswerRepository, ProfileRepository},
};
use sea_orm::Set;

/// Profile catalog service: outcome profiles and their weighted answer links.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    answer_profile_repo: AnswerProfileRepository,
    answer_repo: AnswerRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile catalog service.
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        answer_profile_repo: AnswerProfileRepository,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            profile_repo,
            answer_profile_repo,
            answer_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a profile by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.profile_repo.get_by_id(id).await
    }

    /// Create a profile.
    pub async fn create_profile(&self, text: &str) -> AppResult<profile::Model> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Profile text cannot be empty".to_string(),
            ));
        }

        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.profile_repo.create(model).await
    }

    /// Link an answer to a profile with a weight.
    ///
    /// An answer links each profile at most once; selecting the answer later
    /// contributes `quantifier` to that profile's walkthrough score.
    pub async fn link_answer(
        &self,
        answer_id: &str,
        profile_id: &str,
        quantifier: i32,
    ) -> AppResult<answer_profile::Model> {
        let answer = self.answer_repo.get_by_id(answer_id).await?;
        let profile = self.profile_repo.get_by_id(profile_id).await?;

        if self
            .answer_profile_repo
            .find_link(&answer.id, &profile.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Answer {answer_id} already links profile {profile_id}"
            )));
        }

        let model = answer_profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            answer_id: Set(answer.id),
            profile_id: Set(profile.id),
            quantifier: Set(quantifier),
            created_at: Set(Utc::now().into()),
        };

        self.answer_profile_repo.create(model).await
    }

    /// The weighted links of an answer.
    pub async fn links_for_answer(
        &self,
        answer_id: &str,
    ) -> AppResult<Vec<answer_profile::Model>> {
        self.answer_profile_repo.list_by_answer(answer_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_profile_rejects_empty_text() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = ProfileService::new(
            ProfileRepository::new(Arc::clone(&db)),
            AnswerProfileRepository::new(Arc::clone(&db)),
            AnswerRepository::new(db),
        );

        let result = service.create_profile("   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_links_for_answer() {
        let link = answer_profile::Model {
            id: "link1".to_string(),
            answer_id: "a1".to_string(),
            profile_id: "p1".to_string(),
            quantifier: 10,
            created_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![link]])
                .into_connection(),
        );
        let service = ProfileService::new(
            ProfileRepository::new(Arc::clone(&db)),
            AnswerProfileRepository::new(Arc::clone(&db)),
            AnswerRepository::new(db),
        );

        let links = service.links_for_answer("a1").await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].quantifier, 10);
    }
}
