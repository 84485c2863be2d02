//! Profile and answer-profile link repositories.

use std::sync::Arc;

use crate::entities::{AnswerProfile, Profile, answer_profile, profile};
use profilingpoll_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a profile by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {id}")))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Answer-profile link repository for database operations.
#[derive(Clone)]
pub struct AnswerProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerProfileRepository {
    /// Create a new answer-profile link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the weighted links of an answer, oldest first.
    pub async fn list_by_answer(&self, answer_id: &str) -> AppResult<Vec<answer_profile::Model>> {
        AnswerProfile::find()
            .filter(answer_profile::Column::AnswerId.eq(answer_id))
            .order_by_asc(answer_profile::Column::CreatedAt)
            .order_by_asc(answer_profile::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a link between an answer and a profile.
    pub async fn find_link(
        &self,
        answer_id: &str,
        profile_id: &str,
    ) -> AppResult<Option<answer_profile::Model>> {
        AnswerProfile::find()
            .filter(answer_profile::Column::AnswerId.eq(answer_id))
            .filter(answer_profile::Column::ProfileId.eq(profile_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new weighted link.
    pub async fn create(
        &self,
        model: answer_profile::ActiveModel,
    ) -> AppResult<answer_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
