//! Walkthrough repositories.
//!
//! The walkthrough aggregate spans four tables: the walkthrough row itself,
//! its selected answers, its answered-question set and its per-profile
//! scores. The first three live on [`WalkthroughRepository`]; scores get
//! their own [`WalkthroughProfileRepository`].

use std::sync::Arc;

use crate::entities::{
    Walkthrough, WalkthroughAnswer, WalkthroughProfile, WalkthroughQuestion, walkthrough,
    walkthrough_answer, walkthrough_profile, walkthrough_question,
};
use profilingpoll_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Walkthrough repository for database operations.
#[derive(Clone)]
pub struct WalkthroughRepository {
    db: Arc<DatabaseConnection>,
}

impl WalkthroughRepository {
    /// Create a new walkthrough repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a walkthrough by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<walkthrough::Model>> {
        Walkthrough::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a walkthrough by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<walkthrough::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Walkthrough not found: {id}")))
    }

    /// Create a new walkthrough.
    pub async fn create(&self, model: walkthrough::ActiveModel) -> AppResult<walkthrough::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a walkthrough.
    pub async fn update(&self, model: walkthrough::ActiveModel) -> AppResult<walkthrough::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Selected answers ===

    /// List the selected answers, in selection order.
    pub async fn list_answers(
        &self,
        walkthrough_id: &str,
    ) -> AppResult<Vec<walkthrough_answer::Model>> {
        WalkthroughAnswer::find()
            .filter(walkthrough_answer::Column::WalkthroughId.eq(walkthrough_id))
            .order_by_asc(walkthrough_answer::Column::CreatedAt)
            .order_by_asc(walkthrough_answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the selected answers for one question.
    pub async fn find_answers_for_question(
        &self,
        walkthrough_id: &str,
        question_id: &str,
    ) -> AppResult<Vec<walkthrough_answer::Model>> {
        WalkthroughAnswer::find()
            .filter(walkthrough_answer::Column::WalkthroughId.eq(walkthrough_id))
            .filter(walkthrough_answer::Column::QuestionId.eq(question_id))
            .order_by_asc(walkthrough_answer::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a selected answer.
    pub async fn add_answer_row(
        &self,
        model: walkthrough_answer::ActiveModel,
    ) -> AppResult<walkthrough_answer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Drop a selected answer.
    pub async fn remove_answer_row(&self, walkthrough_id: &str, answer_id: &str) -> AppResult<()> {
        WalkthroughAnswer::delete_many()
            .filter(walkthrough_answer::Column::WalkthroughId.eq(walkthrough_id))
            .filter(walkthrough_answer::Column::AnswerId.eq(answer_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Drop all selected answers.
    pub async fn clear_answers(&self, walkthrough_id: &str) -> AppResult<()> {
        WalkthroughAnswer::delete_many()
            .filter(walkthrough_answer::Column::WalkthroughId.eq(walkthrough_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // === Answered questions ===

    /// List the answered-question rows, oldest first.
    pub async fn list_answered_questions(
        &self,
        walkthrough_id: &str,
    ) -> AppResult<Vec<walkthrough_question::Model>> {
        WalkthroughQuestion::find()
            .filter(walkthrough_question::Column::WalkthroughId.eq(walkthrough_id))
            .order_by_asc(walkthrough_question::Column::CreatedAt)
            .order_by_asc(walkthrough_question::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a question as answered.
    pub async fn mark_answered(
        &self,
        model: walkthrough_question::ActiveModel,
    ) -> AppResult<walkthrough_question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Unmark an answered question.
    pub async fn unmark_answered(&self, walkthrough_id: &str, question_id: &str) -> AppResult<()> {
        WalkthroughQuestion::delete_many()
            .filter(walkthrough_question::Column::WalkthroughId.eq(walkthrough_id))
            .filter(walkthrough_question::Column::QuestionId.eq(question_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Drop the whole answered-question set.
    pub async fn clear_answered(&self, walkthrough_id: &str) -> AppResult<()> {
        WalkthroughQuestion::delete_many()
            .filter(walkthrough_question::Column::WalkthroughId.eq(walkthrough_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Walkthrough profile-score repository for database operations.
#[derive(Clone)]
pub struct WalkthroughProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl WalkthroughProfileRepository {
    /// Create a new walkthrough profile-score repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List score rows in creation order.
    ///
    /// Creation order is what result resolution falls back to on quantifier
    /// ties, so it must be stable.
    pub async fn list_by_walkthrough(
        &self,
        walkthrough_id: &str,
    ) -> AppResult<Vec<walkthrough_profile::Model>> {
        WalkthroughProfile::find()
            .filter(walkthrough_profile::Column::WalkthroughId.eq(walkthrough_id))
            .order_by_asc(walkthrough_profile::Column::CreatedAt)
            .order_by_asc(walkthrough_profile::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the score row for one profile.
    pub async fn find_by_profile(
        &self,
        walkthrough_id: &str,
        profile_id: &str,
    ) -> AppResult<Option<walkthrough_profile::Model>> {
        WalkthroughProfile::find()
            .filter(walkthrough_profile::Column::WalkthroughId.eq(walkthrough_id))
            .filter(walkthrough_profile::Column::ProfileId.eq(profile_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new score row.
    pub async fn create(
        &self,
        model: walkthrough_profile::ActiveModel,
    ) -> AppResult<walkthrough_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a score row.
    pub async fn update(
        &self,
        model: walkthrough_profile::ActiveModel,
    ) -> AppResult<walkthrough_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Drop all score rows of a walkthrough.
    pub async fn clear(&self, walkthrough_id: &str) -> AppResult<()> {
        WalkthroughProfile::delete_many()
            .filter(walkthrough_profile::Column::WalkthroughId.eq(walkthrough_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
