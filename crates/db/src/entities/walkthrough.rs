//! Walkthrough entity: one respondent's traversal of a poll.
//!
//! `progress` and `completed_at` are denormalized; the walkthrough engine
//! keeps them consistent with the selected-answer set on every mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "walkthrough")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Respondent email, collected on the result page.
    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub ip: Option<String>,

    #[sea_orm(nullable)]
    pub user_agent: Option<String>,

    /// Set iff every question of the poll is answered.
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Answered / total questions; NULL while no answer is selected.
    #[sea_orm(nullable)]
    pub progress: Option<f64>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(has_many = "super::walkthrough_answer::Entity")]
    WalkthroughAnswer,

    #[sea_orm(has_many = "super::walkthrough_question::Entity")]
    WalkthroughQuestion,

    #[sea_orm(has_many = "super::walkthrough_profile::Entity")]
    WalkthroughProfile,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::walkthrough_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalkthroughAnswer.def()
    }
}

impl Related<super::walkthrough_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalkthroughQuestion.def()
    }
}

impl Related<super::walkthrough_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalkthroughProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
