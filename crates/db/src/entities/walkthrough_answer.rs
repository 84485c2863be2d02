//! Selected answer within a walkthrough.
//!
//! `question_id` is denormalized from the answer so the
//! one-answer-per-question rule is a single indexed lookup.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "walkthrough_answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub walkthrough_id: String,

    #[sea_orm(indexed)]
    pub answer_id: String,

    #[sea_orm(indexed)]
    pub question_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::walkthrough::Entity",
        from = "Column::WalkthroughId",
        to = "super::walkthrough::Column::Id",
        on_delete = "Cascade"
    )]
    Walkthrough,

    #[sea_orm(
        belongs_to = "super::answer::Entity",
        from = "Column::AnswerId",
        to = "super::answer::Column::Id",
        on_delete = "Cascade"
    )]
    Answer,
}

impl Related<super::walkthrough::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Walkthrough.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
