//! Poll entity: a named questionnaire owning ordered questions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// URL slug, unique across all polls.
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(nullable)]
    pub description: Option<String>,

    /// Only active polls are routable.
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Question,

    #[sea_orm(has_many = "super::walkthrough::Entity")]
    Walkthrough,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::walkthrough::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Walkthrough.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
