//! Profile entity: an outcome a respondent can be matched to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub text: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::answer_profile::Entity")]
    AnswerProfile,

    #[sea_orm(has_many = "super::walkthrough_profile::Entity")]
    WalkthroughProfile,
}

impl Related<super::answer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerProfile.def()
    }
}

impl Related<super::walkthrough_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalkthroughProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
