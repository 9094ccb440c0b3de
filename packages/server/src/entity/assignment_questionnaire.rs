use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links a rubric (questionnaire) to an assignment, optionally for one review round.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment_questionnaire")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub assignment_id: i32,
    #[sea_orm(belongs_to, from = "assignment_id", to = "id")]
    pub assignment: HasOne<super::assignment::Entity>,

    pub questionnaire_id: i32,
    #[sea_orm(belongs_to, from = "questionnaire_id", to = "id")]
    pub questionnaire: HasOne<super::questionnaire::Entity>,

    /// NULL when the rubric applies to every round.
    pub used_in_round: Option<i32>,
}

impl ActiveModelBehavior for ActiveModel {}
