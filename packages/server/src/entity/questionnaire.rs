use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questionnaire")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub questionnaire_type: String, // e.g. ReviewQuestionnaire, AuthorFeedbackReview
    #[sea_orm(default_value = false)]
    pub private: bool,
    pub min_question_score: i32,
    pub max_question_score: i32,

    pub instructor_id: i32,
    #[sea_orm(belongs_to, from = "instructor_id", to = "id")]
    pub instructor: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    #[sea_orm(has_many, via = "assignment_questionnaire")]
    pub assignments: HasMany<super::assignment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
