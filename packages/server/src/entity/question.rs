use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub questionnaire_id: i32,
    #[sea_orm(belongs_to, from = "questionnaire_id", to = "id")]
    pub questionnaire: HasOne<super::questionnaire::Entity>,

    pub seq: i32,
    #[sea_orm(column_type = "Text")]
    pub txt: String,
    pub question_type: String,
    pub break_before: bool,
    pub weight: Option<i32>,

    // Presentation hints, filled per question_type on create.
    pub size: Option<String>,
    pub alternatives: Option<String>,
    pub min_label: Option<String>,
    pub max_label: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
