use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    /// NULL once the assignment is detached from its course.
    pub course_id: Option<i32>,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    #[sea_orm(default_value = false)]
    pub has_badge: bool,
    #[sea_orm(default_value = false)]
    pub enable_pair_programming: bool,
    #[sea_orm(default_value = false)]
    pub staggered_deadline: bool,
    #[sea_orm(default_value = 1)]
    pub max_team_size: i32,
    #[sea_orm(default_value = false)]
    pub is_calibrated: bool,

    #[sea_orm(default_value = 0)]
    pub num_reviews_required: i32,
    #[sea_orm(default_value = 0)]
    pub num_reviews_allowed: i32,
    #[sea_orm(default_value = 0)]
    pub num_metareviews_required: i32,
    #[sea_orm(default_value = 0)]
    pub num_metareviews_allowed: i32,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::participant::Entity>,

    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    #[sea_orm(has_many)]
    pub topics: HasMany<super::sign_up_topic::Entity>,

    #[sea_orm(has_many, via = "assignment_questionnaire")]
    pub questionnaires: HasMany<super::questionnaire::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
