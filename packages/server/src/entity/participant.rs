use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership of a user in an assignment. Duplicate (assignment, user) rows
/// are rejected by the roster handlers, not by the schema.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub assignment_id: i32,
    #[sea_orm(belongs_to, from = "assignment_id", to = "id")]
    pub assignment: HasOne<super::assignment::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub handle: String,
    #[sea_orm(default_value = true)]
    pub can_submit: bool,
    #[sea_orm(default_value = true)]
    pub can_review: bool,
    #[sea_orm(default_value = true)]
    pub can_take_quiz: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
