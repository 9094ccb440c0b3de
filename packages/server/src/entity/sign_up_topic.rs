use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sign_up_topic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub topic_name: String,
    #[sea_orm(default_value = 1)]
    pub max_choosers: i32,

    pub assignment_id: i32,
    #[sea_orm(belongs_to, from = "assignment_id", to = "id")]
    pub assignment: HasOne<super::assignment::Entity>,

    #[sea_orm(has_many)]
    pub signups: HasMany<super::signed_up_team::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
