use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub assignment_id: i32,
    #[sea_orm(belongs_to, from = "assignment_id", to = "id")]
    pub assignment: HasOne<super::assignment::Entity>,

    #[sea_orm(has_many, via = "teams_user")]
    pub users: HasMany<super::user::Entity>,

    #[sea_orm(has_many)]
    pub signups: HasMany<super::signed_up_team::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
