use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    pub full_name: String,
    pub email: String,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::participant::Entity>,

    #[sea_orm(has_many, via = "teams_user")]
    pub teams: HasMany<super::team::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
