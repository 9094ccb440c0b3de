use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "signed_up_team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: i32,
    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,

    pub sign_up_topic_id: i32,
    #[sea_orm(belongs_to, from = "sign_up_topic_id", to = "id")]
    pub topic: HasOne<super::sign_up_topic::Entity>,

    #[sea_orm(default_value = false)]
    pub is_waitlisted: bool,
}

impl ActiveModelBehavior for ActiveModel {}
