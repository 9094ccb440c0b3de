use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const COURSE_NODE: &str = "CourseNode";
pub const ASSIGNMENT_NODE: &str = "AssignmentNode";

/// Entry in the course/assignment browsing hierarchy.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tree_node")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub node_type: String,
    /// Id of the course or assignment this node stands for.
    pub node_object_id: i32,
    pub parent_id: Option<i32>,
}

impl ActiveModelBehavior for ActiveModel {}
