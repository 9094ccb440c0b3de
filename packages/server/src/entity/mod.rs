pub mod assignment;
pub mod assignment_questionnaire;
pub mod course;
pub mod participant;
pub mod question;
pub mod questionnaire;
pub mod sign_up_topic;
pub mod signed_up_team;
pub mod team;
pub mod teams_user;
pub mod tree_node;
pub mod user;
