use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::handlers::{assignment, question};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/assignments", assignment_routes())
        .nest("/questions", question_routes())
}

fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(assignment::list_assignments).post(assignment::create_assignment),
        )
        .route(
            "/{id}",
            get(assignment::get_assignment)
                .patch(assignment::update_assignment)
                .put(assignment::update_assignment)
                .delete(assignment::delete_assignment),
        )
        .route("/{id}/add_participant", post(assignment::add_participant))
        .route(
            "/{id}/remove_participant",
            post(assignment::remove_participant),
        )
        .route(
            "/{id}/remove_assignment_from_course",
            patch(assignment::remove_assignment_from_course),
        )
        .route(
            "/{id}/assign_course/{course_id}",
            patch(assignment::assign_course),
        )
        .route("/{id}/copy_assignment", post(assignment::copy_assignment))
        .route("/{id}/create_node", post(assignment::create_node))
        .merge(predicate_routes())
}

/// Read-only checks, reachable with either GET or POST.
fn predicate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/has_badge",
            get(assignment::has_badge).post(assignment::has_badge),
        )
        .route(
            "/{id}/pair_programming_enabled",
            get(assignment::pair_programming_enabled).post(assignment::pair_programming_enabled),
        )
        .route(
            "/{id}/has_topics",
            get(assignment::has_topics).post(assignment::has_topics),
        )
        .route(
            "/{id}/team_assignment",
            get(assignment::team_assignment).post(assignment::team_assignment),
        )
        .route(
            "/{id}/valid_num_review",
            get(assignment::valid_num_review).post(assignment::valid_num_review),
        )
        .route(
            "/{id}/is_calibrated",
            get(assignment::is_calibrated).post(assignment::is_calibrated),
        )
        .route(
            "/{id}/has_teams",
            get(assignment::has_teams).post(assignment::has_teams),
        )
        .route(
            "/{id}/staggered_and_no_topic",
            get(assignment::staggered_and_no_topic).post(assignment::staggered_and_no_topic),
        )
        .route(
            "/{id}/varying_rubrics_by_round",
            get(assignment::varying_rubrics_by_round).post(assignment::varying_rubrics_by_round),
        )
}

fn question_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(question::list_questions).post(question::create_question),
        )
        .route("/types", get(question::list_types))
        .route(
            "/show_all/questionnaire/{id}",
            get(question::list_by_questionnaire),
        )
        .route(
            "/delete_all/questionnaire/{id}",
            delete(question::delete_all),
        )
        .route(
            "/{id}",
            get(question::get_question)
                .put(question::update_question)
                .patch(question::update_question)
                .delete(question::delete_question),
        )
}
