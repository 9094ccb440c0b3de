pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Peer Review API",
        version = "1.0.0",
        description = "Assignment and rubric question management for the peer-review system"
    ),
    paths(
        handlers::assignment::list_assignments,
        handlers::assignment::get_assignment,
        handlers::assignment::create_assignment,
        handlers::assignment::update_assignment,
        handlers::assignment::delete_assignment,
        handlers::assignment::add_participant,
        handlers::assignment::remove_participant,
        handlers::assignment::remove_assignment_from_course,
        handlers::assignment::assign_course,
        handlers::assignment::copy_assignment,
        handlers::assignment::has_badge,
        handlers::assignment::pair_programming_enabled,
        handlers::assignment::has_topics,
        handlers::assignment::team_assignment,
        handlers::assignment::valid_num_review,
        handlers::assignment::is_calibrated,
        handlers::assignment::has_teams,
        handlers::assignment::staggered_and_no_topic,
        handlers::assignment::create_node,
        handlers::assignment::varying_rubrics_by_round,
        handlers::question::list_questions,
        handlers::question::list_by_questionnaire,
        handlers::question::get_question,
        handlers::question::create_question,
        handlers::question::update_question,
        handlers::question::delete_question,
        handlers::question::delete_all,
        handlers::question::list_types,
    ),
    components(schemas(
        error::ErrorBody,
        models::shared::MessageResponse,
        models::assignment::CreateAssignmentRequest,
        models::assignment::UpdateAssignmentRequest,
        models::assignment::AssignmentResponse,
        models::assignment::ParticipantResponse,
        models::assignment::TreeNodeResponse,
        models::assignment::ReviewCountCheck,
        models::question::CreateQuestionRequest,
        models::question::UpdateQuestionRequest,
        models::question::QuestionResponse,
    )),
    tags(
        (name = "Assignments", description = "Assignment CRUD and duplication"),
        (name = "Assignment Participants", description = "Managing the assignment roster"),
        (name = "Assignment Courses", description = "Attaching assignments to courses"),
        (name = "Assignment Predicates", description = "Read-only checks on assignment configuration"),
        (name = "Questions", description = "Rubric question CRUD"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Origins that fail to parse as header values are skipped with a warning.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}
