use std::collections::{BTreeMap, HashMap};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{LockType, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    assignment, assignment_questionnaire, course, participant, question, sign_up_topic,
    signed_up_team, team, teams_user, tree_node, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::assignment::*;
use crate::models::shared::{MessageResponse, field_error};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    tag = "Assignments",
    operation_id = "listAssignments",
    summary = "List all assignments",
    responses(
        (status = 200, description = "All assignments, ordered by id", body = Vec<AssignmentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_assignments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, AppError> {
    let rows = assignment::Entity::find()
        .order_by_asc(assignment::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "getAssignment",
    summary = "Get an assignment by ID",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = AssignmentResponse),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_assignment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let model = find_assignment(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    tag = "Assignments",
    operation_id = "createAssignment",
    summary = "Create a new assignment",
    description = "Creates an assignment. `title` is required; every other field falls back to its default. Requires `assignment:manage` permission.",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = ?payload.title))]
pub async fn create_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("assignment:manage")?;
    validate_create_assignment(&payload)?;

    let now = chrono::Utc::now();
    let new_assignment = assignment::ActiveModel {
        title: Set(payload.title.unwrap_or_default().trim().to_string()),
        description: Set(payload.description),
        course_id: Set(None),
        has_badge: Set(payload.has_badge.unwrap_or(false)),
        enable_pair_programming: Set(payload.enable_pair_programming.unwrap_or(false)),
        staggered_deadline: Set(payload.staggered_deadline.unwrap_or(false)),
        max_team_size: Set(payload.max_team_size.unwrap_or(1)),
        is_calibrated: Set(payload.is_calibrated.unwrap_or(false)),
        num_reviews_required: Set(payload.num_reviews_required.unwrap_or(0)),
        num_reviews_allowed: Set(payload.num_reviews_allowed.unwrap_or(0)),
        num_metareviews_required: Set(payload.num_metareviews_required.unwrap_or(0)),
        num_metareviews_allowed: Set(payload.num_metareviews_allowed.unwrap_or(0)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_assignment.insert(&state.db).await?;
    tracing::info!(assignment_id = model.id, user_id = auth_user.user_id, "Created assignment");

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "updateAssignment",
    summary = "Update an existing assignment",
    description = "Partially updates an assignment (PATCH and PUT behave the same). An empty payload returns the current resource unchanged. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    if payload == UpdateAssignmentRequest::default() {
        let existing = find_assignment(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_assignment_for_update(&txn, id).await?;
    validate_update_assignment(&payload)?;

    let mut active: assignment::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(has_badge) = payload.has_badge {
        active.has_badge = Set(has_badge);
    }
    if let Some(enable_pair_programming) = payload.enable_pair_programming {
        active.enable_pair_programming = Set(enable_pair_programming);
    }
    if let Some(staggered_deadline) = payload.staggered_deadline {
        active.staggered_deadline = Set(staggered_deadline);
    }
    if let Some(max_team_size) = payload.max_team_size {
        active.max_team_size = Set(max_team_size);
    }
    if let Some(is_calibrated) = payload.is_calibrated {
        active.is_calibrated = Set(is_calibrated);
    }
    if let Some(n) = payload.num_reviews_required {
        active.num_reviews_required = Set(n);
    }
    if let Some(n) = payload.num_reviews_allowed {
        active.num_reviews_allowed = Set(n);
    }
    if let Some(n) = payload.num_metareviews_required {
        active.num_metareviews_required = Set(n);
    }
    if let Some(n) = payload.num_metareviews_allowed {
        active.num_metareviews_allowed = Set(n);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "deleteAssignment",
    summary = "Delete an assignment by ID",
    description = "Deletes an assignment together with its participants, teams, topics, rubric links and tree node. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment deleted", body = MessageResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Assignment still referenced (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let txn = state.db.begin().await?;
    find_assignment_for_update(&txn, id).await?;

    let team_ids: Vec<i32> = team::Entity::find()
        .filter(team::Column::AssignmentId.eq(id))
        .select_only()
        .column(team::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;
    let topic_ids: Vec<i32> = sign_up_topic::Entity::find()
        .filter(sign_up_topic::Column::AssignmentId.eq(id))
        .select_only()
        .column(sign_up_topic::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    signed_up_team::Entity::delete_many()
        .filter(
            Condition::any()
                .add(signed_up_team::Column::TeamId.is_in(team_ids.clone()))
                .add(signed_up_team::Column::SignUpTopicId.is_in(topic_ids)),
        )
        .exec(&txn)
        .await?;
    teams_user::Entity::delete_many()
        .filter(teams_user::Column::TeamId.is_in(team_ids))
        .exec(&txn)
        .await?;
    team::Entity::delete_many()
        .filter(team::Column::AssignmentId.eq(id))
        .exec(&txn)
        .await?;
    sign_up_topic::Entity::delete_many()
        .filter(sign_up_topic::Column::AssignmentId.eq(id))
        .exec(&txn)
        .await?;
    participant::Entity::delete_many()
        .filter(participant::Column::AssignmentId.eq(id))
        .exec(&txn)
        .await?;
    assignment_questionnaire::Entity::delete_many()
        .filter(assignment_questionnaire::Column::AssignmentId.eq(id))
        .exec(&txn)
        .await?;
    tree_node::Entity::delete_many()
        .filter(tree_node::Column::NodeType.eq(tree_node::ASSIGNMENT_NODE))
        .filter(tree_node::Column::NodeObjectId.eq(id))
        .exec(&txn)
        .await?;
    assignment::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(assignment_id = id, user_id = auth_user.user_id, "Deleted assignment");

    Ok(Json(MessageResponse::new("Assignment deleted successfully!")))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/add_participant",
    tag = "Assignment Participants",
    operation_id = "addParticipant",
    summary = "Add a user to the assignment roster",
    description = "Creates a participant row for the user. The user must exist and must not already be a participant. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID"), ParticipantQuery),
    responses(
        (status = 200, description = "Participant added", body = ParticipantResponse),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Missing, unknown or duplicate user (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = ?query.user_id))]
pub async fn add_participant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppQuery(query): AppQuery<ParticipantQuery>,
) -> Result<Json<ParticipantResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let txn = state.db.begin().await?;
    find_assignment_for_update(&txn, id).await?;

    let user_id = query
        .user_id
        .ok_or_else(|| field_error("user_id", "must exist"))?;
    let target_user = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| field_error("user_id", "must exist"))?;

    let already = participant::Entity::find()
        .filter(participant::Column::AssignmentId.eq(id))
        .filter(participant::Column::UserId.eq(user_id))
        .select_only()
        .column(participant::Column::Id)
        .into_tuple::<i32>()
        .one(&txn)
        .await?
        .is_some();
    if already {
        return Err(field_error("user_id", "is already a participant"));
    }

    let new_participant = participant::ActiveModel {
        assignment_id: Set(id),
        user_id: Set(user_id),
        handle: Set(target_user.name),
        can_submit: Set(true),
        can_review: Set(true),
        can_take_quiz: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_participant.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(assignment_id = id, user_id, "Added participant");
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/remove_participant",
    tag = "Assignment Participants",
    operation_id = "removeParticipant",
    summary = "Remove a user from the assignment roster",
    description = "Deletes the user's participant row, if any, and touches the assignment. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID"), ParticipantQuery),
    responses(
        (status = 200, description = "Participant removed", body = MessageResponse),
        (status = 404, description = "User or assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Unparseable user_id (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = ?query.user_id))]
pub async fn remove_participant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppQuery(query): AppQuery<ParticipantQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let txn = state.db.begin().await?;
    let target_user = match query.user_id {
        Some(user_id) => user::Entity::find_by_id(user_id).one(&txn).await?,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let existing = find_assignment_for_update(&txn, id).await?;

    let removed = participant::Entity::delete_many()
        .filter(participant::Column::AssignmentId.eq(id))
        .filter(participant::Column::UserId.eq(target_user.id))
        .exec(&txn)
        .await?;

    let mut active: assignment::ActiveModel = existing.into();
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        assignment_id = id,
        user_id = target_user.id,
        removed = removed.rows_affected,
        "Removed participant"
    );
    Ok(Json(MessageResponse::new("Participant removed successfully!")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}/remove_assignment_from_course",
    tag = "Assignment Courses",
    operation_id = "removeAssignmentFromCourse",
    summary = "Detach an assignment from its course",
    description = "Clears the course reference. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment detached", body = AssignmentResponse),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn remove_assignment_from_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_assignment_for_update(&txn, id).await?;
    let previous = existing.course_id;

    let mut active: assignment::ActiveModel = existing.into();
    active.course_id = Set(None);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(assignment_id = id, course_id = ?previous, "Detached assignment from course");
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}/assign_course/{course_id}",
    tag = "Assignment Courses",
    operation_id = "assignCourse",
    summary = "Attach an assignment to a course",
    description = "Sets the course reference. Requires `assignment:manage` permission.",
    params(
        ("id" = i32, Path, description = "Assignment ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Assignment attached", body = AssignmentResponse),
        (status = 404, description = "Assignment or course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn assign_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((id, course_id)): AppPath<(i32, i32)>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_assignment_for_update(&txn, id).await?;
    course::Entity::find_by_id(course_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))?;

    let mut active: assignment::ActiveModel = existing.into();
    active.course_id = Set(Some(course_id));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(assignment_id = id, course_id, "Attached assignment to course");
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/copy_assignment",
    tag = "Assignments",
    operation_id = "copyAssignment",
    summary = "Duplicate an assignment",
    description = "Creates a new assignment named `Copy of <title>` with the same settings and course. Participants, teams, topics and rubric links are not copied. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Copy created", body = AssignmentResponse),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Copied title exceeds the title limit (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn copy_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let source = find_assignment(&state.db, id).await?;
    let title = copy_title(&source.title)?;
    let now = chrono::Utc::now();
    let copy = assignment::ActiveModel {
        title: Set(title),
        description: Set(source.description),
        course_id: Set(source.course_id),
        has_badge: Set(source.has_badge),
        enable_pair_programming: Set(source.enable_pair_programming),
        staggered_deadline: Set(source.staggered_deadline),
        max_team_size: Set(source.max_team_size),
        is_calibrated: Set(source.is_calibrated),
        num_reviews_required: Set(source.num_reviews_required),
        num_reviews_allowed: Set(source.num_reviews_allowed),
        num_metareviews_required: Set(source.num_metareviews_required),
        num_metareviews_allowed: Set(source.num_metareviews_allowed),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = copy.insert(&state.db).await?;

    tracing::info!(source_id = id, assignment_id = model.id, "Copied assignment");
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/has_badge",
    tag = "Assignment Predicates",
    operation_id = "hasBadge",
    summary = "Whether the assignment awards a badge",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn has_badge(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(find_assignment(&state.db, id).await?.has_badge))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/pair_programming_enabled",
    tag = "Assignment Predicates",
    operation_id = "pairProgrammingEnabled",
    summary = "Whether pair programming is enabled",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn pair_programming_enabled(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(
        find_assignment(&state.db, id).await?.enable_pair_programming,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/has_topics",
    tag = "Assignment Predicates",
    operation_id = "hasTopics",
    summary = "Whether at least one sign-up topic exists",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn has_topics(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    find_assignment(&state.db, id).await?;
    let exists = sign_up_topic::Entity::find()
        .filter(sign_up_topic::Column::AssignmentId.eq(id))
        .select_only()
        .column(sign_up_topic::Column::Id)
        .into_tuple::<i32>()
        .one(&state.db)
        .await?
        .is_some();
    Ok(Json(exists))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/team_assignment",
    tag = "Assignment Predicates",
    operation_id = "teamAssignment",
    summary = "Whether the assignment is done in teams (max team size above one)",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn team_assignment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(find_assignment(&state.db, id).await?.max_team_size > 1))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/valid_num_review",
    tag = "Assignment Predicates",
    operation_id = "validNumReview",
    summary = "Whether the allowed review count covers the required one",
    params(("id" = i32, Path, description = "Assignment ID"), ReviewTypeQuery),
    responses(
        (status = 200, description = "Check result", body = ReviewCountCheck),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Unknown review type (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(review_type = ?query.review_type))]
pub async fn valid_num_review(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppQuery(query): AppQuery<ReviewTypeQuery>,
) -> Result<Json<ReviewCountCheck>, AppError> {
    let model = find_assignment(&state.db, id).await?;
    let review_type = ReviewType::parse(query.review_type.as_deref())?;
    Ok(Json(check_review_counts(&model, review_type)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/is_calibrated",
    tag = "Assignment Predicates",
    operation_id = "isCalibrated",
    summary = "Whether the assignment uses calibrated reviews",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn is_calibrated(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(find_assignment(&state.db, id).await?.is_calibrated))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/has_teams",
    tag = "Assignment Predicates",
    operation_id = "hasTeams",
    summary = "Whether at least one team exists",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn has_teams(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    find_assignment(&state.db, id).await?;
    let exists = team::Entity::find()
        .filter(team::Column::AssignmentId.eq(id))
        .select_only()
        .column(team::Column::Id)
        .into_tuple::<i32>()
        .one(&state.db)
        .await?
        .is_some();
    Ok(Json(exists))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/staggered_and_no_topic",
    tag = "Assignment Predicates",
    operation_id = "staggeredAndNoTopic",
    summary = "Whether deadlines are staggered and the caller has no topic yet",
    description = "Looks up the topic the caller's team in this assignment signed up for. True when the assignment uses staggered deadlines and there is no such topic.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn staggered_and_no_topic(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    let model = find_assignment(&state.db, id).await?;
    let topic_id = signed_up_topic_for_user(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.staggered_deadline && topic_id.is_none()))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/create_node",
    tag = "Assignments",
    operation_id = "createNode",
    summary = "Add the assignment to the course hierarchy",
    description = "Creates an AssignmentNode whose parent is the node of the assignment's course, when that course has one. Requires `assignment:manage` permission.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Node created", body = TreeNodeResponse),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn create_node(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<TreeNodeResponse>, AppError> {
    auth_user.require_permission("assignment:manage")?;

    let model = find_assignment(&state.db, id).await?;
    let parent_id = match model.course_id {
        Some(course_id) => {
            tree_node::Entity::find()
                .filter(tree_node::Column::NodeType.eq(tree_node::COURSE_NODE))
                .filter(tree_node::Column::NodeObjectId.eq(course_id))
                .select_only()
                .column(tree_node::Column::Id)
                .into_tuple::<i32>()
                .one(&state.db)
                .await?
        }
        None => None,
    };

    let node = tree_node::ActiveModel {
        node_type: Set(tree_node::ASSIGNMENT_NODE.to_string()),
        node_object_id: Set(id),
        parent_id: Set(parent_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(assignment_id = id, node_id = node.id, parent_id = ?parent_id, "Created assignment node");
    Ok(Json(node.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/varying_rubrics_by_round",
    tag = "Assignment Predicates",
    operation_id = "varyingRubricsByRound",
    summary = "Whether rubric content differs between review rounds",
    description = "Compares the questions of the rubrics linked to each round. Rubrics linked without a round apply to every round.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Predicate value", body = bool),
        (status = 404, description = "Assignment not found, or no rubric linked (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn varying_rubrics_by_round(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<bool>, AppError> {
    find_assignment(&state.db, id).await?;

    let links = assignment_questionnaire::Entity::find()
        .filter(assignment_questionnaire::Column::AssignmentId.eq(id))
        .all(&state.db)
        .await?;
    if links.is_empty() {
        return Err(AppError::NotFound(
            "No questionnaire/rubric exists for this assignment.".into(),
        ));
    }

    let questionnaire_ids: Vec<i32> = links.iter().map(|l| l.questionnaire_id).collect();
    let questions = question::Entity::find()
        .filter(question::Column::QuestionnaireId.is_in(questionnaire_ids))
        .order_by_asc(question::Column::Seq)
        .order_by_asc(question::Column::Id)
        .all(&state.db)
        .await?;

    let mut contents: HashMap<i32, RubricContent> = HashMap::new();
    for q in questions {
        contents.entry(q.questionnaire_id).or_default().push(RubricItem {
            txt: q.txt,
            question_type: q.question_type,
            weight: q.weight,
            break_before: q.break_before,
        });
    }

    let mut by_round: BTreeMap<i32, Vec<RubricContent>> = BTreeMap::new();
    let mut all_rounds = Vec::new();
    for link in links {
        let content = contents
            .get(&link.questionnaire_id)
            .cloned()
            .unwrap_or_default();
        match link.used_in_round {
            Some(round) => by_round.entry(round).or_default().push(content),
            None => all_rounds.push(content),
        }
    }

    Ok(Json(rubrics_vary_by_round(&by_round, &all_rounds)))
}

async fn find_assignment<C: ConnectionTrait>(db: &C, id: i32) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}

async fn find_assignment_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}

/// First topic a team of `user_id` within the assignment has signed up for.
async fn signed_up_topic_for_user<C: ConnectionTrait>(
    db: &C,
    assignment_id: i32,
    user_id: i32,
) -> Result<Option<i32>, AppError> {
    let user_teams = SeaQuery::select()
        .column(teams_user::Column::TeamId)
        .from(teams_user::Entity)
        .and_where(teams_user::Column::UserId.eq(user_id))
        .and_where(
            teams_user::Column::TeamId.in_subquery(
                SeaQuery::select()
                    .column(team::Column::Id)
                    .from(team::Entity)
                    .and_where(team::Column::AssignmentId.eq(assignment_id))
                    .to_owned(),
            ),
        )
        .to_owned();

    let topic_id = signed_up_team::Entity::find()
        .filter(signed_up_team::Column::TeamId.in_subquery(user_teams))
        .order_by_asc(signed_up_team::Column::Id)
        .select_only()
        .column(signed_up_team::Column::SignUpTopicId)
        .into_tuple::<i32>()
        .one(db)
        .await?;
    Ok(topic_id)
}
