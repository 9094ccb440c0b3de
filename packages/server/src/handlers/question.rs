use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{question, questionnaire};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::question::*;
use crate::models::shared::MessageResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/questions",
    tag = "Questions",
    operation_id = "listQuestions",
    summary = "List all questions",
    responses(
        (status = 200, description = "All questions, ordered by id", body = Vec<QuestionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_questions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    let rows = question::Entity::find()
        .order_by_asc(question::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/show_all/questionnaire/{id}",
    tag = "Questions",
    operation_id = "listQuestionsByQuestionnaire",
    summary = "List the questions of one questionnaire",
    params(("id" = i32, Path, description = "Questionnaire ID")),
    responses(
        (status = 200, description = "Questions in insertion order", body = Vec<QuestionResponse>),
        (status = 404, description = "Questionnaire not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_by_questionnaire(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    find_questionnaire(&state.db, id).await?;

    let rows = question::Entity::find()
        .filter(question::Column::QuestionnaireId.eq(id))
        .order_by_asc(question::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Get a question by ID",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question details", body = QuestionResponse),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<QuestionResponse>, AppError> {
    let model = find_question(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions",
    tag = "Questions",
    operation_id = "createQuestion",
    summary = "Create a question under a questionnaire",
    description = "Creates a question. When `seq` is omitted the question is appended after the questionnaire's last one. Size, alternatives and labels default per question type. Requires `question:manage` permission.",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Questionnaire not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(questionnaire_id = ?payload.questionnaire_id))]
pub async fn create_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("question:manage")?;

    let txn = state.db.begin().await?;
    let parent = match payload.questionnaire_id {
        Some(id) => find_questionnaire_for_update(&txn, id).await?,
        None => return Err(AppError::NotFound("Couldn't find Questionnaire".into())),
    };
    validate_create_question(&payload)?;

    let seq = match payload.seq {
        Some(seq) => seq,
        None => {
            let max_seq: Option<i32> = question::Entity::find()
                .filter(question::Column::QuestionnaireId.eq(parent.id))
                .select_only()
                .column_as(question::Column::Seq.max(), "max_seq")
                .into_tuple::<Option<i32>>()
                .one(&txn)
                .await?
                .flatten();
            max_seq.map_or(1, |s| s + 1)
        }
    };

    let question_type = payload.question_type.unwrap_or_default().trim().to_string();
    let defaults = type_defaults(&question_type);
    let now = chrono::Utc::now();

    let new_question = question::ActiveModel {
        questionnaire_id: Set(parent.id),
        seq: Set(seq),
        txt: Set(payload.txt.unwrap_or_default().trim().to_string()),
        question_type: Set(question_type),
        break_before: Set(payload.break_before.unwrap_or(false)),
        weight: Set(payload.weight),
        size: Set(or_type_default(payload.size, defaults.size)),
        alternatives: Set(or_type_default(payload.alternatives, defaults.alternatives)),
        min_label: Set(or_type_default(payload.min_label, defaults.min_label)),
        max_label: Set(or_type_default(payload.max_label, defaults.max_label)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_question.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        question_id = model.id,
        questionnaire_id = parent.id,
        seq,
        "Created question"
    );
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "updateQuestion",
    summary = "Update a question",
    description = "Partially updates a question (PATCH and PUT behave the same). Nothing is persisted when validation fails. Requires `question:manage` permission.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    auth_user.require_permission("question:manage")?;

    if payload == UpdateQuestionRequest::default() {
        let existing = find_question(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_question_for_update(&txn, id).await?;
    validate_update_question(&payload)?;

    let mut active: question::ActiveModel = existing.into();

    if let Some(seq) = payload.seq {
        active.seq = Set(seq);
    }
    if let Some(txt) = payload.txt {
        active.txt = Set(txt.trim().to_string());
    }
    if let Some(question_type) = payload.question_type {
        active.question_type = Set(question_type.trim().to_string());
    }
    if let Some(break_before) = payload.break_before {
        active.break_before = Set(break_before);
    }
    if let Some(weight) = payload.weight {
        active.weight = Set(weight);
    }
    if let Some(size) = payload.size {
        active.size = Set(size);
    }
    if let Some(alternatives) = payload.alternatives {
        active.alternatives = Set(alternatives);
    }
    if let Some(min_label) = payload.min_label {
        active.min_label = Set(min_label);
    }
    if let Some(max_label) = payload.max_label {
        active.max_label = Set(max_label);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "deleteQuestion",
    summary = "Delete a question",
    description = "Requires `question:manage` permission.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("question:manage")?;

    let result = question::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Couldn't find Question".into()));
    }

    tracing::info!(question_id = id, user_id = auth_user.user_id, "Deleted question");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/delete_all/questionnaire/{id}",
    tag = "Questions",
    operation_id = "deleteAllQuestions",
    summary = "Delete every question of a questionnaire",
    description = "Questions of other questionnaires are untouched. Requires `question:manage` permission.",
    params(("id" = i32, Path, description = "Questionnaire ID")),
    responses(
        (status = 200, description = "Questions deleted", body = MessageResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Questionnaire not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_all(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_permission("question:manage")?;

    let txn = state.db.begin().await?;
    find_questionnaire_for_update(&txn, id).await?;
    let result = question::Entity::delete_many()
        .filter(question::Column::QuestionnaireId.eq(id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(
        questionnaire_id = id,
        deleted = result.rows_affected,
        "Deleted all questions of questionnaire"
    );
    Ok(Json(MessageResponse::new(format!(
        "All questions for Questionnaire ID:{id} have been deleted."
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/types",
    tag = "Questions",
    operation_id = "listQuestionTypes",
    summary = "List the question types in use",
    responses(
        (status = 200, description = "Distinct question types, sorted", body = Vec<String>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_types(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let types = question::Entity::find()
        .select_only()
        .column(question::Column::QuestionType)
        .distinct()
        .order_by_asc(question::Column::QuestionType)
        .into_tuple::<String>()
        .all(&state.db)
        .await?;
    Ok(Json(types))
}

async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find Question".into()))
}

async fn find_question_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find Question".into()))
}

async fn find_questionnaire<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<questionnaire::Model, AppError> {
    questionnaire::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find Questionnaire".into()))
}

/// Locks the questionnaire row so concurrent appends agree on the next `seq`.
async fn find_questionnaire_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<questionnaire::Model, AppError> {
    questionnaire::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find Questionnaire".into()))
}
