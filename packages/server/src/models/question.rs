use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{FieldErrors, check_min, check_required_text, double_option};
use crate::entity::question;
use crate::error::AppError;

const TXT_MAX: usize = 10_000;
const TYPE_MAX: usize = 64;

/// Create payload. Every field is optional at the type level so that a
/// missing questionnaire can be answered with 404 before the remaining
/// fields are validated.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    #[schema(example = 1)]
    pub questionnaire_id: Option<i32>,
    /// Ordering key. Defaults to one past the questionnaire's current maximum.
    pub seq: Option<i32>,
    #[schema(example = "Is the code well documented?")]
    pub txt: Option<String>,
    #[schema(example = "Criterion")]
    pub question_type: Option<String>,
    pub break_before: Option<bool>,
    #[schema(example = 1)]
    pub weight: Option<i32>,
    pub size: Option<String>,
    pub alternatives: Option<String>,
    pub min_label: Option<String>,
    pub max_label: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateQuestionRequest {
    pub seq: Option<i32>,
    pub txt: Option<String>,
    pub question_type: Option<String>,
    pub break_before: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub weight: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub size: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub alternatives: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub min_label: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub max_label: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: i32,
    pub questionnaire_id: i32,
    pub seq: i32,
    pub txt: String,
    pub question_type: String,
    pub break_before: bool,
    pub weight: Option<i32>,
    pub size: Option<String>,
    pub alternatives: Option<String>,
    pub min_label: Option<String>,
    pub max_label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<question::Model> for QuestionResponse {
    fn from(m: question::Model) -> Self {
        Self {
            id: m.id,
            questionnaire_id: m.questionnaire_id,
            seq: m.seq,
            txt: m.txt,
            question_type: m.question_type,
            break_before: m.break_before,
            weight: m.weight,
            size: m.size,
            alternatives: m.alternatives,
            min_label: m.min_label,
            max_label: m.max_label,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Presentation hints a question type starts with.
#[derive(Debug, Default, PartialEq)]
pub struct TypeDefaults {
    pub size: Option<&'static str>,
    pub alternatives: Option<&'static str>,
    pub min_label: Option<&'static str>,
    pub max_label: Option<&'static str>,
}

const MIN_LABEL: &str = "Strongly disagree";
const MAX_LABEL: &str = "Strongly agree";

pub fn type_defaults(question_type: &str) -> TypeDefaults {
    match question_type {
        "Scale" => TypeDefaults {
            min_label: Some(MIN_LABEL),
            max_label: Some(MAX_LABEL),
            ..Default::default()
        },
        "Criterion" | "Cake" => TypeDefaults {
            size: Some("50, 3"),
            min_label: Some(MIN_LABEL),
            max_label: Some(MAX_LABEL),
            ..Default::default()
        },
        "Dropdown" => TypeDefaults {
            alternatives: Some("0|1|2|3|4|5"),
            ..Default::default()
        },
        "TextArea" => TypeDefaults {
            size: Some("60, 5"),
            ..Default::default()
        },
        "TextField" => TypeDefaults {
            size: Some("30"),
            ..Default::default()
        },
        _ => TypeDefaults::default(),
    }
}

/// A blank or missing presentation field falls back to the type default.
pub fn or_type_default(given: Option<String>, default: Option<&'static str>) -> Option<String> {
    given
        .filter(|s| !s.trim().is_empty())
        .or_else(|| default.map(String::from))
}

/// Fields required besides `questionnaire_id`, which is resolved first.
pub fn validate_create_question(req: &CreateQuestionRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "txt", req.txt.as_deref(), TXT_MAX);
    check_required_text(&mut errors, "question_type", req.question_type.as_deref(), TYPE_MAX);
    if req.break_before.is_none() {
        errors.add("break_before", "must be true or false");
    }
    match req.weight {
        None => errors.add("weight", "can't be blank"),
        w => check_min(&mut errors, "weight", w, 0),
    }
    check_min(&mut errors, "seq", req.seq, 0);
    errors.into_result()
}

pub fn validate_update_question(req: &UpdateQuestionRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if req.txt.is_some() {
        check_required_text(&mut errors, "txt", req.txt.as_deref(), TXT_MAX);
    }
    if req.question_type.is_some() {
        check_required_text(&mut errors, "question_type", req.question_type.as_deref(), TYPE_MAX);
    }
    check_min(&mut errors, "seq", req.seq, 0);
    check_min(&mut errors, "weight", req.weight.flatten(), 0);
    errors.into_result()
}
