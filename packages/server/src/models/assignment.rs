use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{FieldErrors, check_min, check_required_text, double_option, field_error};
use crate::entity::{assignment, participant, tree_node};
use crate::error::AppError;

const TITLE_MAX: usize = 256;

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CreateAssignmentRequest {
    /// Required, 1-256 characters.
    #[schema(example = "Program 1")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_badge: Option<bool>,
    pub enable_pair_programming: Option<bool>,
    pub staggered_deadline: Option<bool>,
    #[schema(example = 1)]
    pub max_team_size: Option<i32>,
    pub is_calibrated: Option<bool>,
    pub num_reviews_required: Option<i32>,
    pub num_reviews_allowed: Option<i32>,
    pub num_metareviews_required: Option<i32>,
    pub num_metareviews_allowed: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub has_badge: Option<bool>,
    pub enable_pair_programming: Option<bool>,
    pub staggered_deadline: Option<bool>,
    pub max_team_size: Option<i32>,
    pub is_calibrated: Option<bool>,
    pub num_reviews_required: Option<i32>,
    pub num_reviews_allowed: Option<i32>,
    pub num_metareviews_required: Option<i32>,
    pub num_metareviews_allowed: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParticipantQuery {
    /// User to add to or remove from the roster.
    pub user_id: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewTypeQuery {
    /// `review` or `metareview`.
    pub review_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<i32>,
    pub has_badge: bool,
    pub enable_pair_programming: bool,
    pub staggered_deadline: bool,
    pub max_team_size: i32,
    pub is_calibrated: bool,
    pub num_reviews_required: i32,
    pub num_reviews_allowed: i32,
    pub num_metareviews_required: i32,
    pub num_metareviews_allowed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<assignment::Model> for AssignmentResponse {
    fn from(m: assignment::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            course_id: m.course_id,
            has_badge: m.has_badge,
            enable_pair_programming: m.enable_pair_programming,
            staggered_deadline: m.staggered_deadline,
            max_team_size: m.max_team_size,
            is_calibrated: m.is_calibrated,
            num_reviews_required: m.num_reviews_required,
            num_reviews_allowed: m.num_reviews_allowed,
            num_metareviews_required: m.num_metareviews_required,
            num_metareviews_allowed: m.num_metareviews_allowed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub id: i32,
    pub assignment_id: i32,
    pub user_id: i32,
    pub handle: String,
    pub can_submit: bool,
    pub can_review: bool,
    pub can_take_quiz: bool,
    pub created_at: DateTime<Utc>,
}

impl From<participant::Model> for ParticipantResponse {
    fn from(m: participant::Model) -> Self {
        Self {
            id: m.id,
            assignment_id: m.assignment_id,
            user_id: m.user_id,
            handle: m.handle,
            can_submit: m.can_submit,
            can_review: m.can_review,
            can_take_quiz: m.can_take_quiz,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TreeNodeResponse {
    pub id: i32,
    #[schema(example = "AssignmentNode")]
    pub node_type: String,
    pub node_object_id: i32,
    pub parent_id: Option<i32>,
}

impl From<tree_node::Model> for TreeNodeResponse {
    fn from(m: tree_node::Model) -> Self {
        Self {
            id: m.id,
            node_type: m.node_type,
            node_object_id: m.node_object_id,
            parent_id: m.parent_id,
        }
    }
}

/// Outcome of the review-count check.
#[derive(Serialize, utoipa::ToSchema, Debug, PartialEq)]
pub struct ReviewCountCheck {
    pub success: bool,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_create_assignment(req: &CreateAssignmentRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "title", req.title.as_deref(), TITLE_MAX);
    check_counts(
        &mut errors,
        req.max_team_size,
        [
            ("num_reviews_required", req.num_reviews_required),
            ("num_reviews_allowed", req.num_reviews_allowed),
            ("num_metareviews_required", req.num_metareviews_required),
            ("num_metareviews_allowed", req.num_metareviews_allowed),
        ],
    );
    errors.into_result()
}

pub fn validate_update_assignment(req: &UpdateAssignmentRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if req.title.is_some() {
        check_required_text(&mut errors, "title", req.title.as_deref(), TITLE_MAX);
    }
    check_counts(
        &mut errors,
        req.max_team_size,
        [
            ("num_reviews_required", req.num_reviews_required),
            ("num_reviews_allowed", req.num_reviews_allowed),
            ("num_metareviews_required", req.num_metareviews_required),
            ("num_metareviews_allowed", req.num_metareviews_allowed),
        ],
    );
    errors.into_result()
}

/// Title of a duplicated assignment, held to the same limit as a created one.
pub fn copy_title(source_title: &str) -> Result<String, AppError> {
    let title = format!("Copy of {source_title}");
    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "title", Some(&title), TITLE_MAX);
    errors.into_result()?;
    Ok(title)
}

fn check_counts(
    errors: &mut FieldErrors,
    max_team_size: Option<i32>,
    review_counts: [(&str, Option<i32>); 4],
) {
    check_min(errors, "max_team_size", max_team_size, 1);
    for (field, value) in review_counts {
        check_min(errors, field, value, 0);
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewType {
    Review,
    Metareview,
}

impl ReviewType {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            Some("review") => Ok(ReviewType::Review),
            Some("metareview") => Ok(ReviewType::Metareview),
            _ => Err(field_error(
                "review_type",
                "must be one of: review, metareview",
            )),
        }
    }
}

/// A review type is valid when at least as many reviews are allowed as required.
pub fn check_review_counts(model: &assignment::Model, review_type: ReviewType) -> ReviewCountCheck {
    match review_type {
        ReviewType::Review => review_count_check(
            model.num_reviews_required,
            model.num_reviews_allowed,
            "reviews",
        ),
        ReviewType::Metareview => review_count_check(
            model.num_metareviews_required,
            model.num_metareviews_allowed,
            "metareviews",
        ),
    }
}

fn review_count_check(required: i32, allowed: i32, label: &str) -> ReviewCountCheck {
    if allowed >= required {
        ReviewCountCheck {
            success: true,
            message: None,
        }
    } else {
        ReviewCountCheck {
            success: false,
            message: Some(format!(
                "Number of {label} required ({required}) cannot be greater than number of {label} allowed ({allowed})"
            )),
        }
    }
}

/// One question of a rubric, stripped of identity (ids, questionnaire, seq value).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RubricItem {
    pub txt: String,
    pub question_type: String,
    pub weight: Option<i32>,
    pub break_before: bool,
}

/// A questionnaire's questions in seq order.
pub type RubricContent = Vec<RubricItem>;

/// Whether the rubric content differs between review rounds.
///
/// `by_round` maps each numbered round to the questionnaires linked to it;
/// `all_rounds` holds questionnaires linked without a round, which apply to
/// every round. Two rounds are equal when they hold the same set of rubric
/// contents. Fewer than two numbered rounds never vary.
pub fn rubrics_vary_by_round(
    by_round: &BTreeMap<i32, Vec<RubricContent>>,
    all_rounds: &[RubricContent],
) -> bool {
    if by_round.len() < 2 {
        return false;
    }
    let mut rounds = by_round.values().map(|rubrics| {
        rubrics
            .iter()
            .chain(all_rounds.iter())
            .cloned()
            .collect::<BTreeSet<RubricContent>>()
    });
    let Some(first) = rounds.next() else {
        return false;
    };
    rounds.any(|round| round != first)
}
