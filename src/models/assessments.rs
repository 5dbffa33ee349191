use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// AssessmentType
///
/// A reusable assessment category ("Quiz", "Midterm", "Final", ...) from the
/// `assessment_types` table. Deleting a type that components still reference
/// is rejected with 409 at the handler layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AssessmentType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// AssessmentComponent
///
/// A concrete assessment instance within a course offering ("Quiz 2",
/// "Final Exam"), carrying its total marks and contribution weight toward the
/// final course percentage.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AssessmentComponent {
    pub id: Uuid,
    pub course_offering_id: Uuid,
    pub assessment_type_id: Uuid,
    pub title: String,
    pub total_marks: f64,
    // Contribution toward the final course percentage, in [0, 100].
    pub weight_percentage: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CloAllocation
///
/// A row of the `assessment_clo_mappings` table: how many of a component's
/// marks are allocated to one CLO.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CloAllocation {
    pub component_id: Uuid,
    pub clo_id: Uuid,
    pub clo_code: String,
    pub allocated_marks: f64,
}

/// Question
///
/// A question within an assessment component, mapped to exactly one CLO.
/// Question marks are the raw input of the attainment computation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub component_id: Uuid,
    pub question_no: i32,
    pub clo_id: Uuid,
    pub max_marks: f64,
}

// --- Request Payloads (Input Schemas) ---

/// CreateAssessmentTypeRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAssessmentTypeRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CreateComponentRequest
///
/// Input payload for POST /api/assessments/components.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateComponentRequest {
    pub course_offering_id: Uuid,
    pub assessment_type_id: Uuid,
    pub title: String,
    pub total_marks: f64,
    pub weight_percentage: f64,
}

/// UpdateComponentRequest
///
/// Partial update payload for PUT /api/assessments/components/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateComponentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_percentage: Option<f64>,
}

/// SetCloAllocationRequest
///
/// Input payload for POST /api/assessments/components/{id}/clos: assigns (or
/// reassigns) the marks a component allocates to one CLO.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SetCloAllocationRequest {
    pub clo_id: Uuid,
    pub allocated_marks: f64,
}

/// CreateQuestionRequest
///
/// Input payload for POST /api/assessments/components/{id}/questions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateQuestionRequest {
    pub question_no: i32,
    pub clo_id: Uuid,
    pub max_marks: f64,
}
