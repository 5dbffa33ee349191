use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// StudentAssessmentMark
///
/// A student's total mark for one assessment component, from the
/// `student_assessment_marks` table. `marks_obtained` is validated against the
/// component's `total_marks` before insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StudentAssessmentMark {
    pub id: Uuid,
    pub student_id: Uuid,
    pub component_id: Uuid,
    pub marks_obtained: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// StudentQuestionMark
///
/// A student's mark on a single question, from the `student_question_marks`
/// table. These feed the CLO attainment computation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StudentQuestionMark {
    pub id: Uuid,
    pub student_id: Uuid,
    pub question_id: Uuid,
    pub marks_obtained: f64,
}

// --- Request Payloads (Input Schemas) ---

/// CreateMarkRequest
///
/// One component-level mark entry. Also the element type of the bulk payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMarkRequest {
    pub student_id: Uuid,
    pub component_id: Uuid,
    pub marks_obtained: f64,
}

/// BulkMarksRequest
///
/// Input payload for POST /api/marks/bulk. Entries are processed one by one;
/// a single bad row never aborts the batch.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BulkMarksRequest {
    pub entries: Vec<CreateMarkRequest>,
}

/// CreateQuestionMarkRequest
///
/// One question-level mark entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateQuestionMarkRequest {
    pub student_id: Uuid,
    pub question_id: Uuid,
    pub marks_obtained: f64,
}

/// BulkQuestionMarksRequest
///
/// Input payload for POST /api/marks/questions/bulk.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BulkQuestionMarksRequest {
    pub entries: Vec<CreateQuestionMarkRequest>,
}

/// BulkEntryError
///
/// Describes one rejected row of a bulk batch: its zero-based index in the
/// request plus the validation message.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BulkEntryError {
    pub index: usize,
    pub message: String,
}

/// BulkOutcome
///
/// Output schema for the bulk endpoints: tallies of saved and failed rows.
/// All saved -> 201, mixed -> 207 Multi-Status, none saved -> 400.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BulkOutcome {
    pub saved: usize,
    pub failed: usize,
    pub errors: Vec<BulkEntryError>,
}
