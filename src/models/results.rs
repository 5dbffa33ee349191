use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// StudentCloAttainmentRow
///
/// A derived row of the `student_clo_attainment` table: one student's
/// attainment of one CLO within a course offering. Recomputed on demand by
/// POST /api/attainment/compute/{course_offering_id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StudentCloAttainmentRow {
    pub student_id: Uuid,
    pub clo_id: Uuid,
    pub clo_code: String,
    pub course_offering_id: Uuid,
    pub percentage: f64,
    pub is_achieved: bool,
}

/// CloAttainmentSummaryRow
///
/// A derived row of the `course_clo_attainment_summary` table: the class-wide
/// roll-up per CLO for one course offering.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CloAttainmentSummaryRow {
    pub course_offering_id: Uuid,
    pub clo_id: Uuid,
    pub clo_code: String,
    pub target_attainment: f64,
    pub students_total: i64,
    pub students_achieved: i64,
    pub average_percentage: f64,
}

/// SemesterResult
///
/// A row of the `semester_results` table. Students only ever see rows with
/// `is_published = true`; publishing is an admin action.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SemesterResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub semester_id: Uuid,
    pub sgpa: f64,
    pub cgpa: f64,
    pub total_credit_hours: f64,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CourseGradeRow
///
/// Raw Database Row (Internal Use). One finalized course of a student within
/// a semester: the weighted final percentage (aggregated in SQL from component
/// marks and weights) plus the course's credit hours and the semester ordering
/// key. The calc layer maps `final_percentage` onto the grade scale.
#[derive(Debug, Clone, FromRow)]
pub struct CourseGradeRow {
    pub course_id: Uuid,
    pub semester_id: Uuid,
    pub credit_hours: f64,
    pub final_percentage: f64,
}

// --- Request Payloads (Input Schemas) ---

/// ComputeSemesterResultRequest
///
/// Input payload for POST /api/semester-results/compute.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ComputeSemesterResultRequest {
    pub student_id: Uuid,
    pub semester_id: Uuid,
}
