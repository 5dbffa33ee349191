use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Outcome Schemas (Mapped to Database) ---

/// CourseLearningOutcome
///
/// A CLO row from the `course_learning_outcomes` table. `clo_code` is the
/// human-facing identifier (e.g. "CLO-1") and must be unique within a course;
/// uniqueness is validated at the handler layer before insert/update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseLearningOutcome {
    pub id: Uuid,
    pub course_id: Uuid,
    pub clo_code: String,
    pub description: String,
    // Bloom taxonomy level, e.g. "Apply" or "C3".
    pub bloom_level: String,
    // Share of the course outcome weighting, in [0, 100].
    pub weight_percentage: f64,
    // Threshold percentage a student must reach for this CLO to count as achieved.
    pub target_attainment: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ProgramLearningOutcome
///
/// A PLO row from the `program_learning_outcomes` table. `plo_no` is unique
/// within a degree program.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProgramLearningOutcome {
    pub id: Uuid,
    pub degree_id: Uuid,
    pub plo_no: i32,
    pub description: String,
    pub target_attainment: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ProgramEducationalObjective
///
/// A PEO row from the `program_educational_objectives` table. PEOs are only
/// ever referenced through PLO correlation mappings; they have no CRUD surface
/// of their own in this API.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProgramEducationalObjective {
    pub id: Uuid,
    pub degree_id: Uuid,
    pub peo_no: i32,
    pub description: String,
}

/// MappedPlo
///
/// A PLO joined with its CLO mapping level (1 = low, 3 = high), returned by
/// GET /api/clos/{id}/plos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct MappedPlo {
    pub plo_id: Uuid,
    pub plo_no: i32,
    pub description: String,
    pub mapping_level: i32,
}

/// MappedPeo
///
/// A PEO joined with its PLO correlation level, returned by GET /api/plos/{id}/peos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct MappedPeo {
    pub peo_id: Uuid,
    pub peo_no: i32,
    pub description: String,
    // "High" | "Medium" | "Low"
    pub correlation_level: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateCloRequest
///
/// Input payload for POST /api/clos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCloRequest {
    pub course_id: Uuid,
    pub clo_code: String,
    pub description: String,
    pub bloom_level: String,
    pub weight_percentage: f64,
    pub target_attainment: f64,
}

/// UpdateCloRequest
///
/// Partial update payload for PUT /api/clos/{id}. Uses `Option<T>` plus
/// `skip_serializing_if` so only the provided fields travel over the wire;
/// the repository applies them with COALESCE.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCloRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clo_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_percentage: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_attainment: Option<f64>,
}

/// CreatePloRequest
///
/// Input payload for POST /api/plos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePloRequest {
    pub degree_id: Uuid,
    pub plo_no: i32,
    pub description: String,
    pub target_attainment: f64,
}

/// UpdatePloRequest
///
/// Partial update payload for PUT /api/plos/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePloRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_attainment: Option<f64>,
}

/// MapCloToPloRequest
///
/// Input payload for POST /api/clos/{id}/plos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapCloToPloRequest {
    pub plo_id: Uuid,
    // Must be 1, 2 or 3.
    pub mapping_level: i32,
}

/// MapPloToPeoRequest
///
/// Input payload for POST /api/plos/{id}/peos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapPloToPeoRequest {
    pub peo_id: Uuid,
    // Must be "High", "Medium" or "Low".
    pub correlation_level: String,
}

/// PloAttainment
///
/// Output schema for GET /api/plos/{id}/attainment: the average of the mapped
/// CLOs' class-average attainment percentages, classified against the PLO target.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PloAttainment {
    pub plo_id: Uuid,
    pub plo_no: i32,
    pub percentage: f64,
    pub target_attainment: f64,
    pub is_achieved: bool,
    // How many CLOs fed the average; 0 means the PLO is unmapped.
    pub clo_count: i64,
}

/// Correlation levels accepted for PLO-PEO mappings.
pub const VALID_CORRELATION_LEVELS: &[&str] = &["High", "Medium", "Low"];
