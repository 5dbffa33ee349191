use async_trait::async_trait;
use sqlx::query_builder::QueryBuilder;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::models::{
    CourseLearningOutcome, CreateCloRequest, CreatePloRequest, MappedPeo, MappedPlo,
    ProgramEducationalObjective, ProgramLearningOutcome, UpdateCloRequest, UpdatePloRequest,
};

/// OutcomeRepository
///
/// Persistence contract for CLOs, PLOs and their mapping tables
/// (CLO<->PLO with a 1-3 mapping level, PLO<->PEO with a correlation level).
#[async_trait]
pub trait OutcomeRepository: Send + Sync {
    // --- CLOs ---
    async fn list_clos(&self, course_id: Option<Uuid>) -> sqlx::Result<Vec<CourseLearningOutcome>>;
    async fn get_clo(&self, id: Uuid) -> sqlx::Result<Option<CourseLearningOutcome>>;
    /// Uniqueness probe for the per-course clo_code invariant. `exclude` skips
    /// the row being updated.
    async fn clo_code_in_use(
        &self,
        course_id: Uuid,
        clo_code: &str,
        exclude: Option<Uuid>,
    ) -> sqlx::Result<bool>;
    async fn create_clo(&self, req: &CreateCloRequest) -> sqlx::Result<CourseLearningOutcome>;
    async fn update_clo(
        &self,
        id: Uuid,
        req: &UpdateCloRequest,
    ) -> sqlx::Result<Option<CourseLearningOutcome>>;
    async fn delete_clo(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- PLOs ---
    async fn list_plos(&self, degree_id: Option<Uuid>) -> sqlx::Result<Vec<ProgramLearningOutcome>>;
    async fn get_plo(&self, id: Uuid) -> sqlx::Result<Option<ProgramLearningOutcome>>;
    async fn plo_no_in_use(&self, degree_id: Uuid, plo_no: i32) -> sqlx::Result<bool>;
    async fn create_plo(&self, req: &CreatePloRequest) -> sqlx::Result<ProgramLearningOutcome>;
    async fn update_plo(
        &self,
        id: Uuid,
        req: &UpdatePloRequest,
    ) -> sqlx::Result<Option<ProgramLearningOutcome>>;
    async fn delete_plo(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Mappings ---
    async fn plos_for_clo(&self, clo_id: Uuid) -> sqlx::Result<Vec<MappedPlo>>;
    /// Upserts the mapping; re-mapping an existing pair overwrites the level.
    async fn map_clo_plo(&self, clo_id: Uuid, plo_id: Uuid, level: i32) -> sqlx::Result<()>;
    async fn unmap_clo_plo(&self, clo_id: Uuid, plo_id: Uuid) -> sqlx::Result<bool>;
    async fn peos_for_plo(&self, plo_id: Uuid) -> sqlx::Result<Vec<MappedPeo>>;
    async fn get_peo(&self, id: Uuid) -> sqlx::Result<Option<ProgramEducationalObjective>>;
    async fn map_plo_peo(&self, plo_id: Uuid, peo_id: Uuid, level: &str) -> sqlx::Result<()>;
    async fn unmap_plo_peo(&self, plo_id: Uuid, peo_id: Uuid) -> sqlx::Result<bool>;

    /// For each CLO mapped to the PLO, its attainment percentage averaged over
    /// every course-offering summary row. Input of the PLO roll-up.
    async fn clo_average_percentages_for_plo(&self, plo_id: Uuid) -> sqlx::Result<Vec<f64>>;
}

pub type OutcomeRepositoryState = Arc<dyn OutcomeRepository>;

const CLO_COLUMNS: &str = "id, course_id, clo_code, description, bloom_level, \
                           weight_percentage, target_attainment, created_at, updated_at";

const PLO_COLUMNS: &str = "id, degree_id, plo_no, description, target_attainment, \
                           created_at, updated_at";

#[async_trait]
impl OutcomeRepository for PostgresRepository {
    /// Optional course filter via QueryBuilder, mirroring the listing style
    /// used across this codebase: the base query is fixed, filters are bound.
    async fn list_clos(&self, course_id: Option<Uuid>) -> sqlx::Result<Vec<CourseLearningOutcome>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {CLO_COLUMNS} FROM course_learning_outcomes WHERE 1 = 1"
        ));
        if let Some(course) = course_id {
            builder.push(" AND course_id = ");
            builder.push_bind(course);
        }
        builder.push(" ORDER BY clo_code ASC");
        builder
            .build_query_as::<CourseLearningOutcome>()
            .fetch_all(self.pool())
            .await
    }

    async fn get_clo(&self, id: Uuid) -> sqlx::Result<Option<CourseLearningOutcome>> {
        sqlx::query_as::<_, CourseLearningOutcome>(&format!(
            "SELECT {CLO_COLUMNS} FROM course_learning_outcomes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn clo_code_in_use(
        &self,
        course_id: Uuid,
        clo_code: &str,
        exclude: Option<Uuid>,
    ) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM course_learning_outcomes
            WHERE course_id = $1 AND clo_code = $2 AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(course_id)
        .bind(clo_code)
        .bind(exclude)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    async fn create_clo(&self, req: &CreateCloRequest) -> sqlx::Result<CourseLearningOutcome> {
        sqlx::query_as::<_, CourseLearningOutcome>(&format!(
            r#"
            INSERT INTO course_learning_outcomes
                (id, course_id, clo_code, description, bloom_level,
                 weight_percentage, target_attainment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {CLO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(req.course_id)
        .bind(&req.clo_code)
        .bind(&req.description)
        .bind(&req.bloom_level)
        .bind(req.weight_percentage)
        .bind(req.target_attainment)
        .fetch_one(self.pool())
        .await
    }

    /// COALESCE-based partial update: a column changes only when the matching
    /// request field is Some.
    async fn update_clo(
        &self,
        id: Uuid,
        req: &UpdateCloRequest,
    ) -> sqlx::Result<Option<CourseLearningOutcome>> {
        sqlx::query_as::<_, CourseLearningOutcome>(&format!(
            r#"
            UPDATE course_learning_outcomes
            SET clo_code = COALESCE($2, clo_code),
                description = COALESCE($3, description),
                bloom_level = COALESCE($4, bloom_level),
                weight_percentage = COALESCE($5, weight_percentage),
                target_attainment = COALESCE($6, target_attainment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.clo_code)
        .bind(&req.description)
        .bind(&req.bloom_level)
        .bind(req.weight_percentage)
        .bind(req.target_attainment)
        .fetch_optional(self.pool())
        .await
    }

    async fn delete_clo(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM course_learning_outcomes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_plos(
        &self,
        degree_id: Option<Uuid>,
    ) -> sqlx::Result<Vec<ProgramLearningOutcome>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {PLO_COLUMNS} FROM program_learning_outcomes WHERE 1 = 1"
        ));
        if let Some(degree) = degree_id {
            builder.push(" AND degree_id = ");
            builder.push_bind(degree);
        }
        builder.push(" ORDER BY plo_no ASC");
        builder
            .build_query_as::<ProgramLearningOutcome>()
            .fetch_all(self.pool())
            .await
    }

    async fn get_plo(&self, id: Uuid) -> sqlx::Result<Option<ProgramLearningOutcome>> {
        sqlx::query_as::<_, ProgramLearningOutcome>(&format!(
            "SELECT {PLO_COLUMNS} FROM program_learning_outcomes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn plo_no_in_use(&self, degree_id: Uuid, plo_no: i32) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM program_learning_outcomes WHERE degree_id = $1 AND plo_no = $2",
        )
        .bind(degree_id)
        .bind(plo_no)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    async fn create_plo(&self, req: &CreatePloRequest) -> sqlx::Result<ProgramLearningOutcome> {
        sqlx::query_as::<_, ProgramLearningOutcome>(&format!(
            r#"
            INSERT INTO program_learning_outcomes
                (id, degree_id, plo_no, description, target_attainment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {PLO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(req.degree_id)
        .bind(req.plo_no)
        .bind(&req.description)
        .bind(req.target_attainment)
        .fetch_one(self.pool())
        .await
    }

    async fn update_plo(
        &self,
        id: Uuid,
        req: &UpdatePloRequest,
    ) -> sqlx::Result<Option<ProgramLearningOutcome>> {
        sqlx::query_as::<_, ProgramLearningOutcome>(&format!(
            r#"
            UPDATE program_learning_outcomes
            SET description = COALESCE($2, description),
                target_attainment = COALESCE($3, target_attainment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PLO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.description)
        .bind(req.target_attainment)
        .fetch_optional(self.pool())
        .await
    }

    async fn delete_plo(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM program_learning_outcomes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn plos_for_clo(&self, clo_id: Uuid) -> sqlx::Result<Vec<MappedPlo>> {
        sqlx::query_as::<_, MappedPlo>(
            r#"
            SELECT p.id AS plo_id, p.plo_no, p.description, m.mapping_level
            FROM clo_plo_mappings m
            JOIN program_learning_outcomes p ON m.plo_id = p.id
            WHERE m.clo_id = $1
            ORDER BY p.plo_no ASC
            "#,
        )
        .bind(clo_id)
        .fetch_all(self.pool())
        .await
    }

    async fn map_clo_plo(&self, clo_id: Uuid, plo_id: Uuid, level: i32) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clo_plo_mappings (clo_id, plo_id, mapping_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (clo_id, plo_id) DO UPDATE SET mapping_level = EXCLUDED.mapping_level
            "#,
        )
        .bind(clo_id)
        .bind(plo_id)
        .bind(level)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn unmap_clo_plo(&self, clo_id: Uuid, plo_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM clo_plo_mappings WHERE clo_id = $1 AND plo_id = $2")
            .bind(clo_id)
            .bind(plo_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn peos_for_plo(&self, plo_id: Uuid) -> sqlx::Result<Vec<MappedPeo>> {
        sqlx::query_as::<_, MappedPeo>(
            r#"
            SELECT o.id AS peo_id, o.peo_no, o.description, m.correlation_level
            FROM plo_peo_mappings m
            JOIN program_educational_objectives o ON m.peo_id = o.id
            WHERE m.plo_id = $1
            ORDER BY o.peo_no ASC
            "#,
        )
        .bind(plo_id)
        .fetch_all(self.pool())
        .await
    }

    async fn get_peo(&self, id: Uuid) -> sqlx::Result<Option<ProgramEducationalObjective>> {
        sqlx::query_as::<_, ProgramEducationalObjective>(
            "SELECT id, degree_id, peo_no, description \
             FROM program_educational_objectives WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn map_plo_peo(&self, plo_id: Uuid, peo_id: Uuid, level: &str) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plo_peo_mappings (plo_id, peo_id, correlation_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (plo_id, peo_id) DO UPDATE SET correlation_level = EXCLUDED.correlation_level
            "#,
        )
        .bind(plo_id)
        .bind(peo_id)
        .bind(level)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn unmap_plo_peo(&self, plo_id: Uuid, peo_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM plo_peo_mappings WHERE plo_id = $1 AND peo_id = $2")
            .bind(plo_id)
            .bind(peo_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clo_average_percentages_for_plo(&self, plo_id: Uuid) -> sqlx::Result<Vec<f64>> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT AVG(s.average_percentage)
            FROM course_clo_attainment_summary s
            JOIN clo_plo_mappings m ON s.clo_id = m.clo_id
            WHERE m.plo_id = $1
            GROUP BY s.clo_id
            "#,
        )
        .bind(plo_id)
        .fetch_all(self.pool())
        .await
    }
}
