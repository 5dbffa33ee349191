use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::models::{
    AssessmentComponent, AssessmentType, CloAllocation, CreateAssessmentTypeRequest,
    CreateComponentRequest, CreateQuestionRequest, Question, UpdateComponentRequest,
};

/// AssessmentRepository
///
/// Persistence contract for assessment types, per-offering components, the
/// component->CLO mark allocation table, and questions.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    // --- Types ---
    async fn list_types(&self) -> sqlx::Result<Vec<AssessmentType>>;
    async fn create_type(&self, req: &CreateAssessmentTypeRequest) -> sqlx::Result<AssessmentType>;
    async fn update_type(
        &self,
        id: Uuid,
        req: &CreateAssessmentTypeRequest,
    ) -> sqlx::Result<Option<AssessmentType>>;
    /// True when any component still references the type; deletes are refused
    /// while this holds.
    async fn type_in_use(&self, id: Uuid) -> sqlx::Result<bool>;
    async fn delete_type(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Components ---
    async fn list_components(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<AssessmentComponent>>;
    async fn get_component(&self, id: Uuid) -> sqlx::Result<Option<AssessmentComponent>>;
    async fn create_component(
        &self,
        req: &CreateComponentRequest,
    ) -> sqlx::Result<AssessmentComponent>;
    async fn update_component(
        &self,
        id: Uuid,
        req: &UpdateComponentRequest,
    ) -> sqlx::Result<Option<AssessmentComponent>>;
    async fn delete_component(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- CLO allocations ---
    async fn clo_allocations(&self, component_id: Uuid) -> sqlx::Result<Vec<CloAllocation>>;
    async fn set_clo_allocation(
        &self,
        component_id: Uuid,
        clo_id: Uuid,
        allocated_marks: f64,
    ) -> sqlx::Result<()>;
    async fn delete_clo_allocation(&self, component_id: Uuid, clo_id: Uuid) -> sqlx::Result<bool>;

    // --- Questions ---
    async fn list_questions(&self, component_id: Uuid) -> sqlx::Result<Vec<Question>>;
    async fn get_question(&self, id: Uuid) -> sqlx::Result<Option<Question>>;
    async fn create_question(
        &self,
        component_id: Uuid,
        req: &CreateQuestionRequest,
    ) -> sqlx::Result<Question>;
    async fn delete_question(&self, id: Uuid) -> sqlx::Result<bool>;
}

pub type AssessmentRepositoryState = Arc<dyn AssessmentRepository>;

const COMPONENT_COLUMNS: &str = "id, course_offering_id, assessment_type_id, title, \
                                 total_marks, weight_percentage, created_at, updated_at";

#[async_trait]
impl AssessmentRepository for PostgresRepository {
    async fn list_types(&self) -> sqlx::Result<Vec<AssessmentType>> {
        sqlx::query_as::<_, AssessmentType>(
            "SELECT id, name, description FROM assessment_types ORDER BY name ASC",
        )
        .fetch_all(self.pool())
        .await
    }

    async fn create_type(&self, req: &CreateAssessmentTypeRequest) -> sqlx::Result<AssessmentType> {
        sqlx::query_as::<_, AssessmentType>(
            r#"
            INSERT INTO assessment_types (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(self.pool())
        .await
    }

    async fn update_type(
        &self,
        id: Uuid,
        req: &CreateAssessmentTypeRequest,
    ) -> sqlx::Result<Option<AssessmentType>> {
        sqlx::query_as::<_, AssessmentType>(
            r#"
            UPDATE assessment_types
            SET name = $2, description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(self.pool())
        .await
    }

    async fn type_in_use(&self, id: Uuid) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assessment_components WHERE assessment_type_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    async fn delete_type(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM assessment_types WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_components(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<AssessmentComponent>> {
        sqlx::query_as::<_, AssessmentComponent>(&format!(
            r#"
            SELECT {COMPONENT_COLUMNS} FROM assessment_components
            WHERE course_offering_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(course_offering_id)
        .fetch_all(self.pool())
        .await
    }

    async fn get_component(&self, id: Uuid) -> sqlx::Result<Option<AssessmentComponent>> {
        sqlx::query_as::<_, AssessmentComponent>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM assessment_components WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn create_component(
        &self,
        req: &CreateComponentRequest,
    ) -> sqlx::Result<AssessmentComponent> {
        sqlx::query_as::<_, AssessmentComponent>(&format!(
            r#"
            INSERT INTO assessment_components
                (id, course_offering_id, assessment_type_id, title,
                 total_marks, weight_percentage, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {COMPONENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(req.course_offering_id)
        .bind(req.assessment_type_id)
        .bind(&req.title)
        .bind(req.total_marks)
        .bind(req.weight_percentage)
        .fetch_one(self.pool())
        .await
    }

    async fn update_component(
        &self,
        id: Uuid,
        req: &UpdateComponentRequest,
    ) -> sqlx::Result<Option<AssessmentComponent>> {
        sqlx::query_as::<_, AssessmentComponent>(&format!(
            r#"
            UPDATE assessment_components
            SET title = COALESCE($2, title),
                total_marks = COALESCE($3, total_marks),
                weight_percentage = COALESCE($4, weight_percentage),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COMPONENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(req.total_marks)
        .bind(req.weight_percentage)
        .fetch_optional(self.pool())
        .await
    }

    async fn delete_component(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM assessment_components WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clo_allocations(&self, component_id: Uuid) -> sqlx::Result<Vec<CloAllocation>> {
        sqlx::query_as::<_, CloAllocation>(
            r#"
            SELECT m.component_id, m.clo_id, c.clo_code, m.allocated_marks
            FROM assessment_clo_mappings m
            JOIN course_learning_outcomes c ON m.clo_id = c.id
            WHERE m.component_id = $1
            ORDER BY c.clo_code ASC
            "#,
        )
        .bind(component_id)
        .fetch_all(self.pool())
        .await
    }

    async fn set_clo_allocation(
        &self,
        component_id: Uuid,
        clo_id: Uuid,
        allocated_marks: f64,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assessment_clo_mappings (component_id, clo_id, allocated_marks)
            VALUES ($1, $2, $3)
            ON CONFLICT (component_id, clo_id)
            DO UPDATE SET allocated_marks = EXCLUDED.allocated_marks
            "#,
        )
        .bind(component_id)
        .bind(clo_id)
        .bind(allocated_marks)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_clo_allocation(&self, component_id: Uuid, clo_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "DELETE FROM assessment_clo_mappings WHERE component_id = $1 AND clo_id = $2",
        )
        .bind(component_id)
        .bind(clo_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_questions(&self, component_id: Uuid) -> sqlx::Result<Vec<Question>> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, component_id, question_no, clo_id, max_marks
            FROM questions
            WHERE component_id = $1
            ORDER BY question_no ASC
            "#,
        )
        .bind(component_id)
        .fetch_all(self.pool())
        .await
    }

    async fn get_question(&self, id: Uuid) -> sqlx::Result<Option<Question>> {
        sqlx::query_as::<_, Question>(
            "SELECT id, component_id, question_no, clo_id, max_marks FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    async fn create_question(
        &self,
        component_id: Uuid,
        req: &CreateQuestionRequest,
    ) -> sqlx::Result<Question> {
        sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (id, component_id, question_no, clo_id, max_marks)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, component_id, question_no, clo_id, max_marks
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(component_id)
        .bind(req.question_no)
        .bind(req.clo_id)
        .bind(req.max_marks)
        .fetch_one(self.pool())
        .await
    }

    async fn delete_question(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
