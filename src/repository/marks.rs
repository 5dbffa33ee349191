use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::models::{
    CreateMarkRequest, CreateQuestionMarkRequest, StudentAssessmentMark, StudentQuestionMark,
};

/// MarkRepository
///
/// Persistence contract for component-level and question-level student marks.
/// Inserts are upserts keyed on (student, component) / (student, question):
/// re-entering a mark overwrites the previous value, matching gradebook
/// correction workflows.
#[async_trait]
pub trait MarkRepository: Send + Sync {
    async fn upsert_component_mark(
        &self,
        req: &CreateMarkRequest,
    ) -> sqlx::Result<StudentAssessmentMark>;
    async fn marks_for_component(
        &self,
        component_id: Uuid,
    ) -> sqlx::Result<Vec<StudentAssessmentMark>>;
    async fn marks_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentAssessmentMark>>;

    async fn upsert_question_mark(
        &self,
        req: &CreateQuestionMarkRequest,
    ) -> sqlx::Result<StudentQuestionMark>;
    async fn question_marks_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentQuestionMark>>;
}

pub type MarkRepositoryState = Arc<dyn MarkRepository>;

const MARK_COLUMNS: &str = "id, student_id, component_id, marks_obtained, created_at, updated_at";

#[async_trait]
impl MarkRepository for PostgresRepository {
    async fn upsert_component_mark(
        &self,
        req: &CreateMarkRequest,
    ) -> sqlx::Result<StudentAssessmentMark> {
        sqlx::query_as::<_, StudentAssessmentMark>(&format!(
            r#"
            INSERT INTO student_assessment_marks
                (id, student_id, component_id, marks_obtained, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (student_id, component_id)
            DO UPDATE SET marks_obtained = EXCLUDED.marks_obtained, updated_at = NOW()
            RETURNING {MARK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(req.student_id)
        .bind(req.component_id)
        .bind(req.marks_obtained)
        .fetch_one(self.pool())
        .await
    }

    async fn marks_for_component(
        &self,
        component_id: Uuid,
    ) -> sqlx::Result<Vec<StudentAssessmentMark>> {
        sqlx::query_as::<_, StudentAssessmentMark>(&format!(
            r#"
            SELECT {MARK_COLUMNS} FROM student_assessment_marks
            WHERE component_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(component_id)
        .fetch_all(self.pool())
        .await
    }

    async fn marks_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentAssessmentMark>> {
        sqlx::query_as::<_, StudentAssessmentMark>(&format!(
            r#"
            SELECT {MARK_COLUMNS} FROM student_assessment_marks
            WHERE student_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(student_id)
        .fetch_all(self.pool())
        .await
    }

    async fn upsert_question_mark(
        &self,
        req: &CreateQuestionMarkRequest,
    ) -> sqlx::Result<StudentQuestionMark> {
        sqlx::query_as::<_, StudentQuestionMark>(
            r#"
            INSERT INTO student_question_marks (id, student_id, question_id, marks_obtained)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, question_id)
            DO UPDATE SET marks_obtained = EXCLUDED.marks_obtained
            RETURNING id, student_id, question_id, marks_obtained
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.student_id)
        .bind(req.question_id)
        .bind(req.marks_obtained)
        .fetch_one(self.pool())
        .await
    }

    async fn question_marks_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentQuestionMark>> {
        sqlx::query_as::<_, StudentQuestionMark>(
            r#"
            SELECT id, student_id, question_id, marks_obtained
            FROM student_question_marks
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool())
        .await
    }
}
