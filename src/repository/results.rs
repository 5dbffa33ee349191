use async_trait::async_trait;
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::calc::{CloAttainmentSummary, CloQuestionMark, StudentCloAttainment};
use crate::models::{CloAttainmentSummaryRow, CourseGradeRow, SemesterResult, StudentCloAttainmentRow};

/// ResultRepository
///
/// Persistence contract for the derived tables: per-student CLO attainment,
/// the per-offering attainment summary, and semester results (SGPA/CGPA).
/// The arithmetic itself lives in `calc`; this layer only fetches the flat
/// input rows and stores the recomputed output.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Every question-level mark of a course offering, joined to its CLO and
    /// the CLO's target. Input of the attainment recomputation.
    async fn clo_question_marks(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<CloQuestionMark>>;

    /// Replaces the derived attainment rows of one offering atomically.
    async fn replace_attainment(
        &self,
        course_offering_id: Uuid,
        students: &[StudentCloAttainment],
        summary: &[CloAttainmentSummary],
    ) -> sqlx::Result<()>;

    async fn summary_for_course(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<CloAttainmentSummaryRow>>;
    async fn attainment_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentCloAttainmentRow>>;

    /// Finalized course percentages of one student in one semester, weighted
    /// in SQL from component marks and weights.
    async fn semester_course_grades(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
    ) -> sqlx::Result<Vec<CourseGradeRow>>;
    /// Same aggregation over every semester whose start date is at or before
    /// the target semester's. Input of the CGPA sum.
    async fn cumulative_course_grades(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
    ) -> sqlx::Result<Vec<CourseGradeRow>>;

    /// Upserts the (student, semester) result row; recomputation always lands
    /// unpublished.
    async fn upsert_semester_result(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
        sgpa: f64,
        cgpa: f64,
        total_credit_hours: f64,
    ) -> sqlx::Result<SemesterResult>;
    async fn results_for_student(
        &self,
        student_id: Uuid,
        published_only: bool,
    ) -> sqlx::Result<Vec<SemesterResult>>;
    async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
    ) -> sqlx::Result<Option<SemesterResult>>;
}

pub type ResultRepositoryState = Arc<dyn ResultRepository>;

/// Flat join row backing `clo_question_marks`.
#[derive(FromRow)]
struct CloMarkJoinRow {
    student_id: Uuid,
    clo_id: Uuid,
    target_attainment: f64,
    marks_obtained: f64,
    max_marks: f64,
}

const RESULT_COLUMNS: &str = "id, student_id, semester_id, sgpa, cgpa, total_credit_hours, \
                              is_published, created_at, updated_at";

#[async_trait]
impl ResultRepository for PostgresRepository {
    async fn clo_question_marks(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<CloQuestionMark>> {
        let rows = sqlx::query_as::<_, CloMarkJoinRow>(
            r#"
            SELECT
                m.student_id,
                q.clo_id,
                o.target_attainment,
                m.marks_obtained,
                q.max_marks
            FROM student_question_marks m
            JOIN questions q ON m.question_id = q.id
            JOIN assessment_components c ON q.component_id = c.id
            JOIN course_learning_outcomes o ON q.clo_id = o.id
            WHERE c.course_offering_id = $1
            "#,
        )
        .bind(course_offering_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CloQuestionMark {
                student_id: r.student_id,
                clo_id: r.clo_id,
                target_attainment: r.target_attainment,
                marks_obtained: r.marks_obtained,
                max_marks: r.max_marks,
            })
            .collect())
    }

    async fn replace_attainment(
        &self,
        course_offering_id: Uuid,
        students: &[StudentCloAttainment],
        summary: &[CloAttainmentSummary],
    ) -> sqlx::Result<()> {
        // Delete-and-reinsert inside one transaction so readers never observe
        // a half-recomputed offering.
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM student_clo_attainment WHERE course_offering_id = $1")
            .bind(course_offering_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM course_clo_attainment_summary WHERE course_offering_id = $1")
            .bind(course_offering_id)
            .execute(&mut *tx)
            .await?;

        for row in students {
            sqlx::query(
                r#"
                INSERT INTO student_clo_attainment
                    (student_id, clo_id, course_offering_id, percentage, is_achieved)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(row.student_id)
            .bind(row.clo_id)
            .bind(course_offering_id)
            .bind(row.percentage)
            .bind(row.is_achieved)
            .execute(&mut *tx)
            .await?;
        }

        for row in summary {
            sqlx::query(
                r#"
                INSERT INTO course_clo_attainment_summary
                    (course_offering_id, clo_id, students_total, students_achieved, average_percentage)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(course_offering_id)
            .bind(row.clo_id)
            .bind(row.students_total)
            .bind(row.students_achieved)
            .bind(row.average_percentage)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    async fn summary_for_course(
        &self,
        course_offering_id: Uuid,
    ) -> sqlx::Result<Vec<CloAttainmentSummaryRow>> {
        sqlx::query_as::<_, CloAttainmentSummaryRow>(
            r#"
            SELECT
                s.course_offering_id,
                s.clo_id,
                o.clo_code,
                o.target_attainment,
                s.students_total,
                s.students_achieved,
                s.average_percentage
            FROM course_clo_attainment_summary s
            JOIN course_learning_outcomes o ON s.clo_id = o.id
            WHERE s.course_offering_id = $1
            ORDER BY o.clo_code ASC
            "#,
        )
        .bind(course_offering_id)
        .fetch_all(self.pool())
        .await
    }

    async fn attainment_for_student(
        &self,
        student_id: Uuid,
    ) -> sqlx::Result<Vec<StudentCloAttainmentRow>> {
        sqlx::query_as::<_, StudentCloAttainmentRow>(
            r#"
            SELECT
                a.student_id,
                a.clo_id,
                o.clo_code,
                a.course_offering_id,
                a.percentage,
                a.is_achieved
            FROM student_clo_attainment a
            JOIN course_learning_outcomes o ON a.clo_id = o.id
            WHERE a.student_id = $1
            ORDER BY o.clo_code ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool())
        .await
    }

    /// Final percentage per course = sum over components of
    /// (marks_obtained / total_marks) * weight_percentage.
    async fn semester_course_grades(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
    ) -> sqlx::Result<Vec<CourseGradeRow>> {
        sqlx::query_as::<_, CourseGradeRow>(
            r#"
            SELECT
                off.course_id,
                off.semester_id,
                crs.credit_hours,
                SUM(m.marks_obtained / NULLIF(c.total_marks, 0) * c.weight_percentage)
                    AS final_percentage
            FROM student_assessment_marks m
            JOIN assessment_components c ON m.component_id = c.id
            JOIN course_offerings off ON c.course_offering_id = off.id
            JOIN courses crs ON off.course_id = crs.id
            WHERE m.student_id = $1 AND off.semester_id = $2
            GROUP BY off.course_id, off.semester_id, crs.credit_hours
            ORDER BY off.course_id
            "#,
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_all(self.pool())
        .await
    }

    async fn cumulative_course_grades(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
    ) -> sqlx::Result<Vec<CourseGradeRow>> {
        sqlx::query_as::<_, CourseGradeRow>(
            r#"
            SELECT
                off.course_id,
                off.semester_id,
                crs.credit_hours,
                SUM(m.marks_obtained / NULLIF(c.total_marks, 0) * c.weight_percentage)
                    AS final_percentage
            FROM student_assessment_marks m
            JOIN assessment_components c ON m.component_id = c.id
            JOIN course_offerings off ON c.course_offering_id = off.id
            JOIN courses crs ON off.course_id = crs.id
            JOIN semesters sem ON off.semester_id = sem.id
            WHERE m.student_id = $1
              AND sem.start_date <= (SELECT start_date FROM semesters WHERE id = $2)
            GROUP BY off.course_id, off.semester_id, crs.credit_hours
            ORDER BY off.course_id
            "#,
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_all(self.pool())
        .await
    }

    async fn upsert_semester_result(
        &self,
        student_id: Uuid,
        semester_id: Uuid,
        sgpa: f64,
        cgpa: f64,
        total_credit_hours: f64,
    ) -> sqlx::Result<SemesterResult> {
        sqlx::query_as::<_, SemesterResult>(&format!(
            r#"
            INSERT INTO semester_results
                (id, student_id, semester_id, sgpa, cgpa, total_credit_hours,
                 is_published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, false, NOW(), NOW())
            ON CONFLICT (student_id, semester_id)
            DO UPDATE SET sgpa = EXCLUDED.sgpa,
                          cgpa = EXCLUDED.cgpa,
                          total_credit_hours = EXCLUDED.total_credit_hours,
                          is_published = false,
                          updated_at = NOW()
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(semester_id)
        .bind(sgpa)
        .bind(cgpa)
        .bind(total_credit_hours)
        .fetch_one(self.pool())
        .await
    }

    async fn results_for_student(
        &self,
        student_id: Uuid,
        published_only: bool,
    ) -> sqlx::Result<Vec<SemesterResult>> {
        sqlx::query_as::<_, SemesterResult>(&format!(
            r#"
            SELECT {RESULT_COLUMNS} FROM semester_results
            WHERE student_id = $1 AND ($2 = false OR is_published = true)
            ORDER BY created_at ASC
            "#
        ))
        .bind(student_id)
        .bind(published_only)
        .fetch_all(self.pool())
        .await
    }

    async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
    ) -> sqlx::Result<Option<SemesterResult>> {
        sqlx::query_as::<_, SemesterResult>(&format!(
            r#"
            UPDATE semester_results
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_published)
        .fetch_optional(self.pool())
        .await
    }
}
