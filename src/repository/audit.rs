use async_trait::async_trait;
use sqlx::query_builder::QueryBuilder;
use std::sync::Arc;
use uuid::Uuid;

use super::PostgresRepository;
use crate::models::{AdminDashboardStats, AuditLog, NewAuditLog};

/// AuditRepository
///
/// Persistence contract for the audit trail written by the `auto_audit`
/// middleware, plus the admin dashboard counters.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert(&self, log: NewAuditLog) -> sqlx::Result<()>;
    async fn list(
        &self,
        user_id: Option<Uuid>,
        table_name: Option<String>,
        action: Option<String>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<AuditLog>>;
    async fn stats(&self) -> sqlx::Result<AdminDashboardStats>;
}

pub type AuditRepositoryState = Arc<dyn AuditRepository>;

#[async_trait]
impl AuditRepository for PostgresRepository {
    async fn insert(&self, log: NewAuditLog) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (id, user_id, action, table_name, record_id, new_values,
                 ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.user_id)
        .bind(&log.action)
        .bind(&log.table_name)
        .bind(&log.record_id)
        .bind(&log.new_values)
        .bind(&log.ip_address)
        .bind(&log.user_agent)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Filterable listing via QueryBuilder for safe parameterization; every
    /// filter is bound, never interpolated.
    async fn list(
        &self,
        user_id: Option<Uuid>,
        table_name: Option<String>,
        action: Option<String>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<AuditLog>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT id, user_id, action, table_name, record_id, new_values,
                   ip_address, user_agent, created_at
            FROM audit_logs
            WHERE 1 = 1
            "#,
        );
        if let Some(uid) = user_id {
            builder.push(" AND user_id = ");
            builder.push_bind(uid);
        }
        if let Some(table) = table_name {
            builder.push(" AND table_name = ");
            builder.push_bind(table);
        }
        if let Some(act) = action {
            builder.push(" AND action = ");
            builder.push_bind(act);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        builder
            .build_query_as::<AuditLog>()
            .fetch_all(self.pool())
            .await
    }

    /// Compiles all counters for the administrative dashboard in a single call.
    async fn stats(&self) -> sqlx::Result<AdminDashboardStats> {
        let total_clos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_learning_outcomes")
            .fetch_one(self.pool())
            .await?;
        let total_plos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM program_learning_outcomes")
            .fetch_one(self.pool())
            .await?;
        let total_components: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessment_components")
            .fetch_one(self.pool())
            .await?;
        let total_mark_entries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM student_assessment_marks")
                .fetch_one(self.pool())
                .await?;
        let unpublished_results: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM semester_results WHERE is_published = false")
                .fetch_one(self.pool())
                .await?;
        Ok(AdminDashboardStats {
            total_clos,
            total_plos,
            total_components,
            total_mark_entries,
            unpublished_results,
        })
    }
}
