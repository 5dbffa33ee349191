use sqlx::PgPool;

/// Repository Module Index
///
/// Persistence is split into one `async_trait` contract per domain area, all
/// implemented by the single Postgres-backed `PostgresRepository`. Handlers
/// depend on the trait objects (`Arc<dyn ...>`), never on the concrete type,
/// which keeps them mockable in tests.
///
/// Every method returns `sqlx::Result`; handlers translate errors into the
/// response envelope (unexpected failures become logged 500s).
pub mod assessments;
pub mod audit;
pub mod marks;
pub mod outcomes;
pub mod results;
pub mod users;

pub use assessments::{AssessmentRepository, AssessmentRepositoryState};
pub use audit::{AuditRepository, AuditRepositoryState};
pub use marks::{MarkRepository, MarkRepositoryState};
pub use outcomes::{OutcomeRepository, OutcomeRepositoryState};
pub use results::{ResultRepository, ResultRepositoryState};
pub use users::{UserRepository, UserRepositoryState};

/// PostgresRepository
///
/// The concrete implementation of all repository traits, backed by a shared
/// connection pool. One instance is created at startup and cloned into each
/// `Arc<dyn ...>` slot of the application state.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
