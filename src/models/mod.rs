/// Model Module Index
///
/// Table-per-concept schemas plus the request/response payloads, grouped by
/// domain area. Every wire-facing struct derives `TS` (TypeScript bindings for
/// the React dashboard) and `ToSchema` (OpenAPI documentation); rows fetched
/// from Postgres additionally derive `sqlx::FromRow`.
pub mod assessments;
pub mod audit;
pub mod marks;
pub mod outcomes;
pub mod results;
pub mod users;

pub use assessments::*;
pub use audit::*;
pub use marks::*;
pub use outcomes::*;
pub use results::*;
pub use users::*;
