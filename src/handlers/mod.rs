/// Handler Module Index
///
/// Request validation, RBAC checks, status-code mapping and envelope
/// formatting live here; SQL lives in `repository`, arithmetic in `calc`.
/// Handlers return `ApiResult<T>` so every response carries the standard
/// `{ success, message?, data?, error? }` envelope.
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

use crate::{auth::AuthUser, response::ApiError};

/// Rejects percentage-typed fields outside [0, 100].
pub(crate) fn ensure_percentage(value: f64, field: &str) -> Result<(), ApiError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ApiError::bad_request(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Write operations on outcomes, assessments and marks require the faculty
/// or admin role.
pub(crate) fn ensure_can_manage(user: &AuthUser) -> Result<(), ApiError> {
    if user.can_manage() {
        Ok(())
    } else {
        Err(ApiError::forbidden("faculty or admin role required"))
    }
}

/// Admin-only operations: audit trail, stats, result publication.
pub(crate) fn ensure_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("admin role required"))
    }
}
