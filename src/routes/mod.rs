/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing access control explicitly at the module level (via Axum layers)
/// rather than ad hoc per handler.
///
/// The three modules map directly to the platform's access tiers.

/// Routes accessible without a token: health check and the auth gateway.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session; role checks happen in the handlers.
pub mod authenticated;

/// Routes restricted exclusively to users with the 'admin' role.
pub mod admin;
