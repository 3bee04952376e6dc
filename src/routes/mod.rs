/// Router Module Index
///
/// Splits the routes by access level so authentication is applied once, as a
/// layer, rather than remembered per handler.

/// Routes open to anyone (health check).
pub mod public;

/// Routes behind the `AuthUser` route layer: the versioned JSON API.
pub mod authenticated;
