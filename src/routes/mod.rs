/// Router Module Index
///
/// Routing is segregated by exposure level so access control is applied
/// explicitly per module rather than per handler by accident.

/// Unauthenticated endpoints: health, login.
pub mod public;

/// The posts resource. Reads are public; mutation methods on the same
/// paths are guarded inside the handlers (token + ADMIN role), with the
/// create path additionally rate-limited before the gate.
pub mod posts;

/// Admin UI shell routes, gated by a cookie-verifying redirect middleware.
pub mod admin;
