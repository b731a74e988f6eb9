//! Request authorization for the webhook receiver.
//!
//! The phone gateway signs webhook calls with an HMAC JWT. [`jwt::BearerAuthorizer`]
//! is the stateless predicate over the `Authorization` header value and
//! [`middleware::authorize_request`] wires it into an axum router.

pub mod jwt;
pub mod middleware;

pub use jwt::{AuthError, BearerAuthorizer};
pub use middleware::{AuthPolicy, authorize_request};
