//! 认证模块
//!
//! Bearer-JWT validation for the API surface. Token issuance and account
//! provisioning live in an external identity service; this server only
//! validates claims and exposes the caller as [`CurrentUser`].

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
