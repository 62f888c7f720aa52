//! Authentication and authorization primitives for Atrium.
//!
//! Everything here is transport-agnostic: the HTTP crate wraps these
//! functions in extractors and maps [`AuthError`] to responses.

pub mod guard;
pub mod password;
pub mod role;
pub mod token;

pub use guard::{authenticate, authorize, bearer_token, ensure_owner, AuthError};
pub use password::{hash_password, verify_password, PasswordError};
pub use role::Role;
pub use token::{Claims, TokenError, TokenService, DEFAULT_TOKEN_TTL_SECS};
