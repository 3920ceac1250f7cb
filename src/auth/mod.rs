//! Authentication and authorization module
//!
//! Token issuing/verification, the capability bitmask, and the middleware
//! chain that guards the API: bearer authentication, then either a coarse
//! capability check or a resource ownership check.

mod jwt;
mod middleware;
mod password;
mod permission;

pub use jwt::{Claims, TokenCodec, TokenSubject};
pub use middleware::{authenticate, require_capability, Owned, OwnedResource};
pub use password::{hash_password, verify_password};
pub use permission::{has_capability, Permissions};
