//! Authentication
//!
//! Password hashing, opaque bearer tokens, and request extractors.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::CurrentUser;
