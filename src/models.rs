//! Data models and DTOs (Data Transfer Objects)
//!
//! Stored entities plus the request/response structures used by the API.

pub mod account;
pub mod task;
pub mod time_tracker;

// Re-export commonly used types
pub use account::*;
pub use task::*;
pub use time_tracker::*;
