//! HTTP route handlers.

pub mod dashboard;
pub mod orders;
pub mod system;
