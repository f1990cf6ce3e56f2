//! Request-scoped auth extraction and error mapping.

pub mod auth;
pub mod error;
