//! # Kittygram Shared
//!
//! Request/response types shared between server and clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
