//! Maintenance command implementations.

use std::sync::Arc;

use kittygram_core::ports::{MediaStore, PasswordService, PostRepository, UserRepository};

pub mod clear;
pub mod seed;

/// Everything a maintenance command needs, behind the same ports the
/// server uses.
pub struct MaintenanceContext {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub media: Arc<dyn MediaStore>,
    pub passwords: Arc<dyn PasswordService>,
}
