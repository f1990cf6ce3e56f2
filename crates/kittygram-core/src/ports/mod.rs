//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod media;
mod repository;

pub use auth::{AuthError, PasswordService};
pub use media::{ImageKind, MediaStore, sniff_image_kind};
pub use repository::{BaseRepository, PostRepository, SessionRepository, UserRepository};
