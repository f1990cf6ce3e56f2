//! Media storage implementations.

mod fs;
mod placeholder;

pub use fs::FsMediaStore;
pub use placeholder::placeholder_jpeg;
