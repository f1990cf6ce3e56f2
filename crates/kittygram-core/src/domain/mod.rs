//! Domain entities - the core business objects.

mod post;
mod session;
mod user;

pub use post::{MAX_TITLE_LEN, Post};
pub use session::Session;
pub use user::User;
