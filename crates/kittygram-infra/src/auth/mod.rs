//! Authentication implementations.

mod password;
mod session;

pub use password::Argon2PasswordService;
pub use session::generate_session_token;
