//! User accounts and cookie based sessions.

mod check_email;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use check_email::check_email;
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub(super) use token::Token;
pub use user::{User, UserID, create_user, create_user_table};

#[cfg(test)]
pub use cookie::{COOKIE_TOKEN, set_auth_cookie};

#[cfg(test)]
pub use middleware::AuthState;
