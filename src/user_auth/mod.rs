//! Registration, login and sessions
//!
//! Passwords are stored as argon2 PHC strings. A login issues an HS256 token
//! (subject = account id) that travels in the `session` cookie; protected
//! routes take [`CurrentAccount`] or [`ApiAccount`] to require it.

pub mod handlers;
pub mod service;
pub mod session;

pub use service::{AuthError, Claims, Registration, RegistrationError, UserAuthService};
pub use session::{ApiAccount, CurrentAccount, SESSION_COOKIE, Session};
