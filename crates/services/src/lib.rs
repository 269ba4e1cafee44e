pub mod auth;
pub mod dao;
pub mod email;
pub mod membership;

pub use auth::AuthService;
pub use dao::*;
pub use email::{LogMailer, Mailer, SmtpMailer};
pub use membership::MembershipService;
