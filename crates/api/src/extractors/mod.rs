pub mod auth;
pub mod workspace;
