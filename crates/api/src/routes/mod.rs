pub mod auth;
pub mod invite;
pub mod project;
pub mod task;
pub mod workspace;
