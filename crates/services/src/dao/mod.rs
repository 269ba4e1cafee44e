pub mod base;
pub mod invite;
pub mod project;
pub mod task;
pub mod user;
pub mod workspace;

pub use base::BaseDao;
