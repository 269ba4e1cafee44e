pub mod invite;
pub mod project;
pub mod role;
pub mod task;
pub mod user;
pub mod workspace;
pub mod workspace_member;

pub use invite::{Invite, InviteStatus};
pub use project::{Project, ProjectStatus};
pub use role::{MemberRole, WorkspaceAction};
pub use task::{Task, TaskPriority, TaskStatus};
pub use user::User;
pub use workspace::Workspace;
pub use workspace_member::WorkspaceMember;
