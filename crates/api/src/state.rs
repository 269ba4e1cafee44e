use mongodb::Database;
use std::sync::Arc;
use taskhub_config::Settings;
use taskhub_services::{
    AuthService, LogMailer, Mailer, MembershipService, SmtpMailer,
    dao::{
        invite::InviteDao, project::ProjectDao, task::TaskDao, user::UserDao,
        workspace::WorkspaceDao,
    },
};
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub workspaces: Arc<WorkspaceDao>,
    pub invites: Arc<InviteDao>,
    pub projects: Arc<ProjectDao>,
    pub tasks: Arc<TaskDao>,
    pub membership: Arc<MembershipService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        Self::with_mailer(db, settings.clone(), build_mailer(&settings))
    }

    /// Construction with an injected mailer, used by tests to observe
    /// outgoing email without an SMTP relay.
    pub fn with_mailer(db: Database, settings: Settings, mailer: Arc<dyn Mailer>) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let workspaces = Arc::new(WorkspaceDao::new(&db));
        let invites = Arc::new(InviteDao::new(&db));
        let projects = Arc::new(ProjectDao::new(&db));
        let tasks = Arc::new(TaskDao::new(&db));
        let membership = Arc::new(MembershipService::new(
            workspaces.clone(),
            invites.clone(),
            projects.clone(),
            tasks.clone(),
            users.clone(),
            mailer,
            settings.clone(),
        ));

        Self {
            db,
            settings,
            auth,
            users,
            workspaces,
            invites,
            projects,
            tasks,
            membership,
        }
    }
}

fn build_mailer(settings: &Settings) -> Arc<dyn Mailer> {
    if settings.smtp.host.is_empty() {
        warn!("SMTP host not configured, invite emails will be logged only");
        return Arc::new(LogMailer);
    }

    match SmtpMailer::new(&settings.smtp) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            warn!(error = %e, "SMTP transport setup failed, falling back to log mailer");
            Arc::new(LogMailer)
        }
    }
}
