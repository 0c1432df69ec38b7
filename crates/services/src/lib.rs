//! taskboard/crates/services/src/lib.rs
//!
//! Use cases of the task board. Every project-scoped operation resolves the
//! caller's membership and passes the authorization guard before touching the
//! store.

pub mod accounts;
pub mod comments;
pub mod guard;
pub mod membership;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod views;

pub use accounts::{AuthService, LoginRequest, Session, SignupRequest};
pub use comments::CommentService;
pub use guard::AuthorizationGuard;
pub use membership::MembershipResolver;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserAdminService;
pub use views::{CommentView, ProjectView, TaskView};

use std::sync::Arc;

use domains::{
    CommentRepository, CredentialService, PasswordHasher, ProjectRepository, TaskRepository,
    UserRepository,
};

/// The adapters a deployment plugs in.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub credentials: Arc<dyn CredentialService>,
}

/// Deployment-level switches that shape service behaviour.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Only users with the global `owner` role may create projects.
    pub restrict_project_creation: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            restrict_project_creation: true,
        }
    }
}

/// Every service, wired once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserAdminService>,
    pub projects: Arc<ProjectService>,
    pub tasks: Arc<TaskService>,
    pub comments: Arc<CommentService>,
}

impl Services {
    pub fn new(ports: Ports, options: ServiceOptions) -> Self {
        let guard = AuthorizationGuard::new(MembershipResolver::new(ports.projects.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                ports.users.clone(),
                ports.hasher.clone(),
                ports.credentials.clone(),
            )),
            users: Arc::new(UserAdminService::new(ports.users.clone())),
            projects: Arc::new(ProjectService::new(
                ports.users.clone(),
                ports.projects.clone(),
                guard.clone(),
                options.restrict_project_creation,
            )),
            tasks: Arc::new(TaskService::new(
                ports.users.clone(),
                ports.projects.clone(),
                ports.tasks.clone(),
                guard.clone(),
            )),
            comments: Arc::new(CommentService::new(
                ports.users,
                ports.tasks,
                ports.comments,
                guard,
            )),
        }
    }
}
