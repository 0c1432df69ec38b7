//! Shared fixtures: services wired onto the in-memory store, plus helpers to
//! drive the HTTP router without a socket.

use std::sync::Arc;

use domains::{
    Actor, CredentialService, GlobalRole, NewProject, NewTask, ProjectId, User, UserRepository,
};
use services::{Ports, ProjectView, ServiceOptions, Services, TaskView};
use storage_adapters::MemoryStore;
use auth_adapters::{Argon2Hasher, JwtCredentials};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub credentials: Arc<JwtCredentials>,
    pub services: Services,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(ServiceOptions::default())
    }

    pub fn with_options(options: ServiceOptions) -> Self {
        let store = Arc::new(MemoryStore::new());
        let credentials = Arc::new(JwtCredentials::new(TEST_SECRET, chrono::Duration::hours(1)));
        let ports = Ports {
            users: store.clone(),
            projects: store.clone(),
            tasks: store.clone(),
            comments: store.clone(),
            hasher: Arc::new(Argon2Hasher::new()),
            credentials: credentials.clone(),
        };
        Self {
            store,
            credentials,
            services: Services::new(ports, options),
        }
    }

    /// Stores a user directly, skipping password hashing.
    pub async fn user(&self, name: &str, role: GlobalRole) -> Actor {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = User::new(name, &email, "unused".to_string(), role).expect("valid user");
        let user = UserRepository::insert(self.store.as_ref(), user)
            .await
            .expect("insert user");
        Actor::from(&user)
    }

    pub async fn owner(&self, name: &str) -> Actor {
        self.user(name, GlobalRole::Owner).await
    }

    pub async fn member(&self, name: &str) -> Actor {
        self.user(name, GlobalRole::Member).await
    }

    pub fn token_for(&self, actor: &Actor) -> String {
        self.credentials
            .issue(actor.id, &actor.email)
            .expect("issue token")
    }

    pub async fn project(&self, owner: &Actor, name: &str, members: &[&Actor]) -> ProjectView {
        let input = NewProject {
            name: name.to_string(),
            description: None,
            members: members.iter().map(|m| m.email.clone()).collect(),
        };
        self.services
            .projects
            .create(owner, input)
            .await
            .expect("create project")
    }

    pub async fn task(&self, actor: &Actor, project_id: ProjectId, title: &str) -> TaskView {
        self.services
            .tasks
            .create(actor.id, new_task(project_id, title))
            .await
            .expect("create task")
    }

    #[cfg(feature = "web-axum")]
    pub fn app(&self) -> axum::Router {
        api_adapters::router(api_adapters::AppState::new(self.services.clone()))
    }
}

pub fn new_task(project_id: ProjectId, title: &str) -> NewTask {
    NewTask {
        project_id,
        title: title.to_string(),
        description: None,
        assignee: None,
        due_date: None,
        status: None,
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct Reply {
        pub status: StatusCode,
        pub headers: axum::http::HeaderMap,
        pub body: Value,
    }

    /// Sends one request through the router and decodes the JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn send_raw(app: &Router, method: &str, uri: &str, token: &str, raw: &str) -> Reply {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }
}
