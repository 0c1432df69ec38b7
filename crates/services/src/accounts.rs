//! Signup, login and credential-to-actor resolution.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use domains::{
    normalize_email, Actor, CredentialService, DomainError, DomainResult, GlobalRole,
    PasswordHasher, User, UserProfile, UserRepository, UserSummary,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A freshly issued credential and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: UserSummary,
    pub token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    credentials: Arc<dyn CredentialService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            users,
            hasher,
            credentials,
        }
    }

    /// Registers a user with the default global role.
    pub async fn signup(&self, req: SignupRequest) -> DomainResult<Session> {
        self.register(req, GlobalRole::default()).await
    }

    /// Registers a user with an explicit global role. Used for bootstrapping
    /// the first owner account.
    pub async fn register(&self, req: SignupRequest, role: GlobalRole) -> DomainResult<Session> {
        let email = normalize_email(&req.email);
        if req.name.trim().is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(DomainError::validation("Name, email and password are required"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        let hash = self.hasher.hash(&req.password).await?;
        let user = User::new(&req.name, &email, hash, role)?;
        let user = self.users.insert(user).await?;
        tracing::info!(user = %user.id, role = user.role.as_str(), "user registered");

        self.session_for(&user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> DomainResult<Session> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(DomainError::validation("Email and password required"));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !self.hasher.verify(&req.password, &user.password_hash).await? {
            tracing::debug!(user = %user.id, "password mismatch");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.session_for(&user)
    }

    /// Verifies a bearer credential and loads the account behind it. A valid
    /// token for a deleted account is rejected.
    pub async fn authenticate(&self, token: &str) -> DomainResult<Actor> {
        let claims = self.credentials.verify(token)?;
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User not found".to_string()))?;
        Ok(Actor::from(&user))
    }

    pub async fn current_user(&self, actor: &Actor) -> DomainResult<UserProfile> {
        self.users
            .find_by_id(actor.id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| DomainError::not_found("User", actor.id))
    }

    fn session_for(&self, user: &User) -> DomainResult<Session> {
        Ok(Session {
            user: user.summary(),
            token: self.credentials.issue(user.id, &user.email)?,
        })
    }
}
