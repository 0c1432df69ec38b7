use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::errors::{DomainError, DomainResult};

/// Account-wide role. Independent of any per-project relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Owner,
    #[default]
    Member,
}

impl GlobalRole {
    /// Global capability gating project creation when the deployment
    /// restricts it.
    pub fn can_create_project(self) -> bool {
        matches!(self, GlobalRole::Owner)
    }

    /// Administration of other user accounts.
    pub fn can_manage_users(self) -> bool {
        matches!(self, GlobalRole::Owner)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GlobalRole::Owner => "owner",
            GlobalRole::Member => "member",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "owner" => Some(GlobalRole::Owner),
            "member" => Some(GlobalRole::Member),
            _ => None,
        }
    }
}

/// A stored account. Deliberately not `Serialize`: the password hash must
/// never reach a response body. Use [`UserProfile`] or [`UserSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Always lowercase.
    pub email: String,
    pub password_hash: String,
    pub role: GlobalRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String, role: GlobalRole) -> DomainResult<Self> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() {
            return Err(DomainError::validation("Name, email and password are required"));
        }
        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name: name.to_string(),
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Emails are unique case-insensitively; this is the canonical form.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The `{id, name, email}` shape used wherever a user reference is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Account details safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: GlobalRole,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub email: String,
    pub role: GlobalRole,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email_and_defaults_to_member() {
        let user = User::new("Ada", "  Ada@Example.COM ", "hash".into(), GlobalRole::default()).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, GlobalRole::Member);
        assert!(!user.role.can_create_project());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = User::new("  ", "a@b.c", "hash".into(), GlobalRole::Member).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn profile_serializes_without_secrets() {
        let user = User::new("Ada", "ada@example.com", "secret-hash".into(), GlobalRole::Owner).unwrap();
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"owner\""));
    }
}
