//! Account administration, reserved to users with the global `owner` role.

use std::sync::Arc;

use domains::{Actor, DomainError, DomainResult, GlobalRole, UserId, UserProfile, UserRepository};

pub struct UserAdminService {
    users: Arc<dyn UserRepository>,
}

impl UserAdminService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Every account with the global `member` role, sorted by name.
    pub async fn list_members(&self, actor: &Actor) -> DomainResult<Vec<UserProfile>> {
        ensure_owner(actor)?;
        let members = self.users.list_by_role(GlobalRole::Member).await?;
        Ok(members.iter().map(|u| u.profile()).collect())
    }

    /// Removes another account. Project member lists and authored records
    /// keep the dangling id.
    pub async fn delete_member(&self, actor: &Actor, id: UserId) -> DomainResult<()> {
        ensure_owner(actor)?;
        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("User", id));
        }
        if id == actor.id {
            return Err(DomainError::validation("You cannot delete your own account"));
        }
        self.users.delete(id).await?;
        tracing::info!(user = %id, actor = %actor.id, "user deleted");
        Ok(())
    }
}

fn ensure_owner(actor: &Actor) -> DomainResult<()> {
    if actor.role.can_manage_users() {
        return Ok(());
    }
    tracing::warn!(actor = %actor.id, resource = "users", "authorization denied");
    Err(DomainError::forbidden(
        "Not authorized to access this route. Owner role required.",
    ))
}
