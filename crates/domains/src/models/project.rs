use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{ProjectId, UserId};
use crate::errors::{DomainError, DomainResult};
use crate::policy::ProjectRole;

/// A project groups tasks and the users allowed to work on them.
///
/// `created_by` is the project owner. It is treated as a member for
/// authorization even when it is missing from `members`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_members")]
    pub members: Vec<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Builds a new project. Member ids are deduplicated and the creator is
    /// appended when absent.
    pub fn new(
        name: &str,
        description: Option<String>,
        members: impl IntoIterator<Item = UserId>,
        created_by: UserId,
    ) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("Project name is required"));
        }

        let mut project_members: Vec<UserId> = Vec::new();
        for id in members.into_iter().chain(std::iter::once(created_by)) {
            if !project_members.contains(&id) {
                project_members.push(id);
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            name: name.to_string(),
            description: description.unwrap_or_default(),
            members: project_members,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// The caller's relationship to this project. Ownership wins over a
    /// literal entry in `members`.
    pub fn role_of(&self, user: UserId) -> ProjectRole {
        if self.created_by == user {
            ProjectRole::Owner
        } else if self.members.contains(&user) {
            ProjectRole::Member
        } else {
            ProjectRole::None
        }
    }

    /// Member-or-owner.
    pub fn includes(&self, user: UserId) -> bool {
        self.role_of(user) != ProjectRole::None
    }

    /// Every user with access, creator first, without duplicates.
    pub fn participants(&self) -> Vec<UserId> {
        let mut ids = vec![self.created_by];
        ids.extend(self.members.iter().copied().filter(|id| *id != self.created_by));
        ids
    }

    /// Appends a member. Returns `false` when the user was already listed.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.members.contains(&user) {
            return false;
        }
        self.members.push(user);
        self.updated_at = Utc::now();
        true
    }

    /// Applies only the provided fields.
    pub fn apply(&mut self, patch: ProjectPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("Project name is required"));
            }
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update of a project's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for project creation. Member emails that do not resolve to a user
/// are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Member entries may be stored as bare ids or as expanded user records.
#[derive(Deserialize)]
#[serde(untagged)]
enum MemberRef {
    Id(UserId),
    Expanded {
        #[serde(alias = "_id")]
        id: UserId,
    },
}

impl MemberRef {
    fn id(self) -> UserId {
        match self {
            MemberRef::Id(id) | MemberRef::Expanded { id } => id,
        }
    }
}

fn deserialize_members<'de, D>(de: D) -> Result<Vec<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Vec::<MemberRef>::deserialize(de)?;
    let mut ids: Vec<UserId> = Vec::with_capacity(refs.len());
    for id in refs.into_iter().map(MemberRef::id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_project_dedups_members_and_includes_creator() {
        let (a, b, creator) = (UserId::new(), UserId::new(), UserId::new());
        let project = Project::new("Board", None, vec![a, a, b], creator).unwrap();

        assert_eq!(project.members.len(), 3);
        assert!(project.members.contains(&a));
        assert!(project.members.contains(&b));
        assert!(project.members.contains(&creator));
        assert_eq!(project.description, "");
    }

    #[test]
    fn creator_listed_once_when_also_passed_as_member() {
        let creator = UserId::new();
        let project = Project::new("Board", None, vec![creator], creator).unwrap();
        assert_eq!(project.members, vec![creator]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Project::new("   ", None, vec![], UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn role_of_prefers_owner_and_tolerates_missing_creator_entry() {
        let (owner, member, stranger) = (UserId::new(), UserId::new(), UserId::new());
        let mut project = Project::new("Board", None, vec![member], owner).unwrap();
        project.members.retain(|id| *id != owner);

        assert_eq!(project.role_of(owner), ProjectRole::Owner);
        assert_eq!(project.role_of(member), ProjectRole::Member);
        assert_eq!(project.role_of(stranger), ProjectRole::None);
        assert_eq!(project.participants(), vec![owner, member]);
    }

    #[test]
    fn patch_changes_only_given_fields() {
        let mut project = Project::new("Board", Some("desc".into()), vec![], UserId::new()).unwrap();
        project
            .apply(ProjectPatch { name: None, description: Some(String::new()) })
            .unwrap();
        assert_eq!(project.name, "Board");
        assert_eq!(project.description, "");

        let err = project
            .apply(ProjectPatch { name: Some("".into()), description: None })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn members_accept_bare_and_expanded_entries() {
        let (owner, a, b) = (UserId::new(), UserId::new(), UserId::new());
        let doc = json!({
            "id": ProjectId::new(),
            "name": "Board",
            "members": [a, { "_id": b, "name": "Bea", "email": "b@x.io" }, { "id": a }],
            "createdBy": owner,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let project: Project = serde_json::from_value(doc).unwrap();
        assert_eq!(project.members, vec![a, b]);
        assert_eq!(project.role_of(b), ProjectRole::Member);
    }
}
