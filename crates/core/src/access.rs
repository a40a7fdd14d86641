//! Project access roles.

use crate::error::CoreError;
use crate::types::DbId;

/// The actor's relationship to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAccess {
    Owner,
    Collaborator,
    None,
}

impl ProjectAccess {
    pub fn resolve(owner_id: DbId, actor_id: DbId, is_collaborator: bool) -> Self {
        if owner_id == actor_id {
            Self::Owner
        } else if is_collaborator {
            Self::Collaborator
        } else {
            Self::None
        }
    }

    /// Owner or collaborator: view, annotate, manage labels and texts, export.
    pub fn require_member(self) -> Result<(), CoreError> {
        match self {
            Self::Owner | Self::Collaborator => Ok(()),
            Self::None => Err(CoreError::Forbidden(
                "You do not have access to this project".into(),
            )),
        }
    }

    /// Owner only: import, rename, delete, manage collaborators.
    pub fn require_owner(self) -> Result<(), CoreError> {
        match self {
            Self::Owner => Ok(()),
            _ => Err(CoreError::Forbidden(
                "Only the project owner can do this".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn owner_wins_over_collaborator_flag() {
        assert_eq!(ProjectAccess::resolve(1, 1, true), ProjectAccess::Owner);
        assert_eq!(ProjectAccess::resolve(1, 2, true), ProjectAccess::Collaborator);
        assert_eq!(ProjectAccess::resolve(1, 2, false), ProjectAccess::None);
    }

    #[test]
    fn collaborator_is_member_but_not_owner() {
        let access = ProjectAccess::Collaborator;
        assert!(access.require_member().is_ok());
        assert_matches!(access.require_owner(), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn outsider_is_refused() {
        assert_matches!(ProjectAccess::None.require_member(), Err(CoreError::Forbidden(_)));
    }
}
