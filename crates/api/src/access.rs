//! Resolving a project address and the caller's role on it.
//!
//! Projects are addressed as `/users/{owner_id}/projects/{project_no}`,
//! where `project_no` is the owner-scoped `user_project_id`.

use annotator_core::access::ProjectAccess;
use annotator_core::error::CoreError;
use annotator_core::types::DbId;
use annotator_db::models::project::Project;
use annotator_db::repositories::{CollaboratorRepo, ProjectRepo};
use annotator_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProjectPath {
    pub owner_id: DbId,
    pub project_no: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TextPath {
    pub owner_id: DbId,
    pub project_no: i32,
    pub text_id: DbId,
}

impl TextPath {
    pub fn project(self) -> ProjectPath {
        ProjectPath {
            owner_id: self.owner_id,
            project_no: self.project_no,
        }
    }
}

/// A loaded project with the caller's role on it.
#[derive(Debug, Clone)]
pub struct ProjectScope {
    pub project: Project,
    pub access: ProjectAccess,
}

impl ProjectScope {
    pub fn id(&self) -> DbId {
        self.project.id
    }
}

/// Load the project at `path` and resolve the caller's role. Missing
/// projects are 404; the role itself is checked by the caller.
pub async fn load_project(
    pool: &DbPool,
    path: ProjectPath,
    user: &AuthUser,
) -> AppResult<ProjectScope> {
    let project = ProjectRepo::find_by_owner_number(pool, path.owner_id, path.project_no)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: DbId::from(path.project_no),
        }))?;

    let is_collaborator = project.owner_id != user.user_id
        && CollaboratorRepo::exists(pool, project.id, user.user_id).await?;
    let access = ProjectAccess::resolve(project.owner_id, user.user_id, is_collaborator);

    Ok(ProjectScope { project, access })
}

/// Load a project the caller owns or collaborates on.
pub async fn load_as_member(
    pool: &DbPool,
    path: ProjectPath,
    user: &AuthUser,
) -> AppResult<ProjectScope> {
    let scope = load_project(pool, path, user).await?;
    scope.access.require_member()?;
    Ok(scope)
}

/// Load a project the caller owns.
pub async fn load_as_owner(
    pool: &DbPool,
    path: ProjectPath,
    user: &AuthUser,
) -> AppResult<ProjectScope> {
    let scope = load_project(pool, path, user).await?;
    scope.access.require_owner()?;
    Ok(scope)
}
