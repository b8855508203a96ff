/// Authorization policies for projects and tasks
///
/// Policies are pure predicates over an authenticated actor and an already
/// loaded record. Handlers load the record, ask the policy, and only then
/// mutate.
///
/// # Rules
///
/// | Resource | view | update | delete |
/// |----------|------|--------|--------|
/// | Project  | owner | owner | owner |
/// | Task     | owner of parent project | owner of parent project | owner of parent project |
///
/// Creating a task only requires `view` on the parent project.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{authorize_project, Ability};
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::models::project::Project;
///
/// fn check(auth: &AuthContext, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
///     authorize_project(auth, Ability::Update, project)?;
///     Ok(())
/// }
/// ```

use std::fmt;

use super::middleware::AuthContext;
use crate::models::{project::Project, task::Task};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The actor may not perform this ability on the resource
    #[error("Not authorized to {ability} this {resource}")]
    Denied {
        ability: Ability,
        resource: &'static str,
    },
}

/// Actions a policy decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    View,
    Update,
    Delete,
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ability::View => "view",
            Ability::Update => "update",
            Ability::Delete => "delete",
        })
    }
}

/// Project policy: only the owner may view
pub fn can_view_project(actor: &AuthContext, project: &Project) -> bool {
    actor.user_id == project.user_id
}

/// Project policy: only the owner may update
pub fn can_update_project(actor: &AuthContext, project: &Project) -> bool {
    actor.user_id == project.user_id
}

/// Project policy: only the owner may delete
pub fn can_delete_project(actor: &AuthContext, project: &Project) -> bool {
    actor.user_id == project.user_id
}

/// Task policy: derived from the parent project
///
/// `project` must be the task's parent; a mismatched pair is always denied.
pub fn can_view_task(actor: &AuthContext, task: &Task, project: &Project) -> bool {
    task.project_id == project.id && can_view_project(actor, project)
}

/// Task policy: derived from the parent project
pub fn can_update_task(actor: &AuthContext, task: &Task, project: &Project) -> bool {
    task.project_id == project.id && can_update_project(actor, project)
}

/// Task policy: derived from the parent project
pub fn can_delete_task(actor: &AuthContext, task: &Task, project: &Project) -> bool {
    task.project_id == project.id && can_delete_project(actor, project)
}

/// Evaluates the project policy for `ability`
pub fn authorize_project(
    actor: &AuthContext,
    ability: Ability,
    project: &Project,
) -> Result<(), AuthzError> {
    let allowed = match ability {
        Ability::View => can_view_project(actor, project),
        Ability::Update => can_update_project(actor, project),
        Ability::Delete => can_delete_project(actor, project),
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %actor.user_id,
            project_id = %project.id,
            %ability,
            "Project access denied"
        );
        Err(AuthzError::Denied {
            ability,
            resource: "project",
        })
    }
}

/// Evaluates the task policy for `ability`
pub fn authorize_task(
    actor: &AuthContext,
    ability: Ability,
    task: &Task,
    project: &Project,
) -> Result<(), AuthzError> {
    let allowed = match ability {
        Ability::View => can_view_task(actor, task, project),
        Ability::Update => can_update_task(actor, task, project),
        Ability::Delete => can_delete_task(actor, task, project),
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %actor.user_id,
            task_id = %task.id,
            %ability,
            "Task access denied"
        );
        Err(AuthzError::Denied {
            ability,
            resource: "task",
        })
    }
}
