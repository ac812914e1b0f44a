// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Boxed failure reported by a persistence or blob collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by the project aggregate store.
///
/// Expected business conditions (a missing project or task, an invalid
/// payload) get their own variants so callers can branch on them;
/// collaborator failures are propagated unmodified inside the two
/// collaborator variants. Retrying is the caller's concern.
#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error("project {0:?} does not exist")]
    ProjectNotFound(String),

    #[error("task {task:?} does not exist in project {project:?}")]
    TaskNotFound { project: String, task: String },

    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("document store failed: {0}")]
    Documents(#[source] CollaboratorError),

    #[error("blob store failed: {0}")]
    Blobs(#[source] CollaboratorError),

    #[error("serializing aggregate fields: {0}")]
    Codec(#[from] serde_json::Error),
}

impl ProjectStoreError {
    pub(crate) fn empty_field(field: &'static str) -> Self {
        ProjectStoreError::Validation {
            field,
            reason: "must not be empty",
        }
    }

    /// Return `true` if this failure reports a missing project or task.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProjectStoreError::ProjectNotFound(_) | ProjectStoreError::TaskNotFound { .. }
        )
    }
}
