// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project aggregate management for worksite.
//!
//! A [`Project`] is an aggregate document owning its tasks, comments and
//! attachments; tasks own comments and attachments of their own.
//! [`ProjectStore`] loads, mutates and persists these aggregates on top of
//! the two collaborator contracts from `worksite-store`: a document store
//! holding the aggregate records and a blob store holding attachment
//! bytes. Deletions cascade — removing a project or task deletes every
//! attachment blob it transitively owns before the record itself goes.
//!
//! Authorization is the caller's responsibility: consult
//! [`worksite_auth::Policy`] with a relationship context computed from the
//! aggregate (supervisor, team membership, assignment) *before* invoking a
//! mutator. The store performs no permission checks of its own and must
//! not be relied upon as an enforcement boundary.

mod error;
mod project;
mod store;

pub use error::{CollaboratorError, ProjectStoreError};
pub use project::{
    Actor, NewProject, NewTask, Project, ProjectAttachment, ProjectComment, ProjectFilter,
    ProjectPatch, ProjectPriority, ProjectStatus, ProjectTask, TaskPatch, UploadFile,
};
pub use store::{PROJECTS_COLLECTION, ProjectStore};
