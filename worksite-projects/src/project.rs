// SPDX-License-Identifier: MIT OR Apache-2.0

//! The project aggregate and its nested entities.
//!
//! A [`Project`] owns three embedded collections: tasks, comments and
//! attachments, with each task owning comments and attachments of its own.
//! Nested entities exist only inside their owning aggregate document; they
//! are never addressable as independent records.

use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use worksite_auth::Role;

/// Progress state shared by projects and tasks.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProjectStatus::NotStarted => "not-started",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        };

        write!(f, "{}", s)
    }
}

/// Scheduling priority of a project.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPriority {
    Low,
    Medium,
    High,
}

impl Display for ProjectPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProjectPriority::Low => "low",
            ProjectPriority::Medium => "medium",
            ProjectPriority::High => "high",
        };

        write!(f, "{}", s)
    }
}

/// The acting identity passed explicitly into every operation that records
/// authorship. There is no ambient current-user state anywhere in this
/// crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// The project aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Assigned by the document store on creation.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    /// Actor id of the supervising actor.
    pub supervisor: String,
    /// Actor ids of team members; order is irrelevant.
    pub team: BTreeSet<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tasks: Vec<ProjectTask>,
    pub comments: Vec<ProjectComment>,
    pub attachments: Vec<ProjectAttachment>,
}

impl Project {
    /// Return `true` if `actor_id` supervises this project.
    pub fn is_supervised_by(&self, actor_id: &str) -> bool {
        self.supervisor == actor_id
    }

    /// Return `true` if `actor_id` is on the project team.
    pub fn has_team_member(&self, actor_id: &str) -> bool {
        self.team.contains(actor_id)
    }
}

/// A task owned by exactly one project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    /// Actor ids assigned to the task; order is irrelevant.
    pub assigned_to: BTreeSet<String>,
    pub due_date: DateTime<Utc>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<ProjectComment>,
    pub attachments: Vec<ProjectAttachment>,
}

impl ProjectTask {
    /// Return `true` if `actor_id` is assigned to this task.
    pub fn is_assigned_to(&self, actor_id: &str) -> bool {
        self.assigned_to.contains(actor_id)
    }
}

/// A comment owned by exactly one project or one task.
///
/// Immutable after creation except for deletion. `created_by_name` is the
/// author's display name captured at creation time; it is not kept in sync
/// with later name changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectComment {
    pub id: String,
    pub content: String,
    pub created_by: String,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
}

/// A file reference owned by exactly one project or one task. The bytes
/// themselves live in the blob store behind `file_url`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAttachment {
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Payload for creating a project. Identifier, stamps and the nested
/// collections are assigned by the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub supervisor: String,
    pub team: BTreeSet<String>,
}

/// Payload for adding a task to a project. Identifier, stamps and the
/// nested collections are assigned by the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub assigned_to: BTreeSet<String>,
    pub due_date: DateTime<Utc>,
}

/// Partial update of a project's own fields.
///
/// Only the mutable fields are expressible here: the identifier, creation
/// stamp and nested collections cannot be smuggled through the top-level
/// update path.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ProjectPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<BTreeSet<String>>,
}

/// Partial update of a task's own fields. Same constraints as
/// [`ProjectPatch`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Merge the set fields into `task`, leaving the rest untouched.
    pub fn apply(self, task: &mut ProjectTask) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// A file to attach, as received from the caller. The bytes are handed to
/// the blob store; only the returned reference URL ends up in the
/// aggregate.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub file_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Narrows a project listing. All present criteria must hold.
#[derive(Clone, Debug, Default)]
pub struct ProjectFilter {
    /// Keep projects in this status.
    pub status: Option<ProjectStatus>,
    /// Keep projects supervised by this actor id.
    pub supervisor: Option<String>,
    /// Keep projects whose team contains this actor id.
    pub team_member: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        let status_ok = self.status.is_none_or(|status| project.status == status);
        let supervisor_ok = self
            .supervisor
            .as_deref()
            .is_none_or(|supervisor| project.is_supervised_by(supervisor));
        let team_ok = self
            .team_member
            .as_deref()
            .is_none_or(|member| project.has_team_member(member));

        status_ok && supervisor_ok && team_ok
    }
}
