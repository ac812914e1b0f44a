// SPDX-License-Identifier: MIT OR Apache-2.0

//! Load, mutate and persist project aggregates.
//!
//! Every nested collection (tasks, comments, attachments, and the
//! per-task collections) is embedded in the project document, so each
//! nested mutation is a read-modify-write of the whole owning sequence:
//! load the aggregate, locate the target by id, replace or remove exactly
//! that element, write the sequence back, and return the re-read
//! aggregate. Sibling elements are carried through as loaded.
//!
//! No ordering is guaranteed across concurrent calls against the same
//! aggregate id: two concurrent writers can interleave their reads and
//! writes so that the second write overwrites the first (a lost update).
//! Callers needing stronger guarantees must serialize their own access.
//!
//! Authorization is deliberately not enforced here. Callers consult
//! [`worksite_auth::Policy`] before invoking a mutator; the store trusts
//! its input.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;
use worksite_auth::Role;
use worksite_store::{BlobStore, DocumentStore};

use crate::error::ProjectStoreError;
use crate::project::{
    Actor, NewProject, NewTask, Project, ProjectAttachment, ProjectComment, ProjectFilter,
    ProjectPatch, ProjectTask, TaskPatch, UploadFile,
};

/// Collection holding the project aggregate documents.
pub const PROJECTS_COLLECTION: &str = "projects";

/// Stateful manager of [`Project`] aggregates on top of a document store
/// and a blob store.
///
/// Each operation independently re-reads the aggregate from the document
/// store; the manager holds no aggregate state of its own. Cloning the
/// collaborators (both in-memory implementations are cheap handles) allows
/// constructing several managers over the same backing state.
#[derive(Clone, Debug)]
pub struct ProjectStore<D, B> {
    documents: D,
    blobs: B,
}

impl<D, B> ProjectStore<D, B>
where
    D: DocumentStore,
    B: BlobStore,
{
    pub fn new(documents: D, blobs: B) -> Self {
        Self { documents, blobs }
    }

    /// List projects matching `filter`, newest first.
    ///
    /// The `created_at`-descending order is a contract callers may rely
    /// on.
    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, ProjectStoreError> {
        let mut projects: Vec<Project> = self
            .documents
            .list(PROJECTS_COLLECTION)
            .await
            .map_err(Self::documents_err)?;

        projects.retain(|project| filter.matches(project));
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(projects)
    }

    /// List the projects visible to `actor`: admins see all, supervisors
    /// the projects they supervise, everyone else the projects whose team
    /// they are on.
    ///
    /// This is a listing convenience, not an authorization mechanism —
    /// mutations are still gated by the caller through
    /// [`worksite_auth::Policy`].
    pub async fn list_projects_for_actor(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Project>, ProjectStoreError> {
        let filter = match actor.role {
            Role::Admin => ProjectFilter::default(),
            Role::Supervisor => ProjectFilter {
                supervisor: Some(actor.id.clone()),
                ..Default::default()
            },
            _ => ProjectFilter {
                team_member: Some(actor.id.clone()),
                ..Default::default()
            },
        };

        self.list_projects(&filter).await
    }

    /// Load a project by id. `None` when absent.
    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>, ProjectStoreError> {
        self.documents
            .get(PROJECTS_COLLECTION, project_id)
            .await
            .map_err(Self::documents_err)
    }

    /// Load a task by id from inside its project. A missing task is an
    /// error: task identity is load-bearing for task-scoped flows.
    pub async fn get_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> Result<ProjectTask, ProjectStoreError> {
        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;
        Ok(project.tasks.swap_remove(position))
    }

    /// Create a project. The store assigns the id and both stamps (equal
    /// at creation) and initializes the nested collections empty.
    pub async fn create_project(
        &mut self,
        new: NewProject,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if new.name.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("name"));
        }

        let now = self.now().await?;
        let project = Project {
            id: String::new(),
            name: new.name,
            description: new.description,
            status: new.status,
            priority: new.priority,
            start_date: new.start_date,
            end_date: new.end_date,
            budget: new.budget,
            supervisor: new.supervisor,
            team: new.team,
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
            tasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
        };

        let id = self
            .documents
            .insert(PROJECTS_COLLECTION, &project)
            .await
            .map_err(Self::documents_err)?;
        self.documents
            .merge(PROJECTS_COLLECTION, &id, json!({ "id": id }))
            .await
            .map_err(Self::documents_err)?;

        debug!(project = %id, "created project");
        self.load(&id).await
    }

    /// Merge the set fields of `patch` into the project and bump its
    /// update stamp.
    ///
    /// The identifier, creation stamp and nested collections are not
    /// expressible in a [`ProjectPatch`], so the top-level update path
    /// cannot clobber them.
    pub async fn update_project(
        &mut self,
        project_id: &str,
        patch: ProjectPatch,
    ) -> Result<Project, ProjectStoreError> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ProjectStoreError::empty_field("name"));
        }

        self.load(project_id).await?;

        let now = self.now().await?;
        let mut fields = match serde_json::to_value(&patch)? {
            Value::Object(fields) => fields,
            // A patch struct always serializes to an object.
            _ => serde_json::Map::new(),
        };
        fields.insert("updatedAt".to_string(), serde_json::to_value(now)?);

        debug!(project = %project_id, "updated project");
        self.write_back(project_id, Value::Object(fields)).await
    }

    /// Delete a project, cascading over every attachment blob it
    /// transitively owns.
    ///
    /// Blobs go first: a failed blob delete aborts the operation before
    /// the aggregate record is touched, leaving the aggregate intact
    /// rather than stranding unreferenced blobs. Returns `false` when the
    /// project was already absent.
    pub async fn delete_project(&mut self, project_id: &str) -> Result<bool, ProjectStoreError> {
        let Some(project) = self.get_project(project_id).await? else {
            return Ok(false);
        };

        for attachment in &project.attachments {
            self.delete_blob(&attachment.file_url).await?;
        }
        for task in &project.tasks {
            for attachment in &task.attachments {
                self.delete_blob(&attachment.file_url).await?;
            }
        }

        let deleted = self
            .documents
            .delete(PROJECTS_COLLECTION, project_id)
            .await
            .map_err(Self::documents_err)?;

        debug!(project = %project_id, "deleted project");
        Ok(deleted)
    }

    /// Append a comment to the project. Author id and display name are
    /// captured from `actor` now and never re-resolved.
    pub async fn add_comment(
        &mut self,
        project_id: &str,
        content: &str,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if content.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("content"));
        }

        let mut project = self.load(project_id).await?;
        let now = self.now().await?;
        project.comments.push(new_comment(content, actor, now));

        debug!(project = %project_id, "added comment");
        self.write_back(project_id, json!({ "comments": project.comments, "updatedAt": now }))
            .await
    }

    /// Remove a comment by id. Deletion is "ensure absent": removing an
    /// already-absent comment succeeds and returns the aggregate as is.
    pub async fn delete_comment(
        &mut self,
        project_id: &str,
        comment_id: &str,
    ) -> Result<Project, ProjectStoreError> {
        let mut project = self.load(project_id).await?;

        let before = project.comments.len();
        project.comments.retain(|comment| comment.id != comment_id);
        if project.comments.len() == before {
            return Ok(project);
        }

        let now = self.now().await?;
        debug!(project = %project_id, comment = %comment_id, "deleted comment");
        self.write_back(project_id, json!({ "comments": project.comments, "updatedAt": now }))
            .await
    }

    /// Upload `file` to the blob store and append the returned reference
    /// to the project's attachments.
    pub async fn add_attachment(
        &mut self,
        project_id: &str,
        file: UploadFile,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if file.file_name.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("file name"));
        }

        let mut project = self.load(project_id).await?;

        let attachment_id = Uuid::new_v4().to_string();
        let path = format!(
            "projects/{project_id}/attachments/{attachment_id}/{}",
            file.file_name
        );
        let url = self
            .blobs
            .upload(&path, &file.bytes)
            .await
            .map_err(Self::blobs_err)?;

        let now = self.now().await?;
        project
            .attachments
            .push(new_attachment(attachment_id, file, url, actor, now));

        debug!(project = %project_id, "added attachment");
        self.write_back(
            project_id,
            json!({ "attachments": project.attachments, "updatedAt": now }),
        )
        .await
    }

    /// Remove an attachment by id, deleting its blob first.
    ///
    /// The blob goes before the reference: a blob that outlives its
    /// reference is a leak, a reference that outlives its blob is a
    /// dangling link. Removing an already-absent attachment succeeds and
    /// returns the aggregate as is.
    pub async fn delete_attachment(
        &mut self,
        project_id: &str,
        attachment_id: &str,
    ) -> Result<Project, ProjectStoreError> {
        let mut project = self.load(project_id).await?;

        let Some(position) = project
            .attachments
            .iter()
            .position(|attachment| attachment.id == attachment_id)
        else {
            return Ok(project);
        };

        self.delete_blob(&project.attachments[position].file_url)
            .await?;
        project.attachments.remove(position);

        let now = self.now().await?;
        debug!(project = %project_id, attachment = %attachment_id, "deleted attachment");
        self.write_back(
            project_id,
            json!({ "attachments": project.attachments, "updatedAt": now }),
        )
        .await
    }

    /// Append a task. The store assigns the id and both stamps and
    /// initializes the task's nested collections empty.
    pub async fn add_task(
        &mut self,
        project_id: &str,
        new: NewTask,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if new.title.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("title"));
        }

        let mut project = self.load(project_id).await?;
        let now = self.now().await?;
        project.tasks.push(ProjectTask {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            status: new.status,
            assigned_to: new.assigned_to,
            due_date: new.due_date,
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            attachments: Vec::new(),
        });

        debug!(project = %project_id, "added task");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Merge the set fields of `patch` into a task and bump both the
    /// task's and the project's update stamps. A missing task is an
    /// error, not a no-op.
    pub async fn update_task(
        &mut self,
        project_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Project, ProjectStoreError> {
        if patch
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(ProjectStoreError::empty_field("title"));
        }

        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;
        let now = self.now().await?;

        let task = &mut project.tasks[position];
        patch.apply(task);
        task.updated_at = now;

        debug!(project = %project_id, task = %task_id, "updated task");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Remove a task by id, cascading over its attachment blobs first.
    /// A missing task is an error, not a no-op.
    pub async fn delete_task(
        &mut self,
        project_id: &str,
        task_id: &str,
    ) -> Result<Project, ProjectStoreError> {
        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;

        let task = project.tasks.remove(position);
        for attachment in &task.attachments {
            self.delete_blob(&attachment.file_url).await?;
        }

        let now = self.now().await?;
        debug!(project = %project_id, task = %task_id, "deleted task");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Append a comment to a task. Same semantics as [`Self::add_comment`],
    /// scoped to the task; a missing task is an error.
    pub async fn add_task_comment(
        &mut self,
        project_id: &str,
        task_id: &str,
        content: &str,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if content.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("content"));
        }

        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;
        let now = self.now().await?;

        let task = &mut project.tasks[position];
        task.comments.push(new_comment(content, actor, now));
        task.updated_at = now;

        debug!(project = %project_id, task = %task_id, "added task comment");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Remove a comment from a task. A missing task is an error; an
    /// already-absent comment is success.
    pub async fn delete_task_comment(
        &mut self,
        project_id: &str,
        task_id: &str,
        comment_id: &str,
    ) -> Result<Project, ProjectStoreError> {
        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;

        let removed = {
            let task = &mut project.tasks[position];
            let before = task.comments.len();
            task.comments.retain(|comment| comment.id != comment_id);
            task.comments.len() != before
        };
        if !removed {
            return Ok(project);
        }

        let now = self.now().await?;
        project.tasks[position].updated_at = now;

        debug!(project = %project_id, task = %task_id, comment = %comment_id, "deleted task comment");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Upload `file` and append the returned reference to a task's
    /// attachments. A missing task is an error.
    pub async fn add_task_attachment(
        &mut self,
        project_id: &str,
        task_id: &str,
        file: UploadFile,
        actor: &Actor,
    ) -> Result<Project, ProjectStoreError> {
        if file.file_name.trim().is_empty() {
            return Err(ProjectStoreError::empty_field("file name"));
        }

        let mut project = self.load(project_id).await?;
        let position = task_position(&project, task_id)?;

        let attachment_id = Uuid::new_v4().to_string();
        let path = format!(
            "projects/{project_id}/tasks/{task_id}/attachments/{attachment_id}/{}",
            file.file_name
        );
        let url = self
            .blobs
            .upload(&path, &file.bytes)
            .await
            .map_err(Self::blobs_err)?;

        let now = self.now().await?;
        let task = &mut project.tasks[position];
        task.attachments
            .push(new_attachment(attachment_id, file, url, actor, now));
        task.updated_at = now;

        debug!(project = %project_id, task = %task_id, "added task attachment");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    /// Remove an attachment from a task, deleting its blob first. A
    /// missing task is an error; an already-absent attachment is success.
    pub async fn delete_task_attachment(
        &mut self,
        project_id: &str,
        task_id: &str,
        attachment_id: &str,
    ) -> Result<Project, ProjectStoreError> {
        let mut project = self.load(project_id).await?;
        let task_index = task_position(&project, task_id)?;

        let Some(position) = project.tasks[task_index]
            .attachments
            .iter()
            .position(|attachment| attachment.id == attachment_id)
        else {
            return Ok(project);
        };

        let url = project.tasks[task_index].attachments[position]
            .file_url
            .clone();
        self.delete_blob(&url).await?;

        let now = self.now().await?;
        let task = &mut project.tasks[task_index];
        task.attachments.remove(position);
        task.updated_at = now;

        debug!(project = %project_id, task = %task_id, attachment = %attachment_id, "deleted task attachment");
        self.write_back(project_id, json!({ "tasks": project.tasks, "updatedAt": now }))
            .await
    }

    async fn load(&self, project_id: &str) -> Result<Project, ProjectStoreError> {
        self.get_project(project_id)
            .await?
            .ok_or_else(|| ProjectStoreError::ProjectNotFound(project_id.to_string()))
    }

    /// Persist changed top-level fields and return the re-read aggregate,
    /// so callers observe a consistent snapshot.
    async fn write_back(
        &mut self,
        project_id: &str,
        fields: Value,
    ) -> Result<Project, ProjectStoreError> {
        self.documents
            .merge(PROJECTS_COLLECTION, project_id, fields)
            .await
            .map_err(Self::documents_err)?;
        self.load(project_id).await
    }

    async fn delete_blob(&mut self, url: &str) -> Result<(), ProjectStoreError> {
        debug!(%url, "deleting attachment blob");
        self.blobs.delete(url).await.map_err(Self::blobs_err)
    }

    async fn now(&self) -> Result<DateTime<Utc>, ProjectStoreError> {
        self.documents
            .server_time()
            .await
            .map_err(Self::documents_err)
    }

    fn documents_err(err: D::Error) -> ProjectStoreError {
        ProjectStoreError::Documents(Box::new(err))
    }

    fn blobs_err(err: B::Error) -> ProjectStoreError {
        ProjectStoreError::Blobs(Box::new(err))
    }
}

fn task_position(project: &Project, task_id: &str) -> Result<usize, ProjectStoreError> {
    project
        .tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or_else(|| ProjectStoreError::TaskNotFound {
            project: project.id.clone(),
            task: task_id.to_string(),
        })
}

fn new_comment(content: &str, actor: &Actor, now: DateTime<Utc>) -> ProjectComment {
    ProjectComment {
        id: Uuid::new_v4().to_string(),
        content: content.to_string(),
        created_by: actor.id.clone(),
        created_by_name: actor.name.clone(),
        created_at: now,
    }
}

fn new_attachment(
    id: String,
    file: UploadFile,
    url: String,
    actor: &Actor,
    now: DateTime<Utc>,
) -> ProjectAttachment {
    ProjectAttachment {
        id,
        file_name: file.file_name,
        file_url: url,
        file_type: file.file_type,
        uploaded_by: actor.id.clone(),
        uploaded_at: now,
    }
}
