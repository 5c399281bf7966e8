//! Project/item use-case service.
//!
//! # Responsibility
//! - Be the only reader and writer of project/item state for callers.
//! - Run every mutation as one store transaction.
//! - Re-publish the project list and hot items after every write.
//!
//! # Invariants
//! - A write is committed (or rolled back) before snapshots are republished.
//! - A lookup miss performs no write and publishes nothing.
//! - Deleting a project deletes its items in the same transaction.
//! - `toggle_item_completion` never touches `completion_date`; only
//!   `update_item` stamps it, and only when the completion flag changes.

use crate::model::color::{ColorError, Rgba};
use crate::model::item::{Item, ItemId, ItemPriority};
use crate::model::project::{Project, ProjectId};
use crate::repo::item_repo::ItemRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::store::{RepoError, RepoResult, WorkingContext};
use crate::service::config::{PriorityPicker, ServiceConfig};
use crate::service::snapshot::{SnapshotChannel, SubscriptionId};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for project/item use-cases.
#[derive(Debug)]
pub enum ServiceError {
    ProjectNotFound(ProjectId),
    ItemNotFound(ItemId),
    /// Caller supplied a color outside the RGBA unit range.
    InvalidColor(ColorError),
    /// Persistence-layer failure (fetch or commit).
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidColor(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidColor(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Project read model with its items and derived progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOverview {
    pub project: Project,
    pub items: Vec<Item>,
    /// Completed fraction of `items`, in `[0, 1]`.
    pub completion_status: f32,
}

impl ProjectOverview {
    pub fn new(project: Project, items: Vec<Item>) -> Self {
        let completion_status = completion_status(&items);
        Self {
            project,
            items,
            completion_status,
        }
    }
}

/// Incomplete item highlighted across projects.
#[derive(Debug, Clone, PartialEq)]
pub struct HotItem {
    pub item: Item,
    /// Color of the owning project; `None` only if the parent row is gone.
    pub project_color: Option<Rgba>,
}

/// Fraction of completed items; `0.0` when there are none.
pub fn completion_status(items: &[Item]) -> f32 {
    if items.is_empty() {
        return 0.0;
    }
    let completed = items.iter().filter(|item| item.completed).count();
    completed as f32 / items.len() as f32
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Domain service over an injected project/item store.
pub struct ProjectsService<S> {
    store: S,
    config: ServiceConfig,
    priorities: PriorityPicker,
    projects: SnapshotChannel<Vec<ProjectOverview>>,
    hot_items: SnapshotChannel<Vec<HotItem>>,
}

impl<S> ProjectsService<S>
where
    S: ProjectRepository + ItemRepository + WorkingContext,
{
    /// Creates the service and publishes the initial snapshots.
    pub fn new(store: S, config: ServiceConfig) -> Self {
        let priorities = PriorityPicker::from_policy(config.priority_policy);
        let mut service = Self {
            store,
            config,
            priorities,
            projects: SnapshotChannel::default(),
            hot_items: SnapshotChannel::default(),
        };
        service.refresh();
        service
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Last published project list.
    pub fn projects(&self) -> &[ProjectOverview] {
        self.projects.current()
    }

    /// Last published hot items.
    pub fn hot_items(&self) -> &[HotItem] {
        self.hot_items.current()
    }

    pub fn subscribe_projects(
        &mut self,
        listener: impl FnMut(&Vec<ProjectOverview>) + 'static,
    ) -> SubscriptionId {
        self.projects.subscribe(listener)
    }

    pub fn subscribe_hot_items(
        &mut self,
        listener: impl FnMut(&Vec<HotItem>) + 'static,
    ) -> SubscriptionId {
        self.hot_items.subscribe(listener)
    }

    pub fn unsubscribe_projects(&mut self, id: SubscriptionId) -> bool {
        self.projects.unsubscribe(id)
    }

    pub fn unsubscribe_hot_items(&mut self, id: SubscriptionId) -> bool {
        self.hot_items.unsubscribe(id)
    }

    /// Lists every project in store order, with items and progress.
    pub fn list_projects(&self) -> ServiceResult<Vec<ProjectOverview>> {
        let projects = self.store.list_projects()?;
        projects
            .into_iter()
            .map(|project| -> ServiceResult<ProjectOverview> {
                let items = self.store.list_items_for_project(project.id)?;
                Ok(ProjectOverview::new(project, items))
            })
            .collect()
    }

    /// Lists up to `hot_items_limit` incomplete items in store order.
    pub fn list_hot_items(&self) -> ServiceResult<Vec<HotItem>> {
        let items = self
            .store
            .list_incomplete_items(self.config.hot_items_limit)?;
        let mut colors: HashMap<ProjectId, Option<Rgba>> = HashMap::new();
        let mut hot_items = Vec::with_capacity(items.len());
        for item in items {
            let project_color = match colors.get(&item.project_id) {
                Some(color) => *color,
                None => {
                    let color = self
                        .store
                        .get_project(item.project_id)?
                        .map(|project| project.color);
                    colors.insert(item.project_id, color);
                    color
                }
            };
            hot_items.push(HotItem {
                item,
                project_color,
            });
        }
        Ok(hot_items)
    }

    pub fn get_project(&self, id: ProjectId) -> ServiceResult<Option<Project>> {
        Ok(self.store.get_project(id)?)
    }

    pub fn get_item(&self, id: ItemId) -> ServiceResult<Option<Item>> {
        Ok(self.store.get_item(id)?)
    }

    /// Re-reads both views and publishes them.
    ///
    /// A failed fetch is logged and published as an empty snapshot.
    pub fn refresh(&mut self) {
        let projects = self.list_projects().unwrap_or_else(|err| {
            error!("event=snapshot_refresh module=service status=error view=projects error={err}");
            Vec::new()
        });
        self.projects.publish(projects);

        let hot_items = self.list_hot_items().unwrap_or_else(|err| {
            error!("event=snapshot_refresh module=service status=error view=hot_items error={err}");
            Vec::new()
        });
        self.hot_items.publish(hot_items);
    }

    /// Inserts a project with default title, color and open state.
    pub fn create_project(&mut self) -> ServiceResult<ProjectId> {
        let project = Project::new_default(now_epoch_ms());
        let store = &self.store;
        let result = store.run_in_transaction(|| store.create_project(&project));
        self.finish_write("project_create", result)
    }

    /// Inserts a default item under `project_id` with a policy-chosen priority.
    pub fn create_item(&mut self, project_id: ProjectId) -> ServiceResult<ItemId> {
        let project = self.require_project(project_id, "item_create")?;
        let item = Item::new_default(project.id, self.priorities.next_priority());
        let store = &self.store;
        let result = store.run_in_transaction(|| store.create_item(&item));
        self.finish_write("item_create", result)
    }

    /// Deletes a project and its items; returns how many items were removed.
    pub fn delete_project(&mut self, id: ProjectId) -> ServiceResult<usize> {
        self.require_project(id, "project_delete")?;
        let store = &self.store;
        let result = store.run_in_transaction(|| {
            let removed = store.delete_items_for_project(id)?;
            store.delete_project(id)?;
            Ok(removed)
        });
        if let Ok(removed) = &result {
            info!("event=project_delete module=service status=cascade items_removed={removed}");
        }
        self.finish_write("project_delete", result)
    }

    pub fn delete_item(&mut self, id: ItemId) -> ServiceResult<()> {
        self.require_item(id, "item_delete")?;
        let store = &self.store;
        let result = store.run_in_transaction(|| store.delete_item(id));
        self.finish_write("item_delete", result)
    }

    /// Flips `completed` and returns the new value.
    ///
    /// `completion_date` is not touched on this path.
    pub fn toggle_item_completion(&mut self, id: ItemId) -> ServiceResult<bool> {
        let mut item = self.require_item(id, "item_toggle")?;
        item.completed = !item.completed;
        let store = &self.store;
        let result = store
            .run_in_transaction(|| store.update_item(&item))
            .map(|()| item.completed);
        self.finish_write("item_toggle", result)
    }

    /// Overwrites title, closed flag and color.
    pub fn update_project(
        &mut self,
        id: ProjectId,
        title: impl Into<String>,
        closed: bool,
        color: Rgba,
    ) -> ServiceResult<()> {
        color.validate().map_err(ServiceError::InvalidColor)?;
        let mut project = self.require_project(id, "project_update")?;
        project.title = title.into();
        project.closed = closed;
        project.color = color;
        let store = &self.store;
        let result = store.run_in_transaction(|| store.update_project(&project));
        self.finish_write("project_update", result)
    }

    /// Overwrites title and priority; stamps `completion_date` when
    /// `completed` differs from the stored flag.
    pub fn update_item(
        &mut self,
        id: ItemId,
        title: impl Into<String>,
        priority: ItemPriority,
        completed: bool,
    ) -> ServiceResult<()> {
        let mut item = self.require_item(id, "item_update")?;
        item.title = title.into();
        item.priority = priority;
        if item.completed != completed {
            item.completed = completed;
            item.completion_date = Some(now_epoch_ms());
        }
        let store = &self.store;
        let result = store.run_in_transaction(|| store.update_item(&item));
        self.finish_write("item_update", result)
    }

    fn require_project(&self, id: ProjectId, event: &'static str) -> ServiceResult<Project> {
        match self.store.get_project(id) {
            Ok(Some(project)) => Ok(project),
            Ok(None) => {
                warn!("event={event} module=service status=not_found project_id={id}");
                Err(ServiceError::ProjectNotFound(id))
            }
            Err(err) => {
                error!("event={event} module=service status=error stage=fetch error={err}");
                Err(err.into())
            }
        }
    }

    fn require_item(&self, id: ItemId, event: &'static str) -> ServiceResult<Item> {
        match self.store.get_item(id) {
            Ok(Some(item)) => Ok(item),
            Ok(None) => {
                warn!("event={event} module=service status=not_found item_id={id}");
                Err(ServiceError::ItemNotFound(id))
            }
            Err(err) => {
                error!("event={event} module=service status=error stage=fetch error={err}");
                Err(err.into())
            }
        }
    }

    fn finish_write<T>(&mut self, event: &'static str, result: RepoResult<T>) -> ServiceResult<T> {
        match &result {
            Ok(_) => info!("event={event} module=service status=ok"),
            Err(err) => error!("event={event} module=service status=error stage=commit error={err}"),
        }
        self.refresh();
        result.map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::completion_status;
    use crate::model::item::{Item, ItemPriority};
    use uuid::Uuid;

    fn item(completed: bool) -> Item {
        let mut item = Item::new_default(Uuid::new_v4(), ItemPriority::Low);
        item.completed = completed;
        item
    }

    #[test]
    fn completion_status_is_zero_without_items() {
        assert_eq!(completion_status(&[]), 0.0);
    }

    #[test]
    fn completion_status_is_completed_fraction() {
        let items = [item(true), item(false), item(false), item(true)];
        assert!((completion_status(&items) - 0.5).abs() < f32::EPSILON);
        assert_eq!(completion_status(&[item(true)]), 1.0);
    }
}
