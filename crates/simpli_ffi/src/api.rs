//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Forward user intents (add, edit, toggle, delete) into the core service.
//! - Return flat snapshots of projects and hot items for rendering.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - IDs cross the boundary as hyphenated UUID strings.
//! - Colors cross the boundary as `0xAARRGGBB` integers.

use log::warn;
use simpli_core::db::open_db;
use simpli_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    HotItem, Item, ItemPriority, ProjectColor, ProjectOverview, ProjectsService, ServiceConfig,
    ServiceResult, SqliteStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "simpli.sqlite3";
const DB_PATH_ENV: &str = "SIMPLI_DB_PATH";
/// Fallback for hot items whose project row is missing.
const FALLBACK_COLOR_ARGB: u32 = 0xFFFF_FFFF;
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Item row as rendered inside a project section.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub item_id: String,
    pub project_id: String,
    pub title: String,
    pub completed: bool,
    /// `0 = low`, `1 = medium`, `2 = high`.
    pub priority: i32,
    /// Star label for the priority.
    pub priority_label: String,
    pub completion_date_ms: Option<i64>,
}

/// Project section with its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub project_id: String,
    pub title: String,
    pub color_argb: u32,
    pub closed: bool,
    pub date_created_ms: i64,
    /// Completed fraction in `[0, 1]`.
    pub completion_status: f32,
    pub items: Vec<ItemView>,
}

/// Entry of the cross-project hot items strip.
#[derive(Debug, Clone, PartialEq)]
pub struct HotItemView {
    pub item: ItemView,
    pub project_color_argb: u32,
}

/// Selectable color on the project edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: u32,
    pub name: String,
    pub color_argb: u32,
}

/// Snapshot envelope for the project list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectsResponse {
    pub ok: bool,
    pub projects: Vec<ProjectView>,
    pub message: String,
}

/// Snapshot envelope for hot items.
#[derive(Debug, Clone, PartialEq)]
pub struct HotItemsResponse {
    pub ok: bool,
    pub items: Vec<HotItemView>,
    pub message: String,
}

/// Generic action response envelope for intent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created or affected record ID.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: impl std::fmt::Display) -> Self {
        warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
        Self {
            ok: false,
            id: None,
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Returns the fixed project palette in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn palette() -> Vec<PaletteEntry> {
    ProjectColor::ALL
        .into_iter()
        .enumerate()
        .map(|(index, color)| PaletteEntry {
            index: index as u32,
            name: color.as_str().to_string(),
            color_argb: color.rgba().to_argb32(),
        })
        .collect()
}

/// Returns every project with items and completion status.
#[flutter_rust_bridge::frb(sync)]
pub fn projects_snapshot() -> ProjectsResponse {
    projects_response(with_service(|service| load_projects(service)))
}

/// Returns up to ten incomplete items across projects.
#[flutter_rust_bridge::frb(sync)]
pub fn hot_items_snapshot() -> HotItemsResponse {
    hot_items_response(with_service(|service| load_hot_items(service)))
}

/// Adds a project with default values.
#[flutter_rust_bridge::frb(sync)]
pub fn project_create() -> ActionResponse {
    match with_service(|service| service.create_project()) {
        Ok(id) => ActionResponse::success("Project created.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("project_create", err),
    }
}

/// Deletes a project together with its items.
#[flutter_rust_bridge::frb(sync)]
pub fn project_delete(project_id: String) -> ActionResponse {
    let id = match parse_id(&project_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("project_delete", err),
    };
    match with_service(|service| service.delete_project(id)) {
        Ok(removed) => ActionResponse::success(
            format!("Project deleted with {removed} item(s)."),
            Some(id.to_string()),
        ),
        Err(err) => ActionResponse::failure("project_delete", err),
    }
}

/// Saves the project edit form.
///
/// `color_index` selects an entry returned by [`palette`].
#[flutter_rust_bridge::frb(sync)]
pub fn project_update(
    project_id: String,
    title: String,
    closed: bool,
    color_index: u32,
) -> ActionResponse {
    let id = match parse_id(&project_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("project_update", err),
    };
    let Some(color) = ProjectColor::from_index(color_index as usize) else {
        return ActionResponse::failure(
            "project_update",
            format!("color index {color_index} is outside the palette"),
        );
    };
    let title = title.trim().to_string();
    match with_service(|service| service.update_project(id, title, closed, color.rgba())) {
        Ok(()) => ActionResponse::success("Project updated.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("project_update", err),
    }
}

/// Adds a default item to a project.
#[flutter_rust_bridge::frb(sync)]
pub fn item_create(project_id: String) -> ActionResponse {
    let id = match parse_id(&project_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("item_create", err),
    };
    match with_service(|service| service.create_item(id)) {
        Ok(item_id) => ActionResponse::success("Item created.", Some(item_id.to_string())),
        Err(err) => ActionResponse::failure("item_create", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(item_id: String) -> ActionResponse {
    let id = match parse_id(&item_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("item_delete", err),
    };
    match with_service(|service| service.delete_item(id)) {
        Ok(()) => ActionResponse::success("Item deleted.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("item_delete", err),
    }
}

/// Swipe action: flips the completion flag.
#[flutter_rust_bridge::frb(sync)]
pub fn item_toggle_completion(item_id: String) -> ActionResponse {
    let id = match parse_id(&item_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("item_toggle_completion", err),
    };
    match with_service(|service| service.toggle_item_completion(id)) {
        Ok(completed) => ActionResponse::success(
            if completed {
                "Item completed."
            } else {
                "Item reopened."
            },
            Some(id.to_string()),
        ),
        Err(err) => ActionResponse::failure("item_toggle_completion", err),
    }
}

/// Saves the item edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn item_update(item_id: String, title: String, priority: i32, completed: bool) -> ActionResponse {
    let id = match parse_id(&item_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure("item_update", err),
    };
    let Some(priority) = ItemPriority::from_raw(i64::from(priority)) else {
        return ActionResponse::failure(
            "item_update",
            format!("priority {priority} is not one of 0|1|2"),
        );
    };
    let title = title.trim().to_string();
    match with_service(|service| service.update_item(id, title, priority, completed)) {
        Ok(()) => ActionResponse::success("Item updated.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("item_update", err),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{}`", raw.trim()))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&mut ProjectsService<SqliteStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let store = SqliteStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    let mut service = ProjectsService::new(store, ServiceConfig::default());
    f(&mut service).map_err(|err| err.to_string())
}

fn load_projects(service: &ProjectsService<SqliteStore<'_>>) -> ServiceResult<Vec<ProjectView>> {
    Ok(service.list_projects()?.iter().map(to_project_view).collect())
}

fn load_hot_items(service: &ProjectsService<SqliteStore<'_>>) -> ServiceResult<Vec<HotItemView>> {
    Ok(service.list_hot_items()?.iter().map(to_hot_item_view).collect())
}

fn projects_response(result: Result<Vec<ProjectView>, String>) -> ProjectsResponse {
    match result {
        Ok(projects) => ProjectsResponse {
            ok: true,
            projects,
            message: String::new(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=projects_snapshot error={err}");
            ProjectsResponse {
                ok: false,
                projects: Vec::new(),
                message: format!("projects_snapshot failed: {err}"),
            }
        }
    }
}

fn hot_items_response(result: Result<Vec<HotItemView>, String>) -> HotItemsResponse {
    match result {
        Ok(items) => HotItemsResponse {
            ok: true,
            items,
            message: String::new(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=hot_items_snapshot error={err}");
            HotItemsResponse {
                ok: false,
                items: Vec::new(),
                message: format!("hot_items_snapshot failed: {err}"),
            }
        }
    }
}

fn to_item_view(item: &Item) -> ItemView {
    ItemView {
        item_id: item.id.to_string(),
        project_id: item.project_id.to_string(),
        title: item.title.clone(),
        completed: item.completed,
        priority: item.priority.as_raw() as i32,
        priority_label: item.priority.stars().to_string(),
        completion_date_ms: item.completion_date,
    }
}

fn to_project_view(overview: &ProjectOverview) -> ProjectView {
    ProjectView {
        project_id: overview.project.id.to_string(),
        title: overview.project.title.clone(),
        color_argb: overview.project.color.to_argb32(),
        closed: overview.project.closed,
        date_created_ms: overview.project.date_created,
        completion_status: overview.completion_status,
        items: overview.items.iter().map(to_item_view).collect(),
    }
}

fn to_hot_item_view(hot: &HotItem) -> HotItemView {
    HotItemView {
        item: to_item_view(&hot.item),
        project_color_argb: hot
            .project_color
            .map_or(FALLBACK_COLOR_ARGB, |color| color.to_argb32()),
    }
}
