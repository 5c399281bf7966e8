//! Item repository contract and its SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `items` table.
//! - Provide the two predicate fetches the service needs: items of one
//!   project, and the first N incomplete items.
//!
//! # Invariants
//! - `project_uuid` is fixed at insert; updates never move an item.
//! - Listing returns store order (insertion order).

use crate::model::item::{Item, ItemId, ItemPriority};
use crate::model::project::ProjectId;
use crate::repo::store::{
    bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult, SqliteStore,
};
use rusqlite::{params, OptionalExtension, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    title,
    completed,
    priority,
    completion_date
FROM items";

/// Repository interface for item records.
pub trait ItemRepository {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// All items whose parent is `project_id`.
    fn list_items_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Item>>;
    /// Up to `limit` items with `completed = false`.
    fn list_incomplete_items(&self, limit: u32) -> RepoResult<Vec<Item>>;
    /// Overwrites title, completion flag, priority and completion date.
    fn update_item(&self, item: &Item) -> RepoResult<()>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// Deletes every item of `project_id` and returns how many were removed.
    fn delete_items_for_project(&self, project_id: ProjectId) -> RepoResult<usize>;
}

impl ItemRepository for SqliteStore<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        self.conn.execute(
            "INSERT INTO items (
                uuid,
                project_uuid,
                title,
                completed,
                priority,
                completion_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                item.id.to_string(),
                item.project_id.to_string(),
                item.title.as_str(),
                bool_to_int(item.completed),
                item.priority.as_raw(),
                item.completion_date,
            ],
        )?;

        Ok(item.id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let raw = stmt.query_row([id.to_string()], read_raw_item).optional()?;
        raw.map(RawItem::into_item).transpose()
    }

    fn list_items_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY rowid ASC;"
        ))?;
        let rows = stmt.query([project_id.to_string()])?;
        collect_items(rows)
    }

    fn list_incomplete_items(&self, limit: u32) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE completed = 0
             ORDER BY rowid ASC
             LIMIT ?1;"
        ))?;
        let rows = stmt.query([i64::from(limit)])?;
        collect_items(rows)
    }

    fn update_item(&self, item: &Item) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                title = ?1,
                completed = ?2,
                priority = ?3,
                completion_date = ?4
             WHERE uuid = ?5;",
            params![
                item.title.as_str(),
                bool_to_int(item.completed),
                item.priority.as_raw(),
                item.completion_date,
                item.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(item.id));
        }
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        Ok(())
    }

    fn delete_items_for_project(&self, project_id: ProjectId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM items WHERE project_uuid = ?1;",
            [project_id.to_string()],
        )?;
        Ok(removed)
    }
}

struct RawItem {
    uuid: String,
    project_uuid: String,
    title: String,
    completed: i64,
    priority: i64,
    completion_date: Option<i64>,
}

fn read_raw_item(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok(RawItem {
        uuid: row.get("uuid")?,
        project_uuid: row.get("project_uuid")?,
        title: row.get("title")?,
        completed: row.get("completed")?,
        priority: row.get("priority")?,
        completion_date: row.get("completion_date")?,
    })
}

impl RawItem {
    fn into_item(self) -> RepoResult<Item> {
        let priority = ItemPriority::from_raw(self.priority).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid priority `{}` in items.priority",
                self.priority
            ))
        })?;
        Ok(Item {
            id: parse_uuid(&self.uuid, "items.uuid")?,
            project_id: parse_uuid(&self.project_uuid, "items.project_uuid")?,
            title: self.title,
            completed: int_to_bool(self.completed, "items.completed")?,
            priority,
            completion_date: self.completion_date,
        })
    }
}

fn collect_items(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Item>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(read_raw_item(row)?.into_item()?);
    }
    Ok(items)
}
