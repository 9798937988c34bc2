// ==========================================
// 车间生产管理系统 - 物料品种数据仓储
// ==========================================

use crate::domain::worker::Item;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建品种，返回新 id
    pub fn create(&self, name: &str, unit: &str, default_target: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO items (name, unit, default_target) VALUES (?1, ?2, ?3)",
            params![name, unit, default_target],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(
                "SELECT id, name, unit, default_target FROM items WHERE id = ?1",
                params![id],
                map_item,
            )
            .optional()?;
        Ok(item)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, unit, default_target FROM items ORDER BY id")?;
        let items = stmt
            .query_map([], map_item)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }
}

fn map_item(row: &Row<'_>) -> SqliteResult<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        default_target: row.get(3)?,
    })
}
