// ==========================================
// 车间生产管理系统 - 工人数据仓储
// ==========================================

use crate::db::parse_datetime_column;
use crate::domain::worker::Worker;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkerRepository - 工人仓储
// ==========================================
pub struct WorkerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建工人，返回新 id
    pub fn create(&self, name: &str, section_id: Option<i64>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO workers (name, section_id) VALUES (?1, ?2)",
            params![name, section_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Worker>> {
        let conn = self.get_conn()?;
        let worker = conn
            .query_row(
                "SELECT id, name, section_id, created_at FROM workers WHERE id = ?1",
                params![id],
                map_worker,
            )
            .optional()?;
        Ok(worker)
    }

    /// 查询全部工人（按 id 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Worker>> {
        let conn = self.get_conn()?;
        list_all_with(&conn)
    }

    /// 查询工段下的工人
    pub fn list_by_section(&self, section_id: i64) -> RepositoryResult<Vec<Worker>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, section_id, created_at FROM workers WHERE section_id = ?1 ORDER BY id",
        )?;
        let workers = stmt
            .query_map(params![section_id], map_worker)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(workers)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM workers", [], |row| row.get(0))?;
        Ok(n)
    }
}

pub(crate) fn list_all_with(conn: &Connection) -> RepositoryResult<Vec<Worker>> {
    let mut stmt = conn.prepare("SELECT id, name, section_id, created_at FROM workers ORDER BY id")?;
    let workers = stmt
        .query_map([], map_worker)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(workers)
}

fn map_worker(row: &Row<'_>) -> SqliteResult<Worker> {
    Ok(Worker {
        id: row.get(0)?,
        name: row.get(1)?,
        section_id: row.get(2)?,
        created_at: parse_datetime_column(3, &row.get::<_, String>(3)?)?,
    })
}
