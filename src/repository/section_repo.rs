// ==========================================
// 车间生产管理系统 - 工段数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（成环校验在 API 层）
// ==========================================

use crate::domain::section::Section;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{
    params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction,
    TransactionBehavior,
};
use std::sync::{Arc, Mutex};

// ==========================================
// SectionRepository - 工段仓储
// ==========================================
pub struct SectionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SectionRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建工段，返回新 id
    pub fn create(&self, name: &str, next_section_id: Option<i64>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO sections (name, next_section_id) VALUES (?1, ?2)",
            params![name, next_section_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 在 BEGIN IMMEDIATE 事务中执行闭包
    ///
    /// 拓扑读取、成环判断与更新须在同一写锁内完成
    pub fn run_immediate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let value = f(&tx)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(value)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Section>> {
        let conn = self.get_conn()?;
        find_by_id_with(&conn, id)
    }

    /// 查询全部工段（按 id 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Section>> {
        let conn = self.get_conn()?;
        list_all_with(&conn)
    }

    /// 查询流向指定工段的上游工段
    pub fn find_upstream(&self, section_id: i64) -> RepositoryResult<Vec<Section>> {
        let conn = self.get_conn()?;
        find_upstream_with(&conn, section_id)
    }

    /// 工段总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM sections", [], |row| row.get(0))?;
        Ok(n)
    }
}

// ==========================================
// 连接级查询（供事务内读模型复用）
// ==========================================

pub(crate) fn find_by_id_with(conn: &Connection, id: i64) -> RepositoryResult<Option<Section>> {
    let section = conn
        .query_row(
            "SELECT id, name, next_section_id FROM sections WHERE id = ?1",
            params![id],
            map_section,
        )
        .optional()?;
    Ok(section)
}

/// 在给定连接/事务上修改工段下游
pub(crate) fn update_next_section_with(
    conn: &Connection,
    section_id: i64,
    next_section_id: Option<i64>,
) -> RepositoryResult<()> {
    let rows = conn.execute(
        "UPDATE sections SET next_section_id = ?2 WHERE id = ?1",
        params![section_id, next_section_id],
    )?;
    if rows == 0 {
        return Err(RepositoryError::NotFound {
            entity: "Section".to_string(),
            id: section_id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn list_all_with(conn: &Connection) -> RepositoryResult<Vec<Section>> {
    let mut stmt = conn.prepare("SELECT id, name, next_section_id FROM sections ORDER BY id")?;
    let sections = stmt
        .query_map([], map_section)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(sections)
}

pub(crate) fn find_upstream_with(conn: &Connection, section_id: i64) -> RepositoryResult<Vec<Section>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, next_section_id FROM sections WHERE next_section_id = ?1 ORDER BY id",
    )?;
    let sections = stmt
        .query_map(params![section_id], map_section)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(sections)
}

fn map_section(row: &Row<'_>) -> SqliteResult<Section> {
    Ok(Section {
        id: row.get(0)?,
        name: row.get(1)?,
        next_section_id: row.get(2)?,
    })
}
