// ==========================================
// 车间生产管理系统 - 领料单数据仓储
// ==========================================
// 红线: 状态流转规则在 API 层，这里只做条件更新
// ==========================================

use crate::db::parse_datetime_column;
use crate::domain::requisition::Requisition;
use crate::domain::types::RequisitionStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct RequisitionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RequisitionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建领料单（状态 pending），返回新 id
    pub fn insert(&self, item_id: i64, section_id: i64, quantity: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO requisitions (item_id, section_id, quantity, status) VALUES (?1, ?2, ?3, ?4)",
            params![item_id, section_id, quantity, RequisitionStatus::Pending.to_db_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Requisition>> {
        let conn = self.get_conn()?;
        let req = conn
            .query_row(
                r#"
                SELECT id, item_id, section_id, quantity, status, remarks, created_at
                FROM requisitions WHERE id = ?1
                "#,
                params![id],
                map_requisition,
            )
            .optional()?;
        Ok(req)
    }

    /// 按状态查询（按 id 排序）
    pub fn list_by_status(&self, status: RequisitionStatus) -> RepositoryResult<Vec<Requisition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, item_id, section_id, quantity, status, remarks, created_at
            FROM requisitions WHERE status = ?1 ORDER BY id
            "#,
        )?;
        let rows = stmt
            .query_map(params![status.to_db_str()], map_requisition)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_by_status(&self, status: RequisitionStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM requisitions WHERE status = ?1",
            params![status.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 条件更新状态: 仅当当前状态为 `expected` 时生效
    ///
    /// # 返回
    /// - Ok(true): 更新成功
    /// - Ok(false): 当前状态已不是 expected（并发审批或重复审批）
    pub fn update_status_if(
        &self,
        id: i64,
        expected: RequisitionStatus,
        new_status: RequisitionStatus,
        remarks: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE requisitions SET status = ?3, remarks = ?4 WHERE id = ?1 AND status = ?2",
            params![id, expected.to_db_str(), new_status.to_db_str(), remarks],
        )?;
        Ok(rows == 1)
    }
}

fn map_requisition(row: &Row<'_>) -> SqliteResult<Requisition> {
    let raw_status: String = row.get(4)?;
    let status = RequisitionStatus::from_db_str(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown requisition status: {}", raw_status).into(),
        )
    })?;

    Ok(Requisition {
        id: row.get(0)?,
        item_id: row.get(1)?,
        section_id: row.get(2)?,
        quantity: row.get(3)?,
        status,
        remarks: row.get(5)?,
        created_at: parse_datetime_column(6, &row.get::<_, String>(6)?)?,
    })
}
