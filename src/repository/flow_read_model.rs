// ==========================================
// 车间生产管理系统 - 物料流转读模型 (SQLite)
// ==========================================
// 职责: 为 MaterialFlowValidator / IntegrityScanner 提供按 (工段, 日期) 聚合的读取
// 说明: 直接借用 Connection（含 Transaction），以便在写事务内完成"读-判-写"
// ==========================================

use crate::domain::section::Section;
use crate::domain::worker::Worker;
use crate::engine::flow_validator::MaterialFlowReader;
use crate::engine::integrity::IntegrityReader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{production_repo, section_repo, worker_repo};
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteFlowReadModel - 连接级读模型
// ==========================================
pub struct SqliteFlowReadModel<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteFlowReadModel<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl MaterialFlowReader for SqliteFlowReadModel<'_> {
    fn find_section(&self, section_id: i64) -> RepositoryResult<Option<Section>> {
        section_repo::find_by_id_with(self.conn, section_id)
    }

    fn find_upstream_sections(&self, section_id: i64) -> RepositoryResult<Vec<Section>> {
        section_repo::find_upstream_with(self.conn, section_id)
    }

    fn sum_output_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
        production_repo::sum_output_material_with(self.conn, section_id, date)
    }

    fn sum_input_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
        production_repo::sum_input_material_with(self.conn, section_id, date)
    }
}

impl IntegrityReader for SqliteFlowReadModel<'_> {
    fn list_sections(&self) -> RepositoryResult<Vec<Section>> {
        section_repo::list_all_with(self.conn)
    }

    fn list_workers(&self) -> RepositoryResult<Vec<Worker>> {
        worker_repo::list_all_with(self.conn)
    }

    fn worker_ids_with_production(&self, date: NaiveDate) -> RepositoryResult<Vec<i64>> {
        production_repo::worker_ids_with_production_with(self.conn, date)
    }
}

// ==========================================
// FlowReadModelRepository - 只读快照入口
// ==========================================
/// 在一个读事务内执行闭包，扫描期间看到同一份数据快照
pub struct FlowReadModelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FlowReadModelRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn with_snapshot<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&SqliteFlowReadModel<'_>) -> RepositoryResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let value = f(&SqliteFlowReadModel::new(&tx))?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(value)
    }
}
