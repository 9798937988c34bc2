// ==========================================
// 车间生产管理系统 - 设备停机数据仓储
// ==========================================

use crate::db::{format_datetime, parse_datetime_column};
use crate::domain::downtime::MachineDowntime;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct DowntimeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DowntimeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入停机记录，返回新 id
    pub fn insert(
        &self,
        section_id: i64,
        machine_name: &str,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        remarks: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machine_downtime (section_id, machine_name, start_time, end_time, remarks)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                section_id,
                machine_name,
                format_datetime(start_time),
                format_datetime(end_time),
                remarks,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 最近的停机记录（按录入时间倒序）
    pub fn list_recent(&self, limit: u32) -> RepositoryResult<Vec<MachineDowntime>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, section_id, machine_name, start_time, end_time, remarks, created_at
            FROM machine_downtime
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(MachineDowntime {
                    id: row.get(0)?,
                    section_id: row.get(1)?,
                    machine_name: row.get(2)?,
                    start_time: parse_datetime_column(3, &row.get::<_, String>(3)?)?,
                    end_time: parse_datetime_column(4, &row.get::<_, String>(4)?)?,
                    remarks: row.get(5)?,
                    created_at: parse_datetime_column(6, &row.get::<_, String>(6)?)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}
