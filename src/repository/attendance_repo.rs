// ==========================================
// 车间生产管理系统 - 考勤数据仓储
// ==========================================

use crate::db::format_date;
use crate::domain::report::SectionAttendance;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct AttendanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AttendanceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入考勤（单事务，任一失败整体回滚）
    ///
    /// # 返回
    /// - Ok(count): 写入条数
    pub fn batch_insert(
        &self,
        worker_ids: &[i64],
        section_id: i64,
        date: NaiveDate,
        present: bool,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let date_str = format_date(date);
        let mut count = 0;
        for worker_id in worker_ids {
            tx.execute(
                "INSERT INTO attendance (worker_id, section_id, date, present) VALUES (?1, ?2, ?3, ?4)",
                params![worker_id, section_id, date_str, present],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 各工段出勤人次（仅统计 present=1）
    pub fn present_count_by_section(&self) -> RepositoryResult<Vec<SectionAttendance>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.name, COUNT(a.id)
            FROM sections s
            JOIN attendance a ON a.section_id = s.id
            WHERE a.present = 1
            GROUP BY s.name
            ORDER BY s.name
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SectionAttendance {
                    section: row.get(0)?,
                    present: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}
