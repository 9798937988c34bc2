// ==========================================
// 车间生产管理系统 - 生产记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 生产记录只插入，不提供更新/删除
// ==========================================

use crate::db::{format_date, parse_date_column, parse_datetime_column};
use crate::domain::production::{NewProductionLog, ProductionLog};
use crate::domain::report::ProductionSummary;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, worker_id, item_id, section_id, date,
    target, actual, input_material, output_material, wastage,
    overtime_hours, created_at
"#;

// ==========================================
// ProductionLogRepository - 生产记录仓储
// ==========================================
pub struct ProductionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionLogRepository {
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

    // ==========================================
    // 事务
    // ==========================================

    /// 在 BEGIN IMMEDIATE 事务中执行闭包
    ///
    /// # 说明
    /// - IMMEDIATE 在读之前就拿到写锁，"先校验后插入"整体串行化，
    ///   其他连接上的并发录入会在 busy_timeout 内排队
    /// - 闭包返回 Err 时事务回滚（Transaction drop 即回滚）
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

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入生产记录，返回新记录 id
    pub fn insert(&self, log: &NewProductionLog) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, log)
    }

    /// 在给定连接/事务上插入生产记录
    pub fn insert_with(conn: &Connection, log: &NewProductionLog) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO production_logs (
                worker_id, item_id, section_id, date,
                target, actual, input_material, output_material, wastage,
                overtime_hours
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                log.worker_id,
                log.item_id,
                log.section_id,
                format_date(log.date),
                log.target,
                log.actual,
                log.input_material,
                log.output_material,
                log.wastage,
                log.overtime_hours,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductionLog>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM production_logs WHERE id = ?1", SELECT_COLUMNS);
        let log = conn
            .query_row(&sql, params![id], map_production_log)
            .optional()?;
        Ok(log)
    }

    /// 查询某工段某日的全部记录
    pub fn find_by_section_and_date(
        &self,
        section_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM production_logs WHERE section_id = ?1 AND date = ?2 ORDER BY id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![section_id, format_date(date)], map_production_log)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 查询工人最近的生产记录（附品种名称），按日期倒序
    pub fn find_recent_by_worker(
        &self,
        worker_id: i64,
        limit: u32,
    ) -> RepositoryResult<Vec<(ProductionLog, String)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                p.id, p.worker_id, p.item_id, p.section_id, p.date,
                p.target, p.actual, p.input_material, p.output_material, p.wastage,
                p.overtime_hours, p.created_at,
                i.name
            FROM production_logs p
            JOIN items i ON i.id = p.item_id
            WHERE p.worker_id = ?1
            ORDER BY p.date DESC, p.id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![worker_id, limit], |row| {
                Ok((map_production_log(row)?, row.get::<_, String>(12)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 某工段某日的产出合计 (kg)
    pub fn sum_output_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        sum_output_material_with(&conn, section_id, date)
    }

    /// 某工段某日的投入合计 (kg)
    pub fn sum_input_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        sum_input_material_with(&conn, section_id, date)
    }

    /// 某日有生产记录的工人 id（去重）
    pub fn worker_ids_with_production(&self, date: NaiveDate) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        worker_ids_with_production_with(&conn, date)
    }

    /// 按品种汇总目标/实际产量
    ///
    /// # 返回
    /// (品种名称, 目标合计, 实际合计)，按品种名称排序
    pub fn totals_by_item(&self) -> RepositoryResult<Vec<(String, i64, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.name, SUM(p.target), SUM(p.actual)
            FROM items i
            JOIN production_logs p ON p.item_id = i.id
            GROUP BY i.name
            ORDER BY i.name
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 某日生产汇总（目标/实际/损耗）
    pub fn summary_for_date(&self, date: NaiveDate) -> RepositoryResult<ProductionSummary> {
        let conn = self.get_conn()?;
        let summary = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(target), 0),
                COALESCE(SUM(actual), 0),
                COALESCE(SUM(wastage), 0.0)
            FROM production_logs
            WHERE date = ?1
            "#,
            params![format_date(date)],
            |row| {
                Ok(ProductionSummary {
                    total_target: row.get(0)?,
                    total_actual: row.get(1)?,
                    total_wastage: row.get(2)?,
                })
            },
        )?;
        Ok(summary)
    }
}

// ==========================================
// 连接级查询（供事务内读模型复用）
// ==========================================

pub(crate) fn sum_output_material_with(
    conn: &Connection,
    section_id: i64,
    date: NaiveDate,
) -> RepositoryResult<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(output_material), 0.0) FROM production_logs WHERE section_id = ?1 AND date = ?2",
        params![section_id, format_date(date)],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub(crate) fn sum_input_material_with(
    conn: &Connection,
    section_id: i64,
    date: NaiveDate,
) -> RepositoryResult<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(input_material), 0.0) FROM production_logs WHERE section_id = ?1 AND date = ?2",
        params![section_id, format_date(date)],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub(crate) fn worker_ids_with_production_with(
    conn: &Connection,
    date: NaiveDate,
) -> RepositoryResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT worker_id FROM production_logs WHERE date = ?1 ORDER BY worker_id",
    )?;
    let ids = stmt
        .query_map(params![format_date(date)], |row| row.get(0))?
        .collect::<SqliteResult<Vec<i64>>>()?;
    Ok(ids)
}

fn map_production_log(row: &Row<'_>) -> SqliteResult<ProductionLog> {
    Ok(ProductionLog {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        item_id: row.get(2)?,
        section_id: row.get(3)?,
        date: parse_date_column(4, &row.get::<_, String>(4)?)?,
        target: row.get(5)?,
        actual: row.get(6)?,
        input_material: row.get(7)?,
        output_material: row.get(8)?,
        wastage: row.get(9)?,
        overtime_hours: row.get(10)?,
        created_at: parse_datetime_column(11, &row.get::<_, String>(11)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> (Arc<Mutex<Connection>>, ProductionLogRepository) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO sections (id, name, next_section_id) VALUES (1, 'Raw Material', NULL);
            INSERT INTO workers (id, name, section_id) VALUES (1, 'W1', 1), (2, 'W2', 1);
            INSERT INTO items (id, name, unit, default_target) VALUES (1, 'Raw Cotton', 'kg', 500);
            "#,
        )
        .unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), ProductionLogRepository::new(conn))
    }

    fn new_log(worker_id: i64, date: NaiveDate, input: f64, output: f64) -> NewProductionLog {
        NewProductionLog {
            worker_id,
            item_id: 1,
            section_id: 1,
            date,
            target: 500,
            actual: 480,
            input_material: input,
            output_material: output,
            wastage: input - output,
            overtime_hours: 0.0,
        }
    }

    #[test]
    fn test_insert_and_find_by_id() {
        let (_conn, repo) = setup();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let id = repo.insert(&new_log(1, date, 500.0, 480.0)).unwrap();
        let log = repo.find_by_id(id).unwrap().unwrap();

        assert_eq!(log.worker_id, 1);
        assert_eq!(log.date, date);
        assert_eq!(log.wastage, 20.0);
    }

    #[test]
    fn test_sums_are_date_scoped() {
        let (_conn, repo) = setup();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let yesterday = today.pred_opt().unwrap();

        repo.insert(&new_log(1, today, 500.0, 480.0)).unwrap();
        repo.insert(&new_log(2, today, 100.0, 90.0)).unwrap();
        repo.insert(&new_log(1, yesterday, 999.0, 999.0)).unwrap();

        assert_eq!(repo.sum_output_material(1, today).unwrap(), 570.0);
        assert_eq!(repo.sum_input_material(1, today).unwrap(), 600.0);
        // 无记录时为 0
        assert_eq!(repo.sum_output_material(1, today.succ_opt().unwrap()).unwrap(), 0.0);
    }

    #[test]
    fn test_worker_ids_with_production_distinct() {
        let (_conn, repo) = setup();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        repo.insert(&new_log(2, today, 10.0, 9.0)).unwrap();
        repo.insert(&new_log(2, today, 10.0, 9.0)).unwrap();

        assert_eq!(repo.worker_ids_with_production(today).unwrap(), vec![2]);
    }

    #[test]
    fn test_run_immediate_rolls_back_on_error() {
        let (_conn, repo) = setup();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let result: RepositoryResult<()> = repo.run_immediate(|tx| {
            ProductionLogRepository::insert_with(tx, &new_log(1, today, 10.0, 9.0))?;
            Err(RepositoryError::InternalError("abort".to_string()))
        });

        assert!(result.is_err());
        assert!(repo.find_by_section_and_date(1, today).unwrap().is_empty());
    }
}
