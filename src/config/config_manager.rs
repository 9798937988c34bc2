// ==========================================
// 车间生产管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// 说明: 未配置或格式错误时回退到默认值（格式错误会记录 warn）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::integrity::IntegrityThresholds;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 列出已存储的全部配置（按 key 排序）
    pub fn list_config(&self) -> RepositoryResult<Vec<(String, String)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 获取生效配置的快照（JSON格式）
    ///
    /// 已知配置键未存储时以默认值填充
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let mut config_map: BTreeMap<String, String> = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        for (key, value) in self.list_config()? {
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    /// 读取数值配置，缺失或非法时回退到默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T, valid: impl Fn(&T) -> bool) -> RepositoryResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) if valid(&v) => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }

    // ===== 数据完整性 =====

    /// 物料不平衡容差 (kg)，默认 0.1
    pub fn get_flow_tolerance(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::INTEGRITY_FLOW_TOLERANCE, 0.1, |v: &f64| {
            v.is_finite() && *v >= 0.0
        })
    }

    /// 高严重度阈值 (kg)，默认 10
    pub fn get_high_severity_threshold(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(
            config_keys::INTEGRITY_HIGH_SEVERITY_THRESHOLD,
            10.0,
            |v: &f64| v.is_finite() && *v >= 0.0,
        )
    }

    /// 完整性扫描阈值
    pub fn get_integrity_thresholds(&self) -> RepositoryResult<IntegrityThresholds> {
        Ok(IntegrityThresholds {
            flow_tolerance: self.get_flow_tolerance()?,
            high_severity_threshold: self.get_high_severity_threshold()?,
        })
    }

    // ===== 生产录入 =====

    /// 班次时长（小时），默认 8
    pub fn get_shift_hours(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::PRODUCTION_SHIFT_HOURS, 8.0, |v: &f64| {
            v.is_finite() && *v > 0.0
        })
    }

    // ===== 停机 =====

    /// 单次停机最长时长（小时），默认 24
    pub fn get_downtime_max_duration_hours(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::DOWNTIME_MAX_DURATION_HOURS, 24.0, |v: &f64| {
            v.is_finite() && *v > 0.0
        })
    }

    /// 长时停机阈值（小时），默认 1
    pub fn get_downtime_long_threshold_hours(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::DOWNTIME_LONG_THRESHOLD_HOURS, 1.0, |v: &f64| {
            v.is_finite() && *v >= 0.0
        })
    }

    // ===== 报表 =====

    pub fn get_report_downtime_limit(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::REPORT_DOWNTIME_LIMIT, 20, |v: &u32| *v > 0)
    }

    pub fn get_report_worker_history_limit(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::REPORT_WORKER_HISTORY_LIMIT, 30, |v: &u32| *v > 0)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数据完整性
    pub const INTEGRITY_FLOW_TOLERANCE: &str = "integrity_flow_tolerance";
    pub const INTEGRITY_HIGH_SEVERITY_THRESHOLD: &str = "integrity_high_severity_threshold";

    // 生产录入
    pub const PRODUCTION_SHIFT_HOURS: &str = "production_shift_hours";

    // 停机
    pub const DOWNTIME_MAX_DURATION_HOURS: &str = "downtime_max_duration_hours";
    pub const DOWNTIME_LONG_THRESHOLD_HOURS: &str = "downtime_long_threshold_hours";

    // 报表
    pub const REPORT_DOWNTIME_LIMIT: &str = "report_downtime_limit";
    pub const REPORT_WORKER_HISTORY_LIMIT: &str = "report_worker_history_limit";

    /// 已知配置键及默认值
    pub const DEFAULTS: &[(&str, &str)] = &[
        (INTEGRITY_FLOW_TOLERANCE, "0.1"),
        (INTEGRITY_HIGH_SEVERITY_THRESHOLD, "10"),
        (PRODUCTION_SHIFT_HOURS, "8"),
        (DOWNTIME_MAX_DURATION_HOURS, "24"),
        (DOWNTIME_LONG_THRESHOLD_HOURS, "1"),
        (REPORT_DOWNTIME_LIMIT, "20"),
        (REPORT_WORKER_HISTORY_LIMIT, "30"),
    ];

    /// 是否为已知配置键
    pub fn is_known(key: &str) -> bool {
        DEFAULTS.iter().any(|(k, _)| *k == key)
    }
}
