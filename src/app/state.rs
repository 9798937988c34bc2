// ==========================================
// 车间生产管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AttendanceApi, DowntimeApi, FloorApi, ProductionApi, ReportApi, RequisitionApi,
};
use crate::config::ConfigManager;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection, warn_on_schema_mismatch};
use crate::repository::{
    AttendanceRepository, DowntimeRepository, FlowReadModelRepository, ItemRepository,
    ProductionLogRepository, RequisitionRepository, SectionRepository, WorkerRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHOPFLOOR_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生产录入API
    pub production_api: Arc<ProductionApi>,

    /// 考勤API
    pub attendance_api: Arc<AttendanceApi>,

    /// 停机记录API
    pub downtime_api: Arc<DowntimeApi>,

    /// 领料申请API
    pub requisition_api: Arc<RequisitionApi>,

    /// 管理报表API
    pub report_api: Arc<ReportApi>,

    /// 车间基础数据API
    pub floor_api: Arc<FloorApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 打开数据库文件并装配全部 API
    ///
    /// # 说明
    /// 建表幂等；schema_version 不一致时只告警
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| anyhow::anyhow!("无法打开数据库 {}: {}", db_path, e))?;
        init_schema(&conn)?;
        warn_on_schema_mismatch(&conn);

        Self::from_connection(db_path, conn)
    }

    /// 从已打开的连接装配（测试可传入内存库）
    pub fn from_connection(db_path: String, conn: Connection) -> anyhow::Result<Self> {
        configure_sqlite_connection(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let section_repo = Arc::new(SectionRepository::new(conn.clone()));
        let worker_repo = Arc::new(WorkerRepository::new(conn.clone()));
        let item_repo = Arc::new(ItemRepository::new(conn.clone()));
        let production_repo = Arc::new(ProductionLogRepository::new(conn.clone()));
        let attendance_repo = Arc::new(AttendanceRepository::new(conn.clone()));
        let downtime_repo = Arc::new(DowntimeRepository::new(conn.clone()));
        let requisition_repo = Arc::new(RequisitionRepository::new(conn.clone()));
        let flow_read_model = Arc::new(FlowReadModelRepository::new(conn.clone()));

        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        // ==========================================
        // 初始化API层
        // ==========================================
        let production_api = Arc::new(ProductionApi::new(
            production_repo.clone(),
            item_repo.clone(),
            worker_repo.clone(),
            config_manager.clone(),
        ));
        let attendance_api = Arc::new(AttendanceApi::new(attendance_repo.clone()));
        let downtime_api = Arc::new(DowntimeApi::new(
            downtime_repo.clone(),
            config_manager.clone(),
        ));
        let requisition_api = Arc::new(RequisitionApi::new(
            requisition_repo.clone(),
            item_repo.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            production_repo,
            attendance_repo,
            downtime_repo,
            worker_repo.clone(),
            section_repo.clone(),
            requisition_repo,
            flow_read_model,
            config_manager.clone(),
        ));
        let floor_api = Arc::new(FloorApi::new(section_repo, worker_repo, item_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            production_api,
            attendance_api,
            downtime_api,
            requisition_api,
            report_api,
            floor_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHOPFLOOR_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shopfloor.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("shopfloor-mis-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("shopfloor-mis");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shopfloor.db");
        }
    }

    path.to_string_lossy().to_string()
}
