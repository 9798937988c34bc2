// ==========================================
// 车间生产管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 车间数据录入 + 管理报表
// 核心: 工段物料流转校验 / 数据完整性扫描
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::types::{FindingKind, RequisitionAction, RequisitionStatus, Severity, UserRole};

pub use domain::{
    Actor, Attendance, IntegrityFinding, IntegrityReport, Item, MachineDowntime, ProductionLog,
    Requisition, Section, Worker,
};

pub use engine::{FlowCheckError, FlowCheckOutcome, IntegrityScanner, MaterialFlowValidator};

pub use api::{ApiError, ApiResult, ProductionApi, ReportApi, RequisitionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车间生产管理系统";
