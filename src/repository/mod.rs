// ==========================================
// 车间生产管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod attendance_repo;
pub mod downtime_repo;
pub mod error;
pub mod flow_read_model;
pub mod item_repo;
pub mod production_repo;
pub mod requisition_repo;
pub mod section_repo;
pub mod worker_repo;

// 重导出核心仓储
pub use attendance_repo::AttendanceRepository;
pub use downtime_repo::DowntimeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use flow_read_model::{FlowReadModelRepository, SqliteFlowReadModel};
pub use item_repo::ItemRepository;
pub use production_repo::ProductionLogRepository;
pub use requisition_repo::RequisitionRepository;
pub use section_repo::SectionRepository;
pub use worker_repo::WorkerRepository;
