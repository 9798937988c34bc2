// ==========================================
// 车间生产管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod actor;
pub mod attendance;
pub mod downtime;
pub mod integrity;
pub mod production;
pub mod report;
pub mod requisition;
pub mod section;
pub mod types;
pub mod worker;

// 重导出核心类型
pub use actor::Actor;
pub use attendance::{Attendance, AttendanceRequest};
pub use downtime::{DowntimeRequest, MachineDowntime};
pub use integrity::{IntegrityFinding, IntegrityReport, SectionBalance};
pub use production::{NewProductionLog, ProductionEntryRequest, ProductionLog};
pub use report::{
    AdminSummary, DowntimeRow, MaterialFlowRow, ProductionByItem, ProductionSummary,
    SectionAttendance, StaffOverview, WorkerHistoryRow,
};
pub use requisition::{Requisition, RequisitionRequest};
pub use section::Section;
pub use types::{FindingKind, RequisitionAction, RequisitionStatus, Severity, UserRole};
pub use worker::{Item, Worker};
