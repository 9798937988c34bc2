// ==========================================
// 车间生产管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口（字段校验、权限检查、事务边界）
// 调用方: CLI / 前端宿主
// ==========================================

pub mod access;
pub mod attendance_api;
pub mod downtime_api;
pub mod error;
pub mod floor_api;
pub mod production_api;
pub mod report_api;
pub mod requisition_api;
pub mod validator;

// 重导出核心类型
pub use attendance_api::AttendanceApi;
pub use downtime_api::DowntimeApi;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use floor_api::FloorApi;
pub use production_api::ProductionApi;
pub use report_api::ReportApi;
pub use requisition_api::RequisitionApi;
