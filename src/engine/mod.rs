// ==========================================
// 车间生产管理系统 - 引擎层
// ==========================================
// 职责: 物料流转校验 / 数据完整性扫描 / 生产记录派生
// 红线: Engine 不拼 SQL，通过读模型 trait 读取数据
// ==========================================

pub mod flow_validator;
pub mod integrity;
pub mod production_calc;

// 重导出核心引擎
pub use flow_validator::{FlowCheckError, FlowCheckOutcome, MaterialFlowReader, MaterialFlowValidator};
pub use integrity::{IntegrityReader, IntegrityScanner, IntegrityThresholds};
pub use production_calc::{ProductionCalculator, ProductionEntry};
