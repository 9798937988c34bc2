// ==========================================
// 车间生产管理系统 - 领料单领域模型
// ==========================================

use crate::domain::types::RequisitionStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: i64,
    pub item_id: i64,
    pub section_id: i64,
    pub quantity: i64,
    pub status: RequisitionStatus,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
}

/// 领料申请请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequisitionRequest {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
}
