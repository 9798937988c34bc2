// ==========================================
// 车间生产管理系统 - 工人与物料品种
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Worker - 工人
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub section_id: Option<i64>, // 所属工段
    pub created_at: NaiveDateTime,
}

// ==========================================
// Item - 物料品种
// ==========================================
// default_target 用于生产记录自动填充目标产量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub default_target: i64,
}
