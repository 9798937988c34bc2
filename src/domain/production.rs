// ==========================================
// 车间生产管理系统 - 生产记录领域模型
// ==========================================
// 生产记录一经写入不可修改（无更新/删除路径）
// wastage / overtime_hours / target 在写入时派生
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionLog - 生产记录（已持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLog {
    pub id: i64,
    pub worker_id: i64,
    pub item_id: i64,
    pub section_id: i64,
    pub date: NaiveDate,

    // ===== 产量 =====
    pub target: i64,
    pub actual: i64,

    // ===== 物料 (kg) =====
    pub input_material: f64,  // 投入
    pub output_material: f64, // 产出
    pub wastage: f64,         // = input - output

    pub overtime_hours: f64,
    pub created_at: NaiveDateTime,
}

// ==========================================
// NewProductionLog - 待写入的生产记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductionLog {
    pub worker_id: i64,
    pub item_id: i64,
    pub section_id: i64,
    pub date: NaiveDate,
    pub target: i64,
    pub actual: i64,
    pub input_material: f64,
    pub output_material: f64,
    pub wastage: f64,
    pub overtime_hours: f64,
}

// ==========================================
// ProductionEntryRequest - 生产录入请求
// ==========================================
// 字段均为可选: 必填校验由 api::validator 负责，
// 以便一次返回全部缺失字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionEntryRequest {
    pub worker_id: Option<i64>,
    pub item_id: Option<i64>,
    pub date: Option<String>, // YYYY-MM-DD
    pub actual: Option<i64>,
    pub input_material: Option<f64>,
    pub output_material: Option<f64>,
}
