// ==========================================
// 车间生产管理系统 - 管理报表数据
// ==========================================
// 图表类报表的聚合结果，供前端直接渲染
// ==========================================

use crate::domain::{Item, Requisition, Section, Worker};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 按品种汇总的目标/实际产量（柱状图数据）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionByItem {
    pub labels: Vec<String>,
    pub targets: Vec<i64>,
    pub actuals: Vec<i64>,
}

/// 各工段出勤人次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAttendance {
    pub section: String,
    pub present: i64,
}

/// 停机记录行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeRow {
    pub machine: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64, // 保留两位小数
    pub remarks: Option<String>,
    pub is_long: bool,
}

/// 工人历史产量行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHistoryRow {
    pub date: NaiveDate,
    pub item_name: String,
    pub target: i64,
    pub actual: i64,
    pub efficiency: f64, // 百分比，保留一位小数
}

/// 物料流转报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialFlowRow {
    pub from_section: String,
    pub to_section: String,
    pub output: f64,
    pub input: f64,
    pub discrepancy: f64,
    pub has_issue: bool,
}

/// 当日生产汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummary {
    pub total_target: i64,
    pub total_actual: i64,
    pub total_wastage: f64,
}

/// 管理员首页汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_workers: i64,
    pub total_sections: i64,
    pub pending_requisitions: i64,
    pub production_summary: ProductionSummary,
    pub pending_reqs: Vec<Requisition>,
}

/// 录入员首页数据: 本工段 + 工段工人 + 全部品种
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffOverview {
    pub section: Option<Section>,
    pub workers: Vec<Worker>,
    pub items: Vec<Item>,
}
