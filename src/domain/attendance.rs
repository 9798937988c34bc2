// ==========================================
// 车间生产管理系统 - 考勤领域模型
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub worker_id: i64,
    pub section_id: i64,
    pub date: NaiveDate,
    pub present: bool,
    pub created_at: NaiveDateTime,
}

/// 考勤录入请求（勾选的出勤工人 + 日期）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub workers: Option<Vec<i64>>,
    pub date: Option<String>, // YYYY-MM-DD
}
