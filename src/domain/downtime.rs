// ==========================================
// 车间生产管理系统 - 设备停机领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDowntime {
    pub id: i64,
    pub section_id: i64,
    pub machine_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
}

impl MachineDowntime {
    /// 停机时长（小时）
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }
}

/// 停机录入请求
///
/// 时间格式: `YYYY-MM-DDTHH:MM`（与前端 datetime-local 控件一致）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DowntimeRequest {
    pub machine_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub remarks: Option<String>,
}
