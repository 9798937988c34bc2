// ==========================================
// 车间生产管理系统 - 考勤 API
// ==========================================
// 职责: 录入员批量登记本工段出勤
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::api::access::require_section;
use crate::api::error::ApiResult;
use crate::api::validator::validate_attendance;
use crate::domain::actor::Actor;
use crate::domain::attendance::AttendanceRequest;
use crate::repository::AttendanceRepository;

pub struct AttendanceApi {
    attendance_repo: Arc<AttendanceRepository>,
}

impl AttendanceApi {
    pub fn new(attendance_repo: Arc<AttendanceRepository>) -> Self {
        Self { attendance_repo }
    }

    /// 登记出勤（所选工人均记为出勤），返回写入条数
    pub fn record_attendance(&self, actor: &Actor, req: AttendanceRequest) -> ApiResult<usize> {
        self.record_attendance_on(actor, req, Local::now().date_naive())
    }

    pub fn record_attendance_on(
        &self,
        actor: &Actor,
        req: AttendanceRequest,
        today: NaiveDate,
    ) -> ApiResult<usize> {
        let section_id = require_section(actor)?;
        let valid = validate_attendance(&req, today)?;

        let count = self
            .attendance_repo
            .batch_insert(&valid.worker_ids, section_id, valid.date, true)?;

        tracing::info!(
            user_id = %actor.user_id,
            section_id,
            date = %valid.date,
            count,
            "考勤已保存"
        );
        Ok(count)
    }
}
