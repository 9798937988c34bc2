// ==========================================
// 车间生产管理系统 - 停机记录 API
// ==========================================
// 职责: 录入员登记本工段的机台停机
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::api::access::require_section;
use crate::api::error::ApiResult;
use crate::api::validator::validate_downtime;
use crate::config::ConfigManager;
use crate::domain::actor::Actor;
use crate::domain::downtime::DowntimeRequest;
use crate::repository::DowntimeRepository;

pub struct DowntimeApi {
    downtime_repo: Arc<DowntimeRepository>,
    config_manager: Arc<ConfigManager>,
}

impl DowntimeApi {
    pub fn new(downtime_repo: Arc<DowntimeRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            downtime_repo,
            config_manager,
        }
    }

    /// 登记停机，返回新记录 id
    pub fn record_downtime(&self, actor: &Actor, req: DowntimeRequest) -> ApiResult<i64> {
        self.record_downtime_on(actor, req, Local::now().date_naive())
    }

    pub fn record_downtime_on(
        &self,
        actor: &Actor,
        req: DowntimeRequest,
        today: NaiveDate,
    ) -> ApiResult<i64> {
        let section_id = require_section(actor)?;
        let max_hours = self.config_manager.get_downtime_max_duration_hours()?;
        let valid = validate_downtime(&req, today, max_hours)?;

        let id = self.downtime_repo.insert(
            section_id,
            &valid.machine_name,
            valid.start_time,
            valid.end_time,
            valid.remarks.as_deref(),
        )?;

        tracing::info!(
            id,
            user_id = %actor.user_id,
            section_id,
            machine = %valid.machine_name,
            "停机记录已保存"
        );
        Ok(id)
    }
}
