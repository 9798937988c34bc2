// ==========================================
// 车间生产管理系统 - 管理报表 API
// ==========================================
// 职责: 管理员报表（产量、出勤、停机、工人历史、物料流转）与数据完整性扫描
// 权限: 全部接口仅管理员可用
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

use crate::api::access::require_admin;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::actor::Actor;
use crate::domain::integrity::IntegrityReport;
use crate::domain::report::{
    AdminSummary, DowntimeRow, MaterialFlowRow, ProductionByItem, SectionAttendance,
    WorkerHistoryRow,
};
use crate::domain::types::RequisitionStatus;
use crate::engine::IntegrityScanner;
use crate::repository::{
    AttendanceRepository, DowntimeRepository, FlowReadModelRepository, ProductionLogRepository,
    RequisitionRepository, SectionRepository, WorkerRepository,
};

/// 报表中的时间显示格式
const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ==========================================
// ReportApi - 管理报表 API
// ==========================================
pub struct ReportApi {
    production_repo: Arc<ProductionLogRepository>,
    attendance_repo: Arc<AttendanceRepository>,
    downtime_repo: Arc<DowntimeRepository>,
    worker_repo: Arc<WorkerRepository>,
    section_repo: Arc<SectionRepository>,
    requisition_repo: Arc<RequisitionRepository>,
    flow_read_model: Arc<FlowReadModelRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ReportApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        production_repo: Arc<ProductionLogRepository>,
        attendance_repo: Arc<AttendanceRepository>,
        downtime_repo: Arc<DowntimeRepository>,
        worker_repo: Arc<WorkerRepository>,
        section_repo: Arc<SectionRepository>,
        requisition_repo: Arc<RequisitionRepository>,
        flow_read_model: Arc<FlowReadModelRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            production_repo,
            attendance_repo,
            downtime_repo,
            worker_repo,
            section_repo,
            requisition_repo,
            flow_read_model,
            config_manager,
        }
    }

    fn scanner(&self) -> ApiResult<IntegrityScanner> {
        Ok(IntegrityScanner::new(
            self.config_manager.get_integrity_thresholds()?,
        ))
    }

    // ==========================================
    // 图表类报表
    // ==========================================

    /// 按品种汇总的目标/实际产量（全部日期）
    pub fn production_by_item(&self, actor: &Actor) -> ApiResult<ProductionByItem> {
        require_admin(actor)?;

        let mut report = ProductionByItem::default();
        for (name, target, actual) in self.production_repo.totals_by_item()? {
            report.labels.push(name);
            report.targets.push(target);
            report.actuals.push(actual);
        }
        Ok(report)
    }

    /// 各工段出勤人次
    pub fn attendance_by_section(&self, actor: &Actor) -> ApiResult<Vec<SectionAttendance>> {
        require_admin(actor)?;
        Ok(self.attendance_repo.present_count_by_section()?)
    }

    /// 最近停机记录（条数由 report_downtime_limit 配置）
    pub fn recent_downtime(&self, actor: &Actor) -> ApiResult<Vec<DowntimeRow>> {
        require_admin(actor)?;

        let limit = self.config_manager.get_report_downtime_limit()?;
        let long_threshold = self.config_manager.get_downtime_long_threshold_hours()?;

        let rows = self
            .downtime_repo
            .list_recent(limit)?
            .into_iter()
            .map(|d| {
                let hours = d.duration_hours();
                DowntimeRow {
                    machine: d.machine_name,
                    start_time: d.start_time.format(DISPLAY_DATETIME_FORMAT).to_string(),
                    end_time: d.end_time.format(DISPLAY_DATETIME_FORMAT).to_string(),
                    duration_hours: round_to(hours, 2),
                    remarks: d.remarks,
                    is_long: hours > long_threshold,
                }
            })
            .collect();
        Ok(rows)
    }

    /// 工人历史产量与效率（efficiency = actual / target * 100）
    pub fn worker_history(&self, actor: &Actor, worker_id: i64) -> ApiResult<Vec<WorkerHistoryRow>> {
        require_admin(actor)?;

        if self.worker_repo.find_by_id(worker_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Worker(id={})", worker_id)));
        }

        let limit = self.config_manager.get_report_worker_history_limit()?;
        let rows = self
            .production_repo
            .find_recent_by_worker(worker_id, limit)?
            .into_iter()
            .map(|(log, item_name)| {
                let efficiency = if log.target > 0 {
                    round_to(log.actual as f64 / log.target as f64 * 100.0, 1)
                } else {
                    0.0
                };
                WorkerHistoryRow {
                    date: log.date,
                    item_name,
                    target: log.target,
                    actual: log.actual,
                    efficiency,
                }
            })
            .collect();
        Ok(rows)
    }

    // ==========================================
    // 物料流转 / 数据完整性
    // ==========================================

    /// 当日物料流转报表
    pub fn material_flow_report(&self, actor: &Actor) -> ApiResult<Vec<MaterialFlowRow>> {
        self.material_flow_report_on(actor, Local::now().date_naive())
    }

    pub fn material_flow_report_on(
        &self,
        actor: &Actor,
        date: NaiveDate,
    ) -> ApiResult<Vec<MaterialFlowRow>> {
        require_admin(actor)?;

        let scanner = self.scanner()?;
        let balances = self
            .flow_read_model
            .with_snapshot(|reader| scanner.section_balances(reader, date))?;

        Ok(balances
            .into_iter()
            .map(|b| MaterialFlowRow {
                has_issue: scanner.has_issue(b.discrepancy),
                from_section: b.from_section,
                to_section: b.to_section,
                output: b.output,
                input: b.input,
                discrepancy: b.discrepancy,
            })
            .collect())
    }

    /// 数据完整性扫描（"今天"取本地日期）
    pub fn check_data_integrity(&self, actor: &Actor) -> ApiResult<IntegrityReport> {
        self.check_data_integrity_on(actor, Local::now().date_naive())
    }

    pub fn check_data_integrity_on(&self, actor: &Actor, today: NaiveDate) -> ApiResult<IntegrityReport> {
        require_admin(actor)?;

        let scanner = self.scanner()?;
        let findings = self
            .flow_read_model
            .with_snapshot(|reader| scanner.scan(reader, today))?;

        let report = IntegrityReport {
            scan_id: Uuid::new_v4().to_string(),
            scan_date: today,
            generated_at: Local::now().naive_local(),
            findings,
        };

        info!(
            scan_id = %report.scan_id,
            user_id = %actor.user_id,
            findings = report.findings.len(),
            max_severity = ?report.max_severity(),
            "数据完整性扫描已完成"
        );
        Ok(report)
    }

    // ==========================================
    // 首页汇总
    // ==========================================

    pub fn admin_summary(&self, actor: &Actor) -> ApiResult<AdminSummary> {
        self.admin_summary_on(actor, Local::now().date_naive())
    }

    pub fn admin_summary_on(&self, actor: &Actor, today: NaiveDate) -> ApiResult<AdminSummary> {
        require_admin(actor)?;

        let pending_reqs = self
            .requisition_repo
            .list_by_status(RequisitionStatus::Pending)?;

        Ok(AdminSummary {
            total_workers: self.worker_repo.count()?,
            total_sections: self.section_repo.count()?,
            pending_requisitions: pending_reqs.len() as i64,
            production_summary: self.production_repo.summary_for_date(today)?,
            pending_reqs,
        })
    }
}
