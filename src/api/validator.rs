// ==========================================
// 车间生产管理系统 - 录入字段校验器
// ==========================================
// 职责: 录入请求的字段级校验（必填/格式/取值范围/不可补录）
// 说明: 一次收集全部问题，以 ApiError::ValidationFailed 返回
//       "今天"由调用方传入，便于测试
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db::DATE_FORMAT;
use crate::domain::attendance::AttendanceRequest;
use crate::domain::downtime::DowntimeRequest;
use crate::domain::production::ProductionEntryRequest;
use crate::domain::requisition::RequisitionRequest;
use crate::domain::types::RequisitionAction;
use crate::engine::production_calc::ProductionEntry;
use crate::i18n::{t, t_with_args};
use chrono::{NaiveDate, NaiveDateTime};

/// 停机时间的录入格式（HTML datetime-local）
pub const DOWNTIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ==========================================
// 校验结果
// ==========================================

/// 校验通过的考勤数据
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAttendance {
    pub worker_ids: Vec<i64>,
    pub date: NaiveDate,
}

/// 校验通过的停机数据
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDowntime {
    pub machine_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub remarks: Option<String>,
}

/// 校验通过的领料申请
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRequisition {
    pub item_id: i64,
    pub quantity: i64,
}

// ==========================================
// 辅助
// ==========================================

fn required(field: &str) -> String {
    t_with_args("validation.field_required", &[("field", field)])
}

fn fail_if_any(errors: Vec<String>) -> ApiResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed { errors })
    }
}

/// 解析 YYYY-MM-DD，并拒绝早于 today 的日期
fn check_entry_date(raw: &str, today: NaiveDate, errors: &mut Vec<String>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) if date < today => {
            errors.push(t("validation.backdated"));
            None
        }
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(t("validation.invalid_date"));
            None
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ==========================================
// 生产录入
// ==========================================

/// 校验生产录入
///
/// # 规则
/// - worker_id / item_id / date / actual / input_material / output_material 必填
/// - actual / input_material / output_material 非负
/// - output_material <= input_material
/// - date 为 YYYY-MM-DD 且不早于 today
pub fn validate_production(
    req: &ProductionEntryRequest,
    section_id: i64,
    today: NaiveDate,
) -> ApiResult<ProductionEntry> {
    let mut errors = Vec::new();

    if req.worker_id.is_none() {
        errors.push(required("worker_id"));
    }
    if req.item_id.is_none() {
        errors.push(required("item_id"));
    }
    if non_blank(&req.date).is_none() {
        errors.push(required("date"));
    }
    if req.actual.is_none() {
        errors.push(required("actual"));
    }
    if req.input_material.is_none() {
        errors.push(required("input_material"));
    }
    if req.output_material.is_none() {
        errors.push(required("output_material"));
    }

    if let Some(actual) = req.actual {
        if actual < 0 {
            errors.push(t_with_args("validation.negative_value", &[("field", "actual")]));
        }
    }
    if let Some(input) = req.input_material {
        if !(input >= 0.0) {
            errors.push(t_with_args(
                "validation.negative_value",
                &[("field", "input_material")],
            ));
        }
    }
    if let Some(output) = req.output_material {
        if !(output >= 0.0) {
            errors.push(t_with_args(
                "validation.negative_value",
                &[("field", "output_material")],
            ));
        }
    }
    if let (Some(input), Some(output)) = (req.input_material, req.output_material) {
        if output > input {
            errors.push(t("validation.output_exceeds_input"));
        }
    }

    let date = non_blank(&req.date).and_then(|raw| check_entry_date(raw, today, &mut errors));

    fail_if_any(errors)?;

    match (req.worker_id, req.item_id, date, req.actual, req.input_material, req.output_material) {
        (Some(worker_id), Some(item_id), Some(date), Some(actual), Some(input), Some(output)) => {
            Ok(ProductionEntry {
                worker_id,
                item_id,
                section_id,
                date,
                actual,
                input_material: input,
                output_material: output,
            })
        }
        _ => Err(ApiError::InternalError("生产录入校验状态不一致".to_string())),
    }
}

// ==========================================
// 考勤
// ==========================================

/// 校验考勤录入
///
/// # 规则
/// - 至少一名工人，且 id > 0
/// - date 必填，YYYY-MM-DD，不早于 today
pub fn validate_attendance(req: &AttendanceRequest, today: NaiveDate) -> ApiResult<ValidAttendance> {
    let mut errors = Vec::new();

    let workers = req.workers.clone().unwrap_or_default();
    if workers.is_empty() {
        errors.push(t("validation.no_workers"));
    }
    for id in workers.iter().filter(|id| **id <= 0) {
        errors.push(t_with_args(
            "validation.invalid_worker_id",
            &[("id", &id.to_string())],
        ));
    }

    let date = match non_blank(&req.date) {
        Some(raw) => check_entry_date(raw, today, &mut errors),
        None => {
            errors.push(required("date"));
            None
        }
    };

    fail_if_any(errors)?;

    let date = date.ok_or_else(|| ApiError::InternalError("考勤校验状态不一致".to_string()))?;
    Ok(ValidAttendance {
        worker_ids: workers,
        date,
    })
}

// ==========================================
// 停机
// ==========================================

fn parse_downtime_time(
    field: &str,
    value: &Option<String>,
    errors: &mut Vec<String>,
) -> Option<NaiveDateTime> {
    let Some(raw) = non_blank(value) else {
        errors.push(required(field));
        return None;
    };
    match NaiveDateTime::parse_from_str(raw, DOWNTIME_INPUT_FORMAT) {
        Ok(ts) => Some(ts),
        Err(_) => {
            errors.push(t_with_args("validation.invalid_datetime", &[("field", field)]));
            None
        }
    }
}

/// 校验停机录入
///
/// # 规则
/// - machine_name / start_time / end_time 必填
/// - 时间格式 YYYY-MM-DDTHH:MM
/// - end_time 晚于 start_time
/// - start_time 不早于 today
/// - 时长不超过 max_duration_hours
pub fn validate_downtime(
    req: &DowntimeRequest,
    today: NaiveDate,
    max_duration_hours: f64,
) -> ApiResult<ValidDowntime> {
    let mut errors = Vec::new();

    let machine_name = non_blank(&req.machine_name).map(str::to_string);
    if machine_name.is_none() {
        errors.push(required("machine_name"));
    }

    let start = parse_downtime_time("start_time", &req.start_time, &mut errors);
    let end = parse_downtime_time("end_time", &req.end_time, &mut errors);

    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.push(t("validation.end_before_start"));
        } else {
            let hours = (end - start).num_seconds() as f64 / 3600.0;
            if hours > max_duration_hours {
                errors.push(t_with_args(
                    "validation.duration_too_long",
                    &[("hours", &max_duration_hours.to_string())],
                ));
            }
        }
        if start.date() < today {
            errors.push(t("validation.start_in_past"));
        }
    }

    fail_if_any(errors)?;

    match (machine_name, start, end) {
        (Some(machine_name), Some(start_time), Some(end_time)) => Ok(ValidDowntime {
            machine_name,
            start_time,
            end_time,
            remarks: non_blank(&req.remarks).map(str::to_string),
        }),
        _ => Err(ApiError::InternalError("停机校验状态不一致".to_string())),
    }
}

// ==========================================
// 领料
// ==========================================

/// 校验领料申请: item_id / quantity 必填，quantity > 0
pub fn validate_requisition(req: &RequisitionRequest) -> ApiResult<ValidRequisition> {
    let mut errors = Vec::new();

    if req.item_id.is_none() {
        errors.push(required("item_id"));
    }
    match req.quantity {
        None => errors.push(required("quantity")),
        Some(q) if q <= 0 => errors.push(t("validation.quantity_positive")),
        Some(_) => {}
    }

    fail_if_any(errors)?;

    match (req.item_id, req.quantity) {
        (Some(item_id), Some(quantity)) => Ok(ValidRequisition { item_id, quantity }),
        _ => Err(ApiError::InternalError("领料校验状态不一致".to_string())),
    }
}

/// 解析审批动作（approve / reject）
pub fn parse_requisition_action(raw: &str) -> ApiResult<RequisitionAction> {
    RequisitionAction::parse(raw).ok_or_else(|| ApiError::ValidationFailed {
        errors: vec![t("validation.invalid_action")],
    })
}

/// 校验名称非空，返回去除首尾空白后的名称
pub fn validate_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationFailed {
            errors: vec![t("validation.name_required")],
        });
    }
    Ok(trimmed.to_string())
}
