// ==========================================
// 车间生产管理系统 - 领料申请 API
// ==========================================
// 职责: 录入员提交领料申请；管理员审批
// 状态机: pending -> approved | rejected（终态不可再变更）
// ==========================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::access::{require_admin, require_section};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_requisition_action, validate_requisition};
use crate::domain::actor::Actor;
use crate::domain::requisition::{Requisition, RequisitionRequest};
use crate::domain::types::RequisitionStatus;
use crate::repository::{ItemRepository, RequisitionRepository};

pub struct RequisitionApi {
    requisition_repo: Arc<RequisitionRepository>,
    item_repo: Arc<ItemRepository>,
}

impl RequisitionApi {
    pub fn new(requisition_repo: Arc<RequisitionRepository>, item_repo: Arc<ItemRepository>) -> Self {
        Self {
            requisition_repo,
            item_repo,
        }
    }

    /// 提交领料申请（状态 pending），返回新 id
    pub fn submit_requisition(&self, actor: &Actor, req: RequisitionRequest) -> ApiResult<i64> {
        let section_id = require_section(actor)?;
        let valid = validate_requisition(&req)?;

        if self.item_repo.find_by_id(valid.item_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Item(id={})", valid.item_id)));
        }

        let id = self
            .requisition_repo
            .insert(valid.item_id, section_id, valid.quantity)?;

        info!(
            id,
            user_id = %actor.user_id,
            section_id,
            item_id = valid.item_id,
            quantity = valid.quantity,
            "领料申请已提交"
        );
        Ok(id)
    }

    /// 审批领料申请
    ///
    /// # 参数
    /// - action: "approve" / "reject"
    /// - remarks: 审批备注
    ///
    /// # 返回
    /// - Ok(Requisition): 审批后的申请
    /// - Err(InvalidStateTransition): 申请已不在 pending 状态
    pub fn decide_requisition(
        &self,
        actor: &Actor,
        requisition_id: i64,
        action: &str,
        remarks: Option<String>,
    ) -> ApiResult<Requisition> {
        require_admin(actor)?;
        let action = parse_requisition_action(action)?;
        let target = action.target_status();

        let current = self.find(requisition_id)?;
        if current.status != RequisitionStatus::Pending {
            return Err(ApiError::InvalidStateTransition {
                from: current.status.to_string(),
                to: target.to_string(),
            });
        }

        let remarks = remarks
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let updated = self.requisition_repo.update_status_if(
            requisition_id,
            RequisitionStatus::Pending,
            target,
            remarks,
        )?;

        if !updated {
            // 读取后被其他审批抢先
            let latest = self.find(requisition_id)?;
            warn!(requisition_id, status = %latest.status, "领料申请已被并发审批");
            return Err(ApiError::InvalidStateTransition {
                from: latest.status.to_string(),
                to: target.to_string(),
            });
        }

        info!(requisition_id, user_id = %actor.user_id, %action, "领料申请已审批");
        self.find(requisition_id)
    }

    /// 待审批申请: 管理员看全部，录入员只看本工段
    pub fn list_pending(&self, actor: &Actor) -> ApiResult<Vec<Requisition>> {
        let pending = self
            .requisition_repo
            .list_by_status(RequisitionStatus::Pending)?;

        if actor.is_admin() {
            return Ok(pending);
        }

        let section_id = require_section(actor)?;
        Ok(pending
            .into_iter()
            .filter(|r| r.section_id == section_id)
            .collect())
    }

    fn find(&self, requisition_id: i64) -> ApiResult<Requisition> {
        self.requisition_repo
            .find_by_id(requisition_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Requisition(id={})", requisition_id)))
    }
}
