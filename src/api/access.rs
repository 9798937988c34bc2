// ==========================================
// 车间生产管理系统 - 操作权限检查
// ==========================================
// 管理员: 报表、审批、基础数据维护
// 录入员: 本工段的生产/考勤/停机/领料录入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::actor::Actor;
use crate::i18n::t;

/// 要求管理员身份
pub fn require_admin(actor: &Actor) -> ApiResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.user_id, role = %actor.role, "非管理员访问管理接口");
        Err(ApiError::PermissionDenied(t("error.admin_required")))
    }
}

/// 要求操作人已分配工段，返回工段 id
pub fn require_section(actor: &Actor) -> ApiResult<i64> {
    actor
        .section_id
        .ok_or_else(|| ApiError::InvalidInput(t("error.no_section")))
}
