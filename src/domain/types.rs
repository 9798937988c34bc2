// ==========================================
// 车间生产管理系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 问题严重度 (Severity)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

// ==========================================
// 完整性问题类型 (Finding Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MaterialFlow, // 工段间物料不平衡
    MissingData,  // 工人当日无生产记录
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::MaterialFlow => write!(f, "material_flow"),
            FindingKind::MissingData => write!(f, "missing_data"),
        }
    }
}

// ==========================================
// 领料单状态 (Requisition Status)
// ==========================================
// 状态机: pending -> approved | rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequisitionStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequisitionStatus {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RequisitionStatus::Pending => "pending",
            RequisitionStatus::Approved => "approved",
            RequisitionStatus::Rejected => "rejected",
        }
    }

    /// 从数据库字符串解析（未知值返回 None）
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(RequisitionStatus::Pending),
            "approved" => Some(RequisitionStatus::Approved),
            "rejected" => Some(RequisitionStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 领料单审批动作 (Requisition Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequisitionAction {
    Approve,
    Reject,
}

impl RequisitionAction {
    /// 解析审批动作字符串（"approve" / "reject"）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Some(RequisitionAction::Approve),
            "reject" => Some(RequisitionAction::Reject),
            _ => None,
        }
    }

    /// 审批后的目标状态
    pub fn target_status(&self) -> RequisitionStatus {
        match self {
            RequisitionAction::Approve => RequisitionStatus::Approved,
            RequisitionAction::Reject => RequisitionStatus::Rejected,
        }
    }
}

impl fmt::Display for RequisitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequisitionAction::Approve => write!(f, "approve"),
            RequisitionAction::Reject => write!(f, "reject"),
        }
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin, // 管理员: 报表 + 审批 + 基础数据维护
    Staff, // 工段录入员
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Staff => write!(f, "staff"),
        }
    }
}
