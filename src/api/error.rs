// ==========================================
// 车间生产管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为用户友好的错误消息
// 说明: 校验类错误携带面向用户的数据；基础设施错误对用户不透明
// ==========================================

use crate::engine::flow_validator::FlowCheckError;
use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验与业务规则错误
    // ==========================================
    /// 字段校验失败（一次返回全部问题）
    #[error("数据校验失败: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("权限不足: {0}")]
    PermissionDenied(String),

    /// 物料流转校验未通过
    #[error("上游投入不足: 可用={available}kg, 申请={requested}kg")]
    InsufficientInput { available: f64, requested: f64 },

    /// 工段连接会形成环路
    #[error("工段连接成环: section_id={section_id}, next_section_id={next_section_id}")]
    TopologyCycle {
        section_id: i64,
        next_section_id: i64,
    },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（前端/CLI 按此分支）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::InsufficientInput { .. } => "INSUFFICIENT_INPUT",
            ApiError::TopologyCycle { .. } => "TOPOLOGY_CYCLE",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为用户可修正的错误（校验/权限/业务规则）
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::DatabaseTransactionError(_)
                | ApiError::InternalError(_)
                | ApiError::Other(_)
        )
    }

    /// 面向用户的本地化消息
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationFailed { errors } => {
                if errors.is_empty() {
                    t("error.validation_failed")
                } else {
                    errors.join("; ")
                }
            }
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::NotFound(entity) => t_with_args("error.not_found", &[("entity", entity)]),
            ApiError::PermissionDenied(msg) => msg.clone(),
            ApiError::InsufficientInput {
                available,
                requested,
            } => t_with_args(
                "error.insufficient_input",
                &[
                    ("available", &available.to_string()),
                    ("requested", &requested.to_string()),
                ],
            ),
            ApiError::TopologyCycle {
                section_id,
                next_section_id,
            } => t_with_args(
                "error.topology_cycle",
                &[
                    ("section", &section_id.to_string()),
                    ("next", &next_section_id.to_string()),
                ],
            ),
            ApiError::InvalidStateTransition { from, to } => {
                t_with_args("error.invalid_transition", &[("from", from), ("to", to)])
            }
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => t("error.database"),
            ApiError::InternalError(_) | ApiError::Other(_) => t("error.internal"),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::MalformedData(msg) => {
                ApiError::DatabaseError(format!("存储数据格式错误: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 FlowCheckError 转换
// ==========================================
impl From<FlowCheckError> for ApiError {
    fn from(err: FlowCheckError) -> Self {
        match err {
            FlowCheckError::SectionNotFound { section_id } => {
                ApiError::NotFound(format!("Section(id={})", section_id))
            }
            FlowCheckError::InsufficientInput {
                available,
                requested,
            } => ApiError::InsufficientInput {
                available,
                requested,
            },
            FlowCheckError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 对外错误信封
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::ValidationFailed { errors } => Some(serde_json::json!({ "errors": errors })),
            ApiError::InsufficientInput {
                available,
                requested,
            } => Some(serde_json::json!({
                "available": available,
                "requested": requested,
            })),
            ApiError::TopologyCycle {
                section_id,
                next_section_id,
            } => Some(serde_json::json!({
                "section_id": section_id,
                "next_section_id": next_section_id,
            })),
            _ => None,
        };

        Self {
            code: err.code().to_string(),
            message: err.user_message(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Requisition".to_string(),
            id: "7".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Requisition"));
                assert!(msg.contains("7"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(api_err.code(), "DATABASE_CONNECTION_ERROR");
        assert!(!api_err.is_user_error());
    }

    #[test]
    fn test_flow_check_error_conversion() {
        let api_err: ApiError = FlowCheckError::InsufficientInput {
            available: 480.0,
            requested: 480.1,
        }
        .into();

        assert_eq!(api_err.code(), "INSUFFICIENT_INPUT");
        assert_eq!(
            api_err.user_message(),
            "Insufficient input material. Available: 480kg, Requested: 480.1kg"
        );

        let api_err: ApiError = FlowCheckError::SectionNotFound { section_id: 9 }.into();
        assert!(matches!(api_err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_error_response_envelope() {
        let err = ApiError::ValidationFailed {
            errors: vec!["Field 'date' is required".to_string()],
        };
        let resp = ErrorResponse::from(&err);

        assert_eq!(resp.code, "VALIDATION_FAILED");
        assert_eq!(resp.message, "Field 'date' is required");
        assert_eq!(
            resp.details.unwrap()["errors"][0],
            serde_json::json!("Field 'date' is required")
        );
    }

    #[test]
    fn test_database_errors_are_opaque() {
        let err = ApiError::DatabaseError("no such table: production_logs".to_string());
        let resp = ErrorResponse::from(&err);
        assert!(!resp.message.contains("production_logs"));
        assert!(resp.details.is_none());
    }
}
