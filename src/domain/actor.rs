// ==========================================
// 车间生产管理系统 - 操作人
// ==========================================
// 身份认证/会话不在本库范围内:
// 调用方完成登录后，把角色与所属工段以 Actor 形式传入
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
    pub section_id: Option<i64>, // 管理员通常无工段
}

impl Actor {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Admin,
            section_id: None,
        }
    }

    pub fn staff(user_id: impl Into<String>, section_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Staff,
            section_id: Some(section_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
