// ==========================================
// 车间生产管理系统 - 工段领域模型
// ==========================================
// 工段通过 next_section_id 形成"流向"关系:
// 多个工段可以流向同一个下游工段（多对一森林）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Section - 工段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub next_section_id: Option<i64>, // 下游工段（None 表示链尾）
}

/// 若为 `section_id` 设置下游 `next_section_id`，是否会形成环
///
/// # 参数
/// - `sections`: 当前全部工段
/// - `section_id`: 待修改的工段（新建时为即将分配的 id）
/// - `next_section_id`: 新的下游工段
///
/// # 说明
/// 沿 next_section_id 从新下游向前走，若回到 section_id 即成环；
/// 走过的步数以工段总数为上限，已有数据里存在的环也不会死循环。
pub fn would_create_cycle(sections: &[Section], section_id: i64, next_section_id: i64) -> bool {
    if section_id == next_section_id {
        return true;
    }

    let mut cursor = Some(next_section_id);
    let mut steps = 0usize;
    while let Some(current) = cursor {
        if current == section_id {
            return true;
        }
        if steps > sections.len() {
            // 已有数据自身存在环
            return true;
        }
        steps += 1;
        cursor = sections
            .iter()
            .find(|s| s.id == current)
            .and_then(|s| s.next_section_id);
    }
    false
}
