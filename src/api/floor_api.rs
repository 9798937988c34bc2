// ==========================================
// 车间生产管理系统 - 车间基础数据 API
// ==========================================
// 职责: 录入员首页数据；管理员维护工段/工人/品种
// 红线: 工段下游连接不得成环（含自环）
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::access::require_admin;
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_name;
use crate::domain::actor::Actor;
use crate::domain::report::StaffOverview;
use crate::domain::section::would_create_cycle;
use crate::repository::section_repo::{list_all_with, update_next_section_with};
use crate::repository::{ItemRepository, SectionRepository, WorkerRepository};

pub struct FloorApi {
    section_repo: Arc<SectionRepository>,
    worker_repo: Arc<WorkerRepository>,
    item_repo: Arc<ItemRepository>,
}

impl FloorApi {
    pub fn new(
        section_repo: Arc<SectionRepository>,
        worker_repo: Arc<WorkerRepository>,
        item_repo: Arc<ItemRepository>,
    ) -> Self {
        Self {
            section_repo,
            worker_repo,
            item_repo,
        }
    }

    /// 录入员首页: 本工段、本工段工人、全部品种
    pub fn staff_overview(&self, actor: &Actor) -> ApiResult<StaffOverview> {
        let (section, workers) = match actor.section_id {
            Some(section_id) => (
                self.section_repo.find_by_id(section_id)?,
                self.worker_repo.list_by_section(section_id)?,
            ),
            None => (None, Vec::new()),
        };

        Ok(StaffOverview {
            section,
            workers,
            items: self.item_repo.list_all()?,
        })
    }

    // ==========================================
    // 管理员维护
    // ==========================================

    /// 新建工段，可同时指定下游
    pub fn create_section(
        &self,
        actor: &Actor,
        name: &str,
        next_section_id: Option<i64>,
    ) -> ApiResult<i64> {
        require_admin(actor)?;
        let name = validate_name(name)?;

        // 新工段没有上游指向它，下游只需存在即可
        if let Some(next_id) = next_section_id {
            self.ensure_section_exists(next_id)?;
        }

        let id = self.section_repo.create(&name, next_section_id)?;
        info!(id, name = %name, ?next_section_id, "工段已创建");
        Ok(id)
    }

    /// 修改工段下游（None 表示设为链尾）
    ///
    /// 拓扑读取、成环判断与更新在同一 IMMEDIATE 事务内，
    /// 两个管理员并发互连时后到者会看到先到者的连接
    pub fn link_section(
        &self,
        actor: &Actor,
        section_id: i64,
        next_section_id: Option<i64>,
    ) -> ApiResult<()> {
        require_admin(actor)?;

        self.section_repo.run_immediate(|tx| -> ApiResult<()> {
            let sections = list_all_with(tx)?;
            let exists = |id: i64| sections.iter().any(|s| s.id == id);

            if !exists(section_id) {
                return Err(ApiError::NotFound(format!("Section(id={})", section_id)));
            }
            if let Some(next_id) = next_section_id {
                if !exists(next_id) {
                    return Err(ApiError::NotFound(format!("Section(id={})", next_id)));
                }
                if would_create_cycle(&sections, section_id, next_id) {
                    return Err(ApiError::TopologyCycle {
                        section_id,
                        next_section_id: next_id,
                    });
                }
            }

            Ok(update_next_section_with(tx, section_id, next_section_id)?)
        })?;

        info!(section_id, ?next_section_id, "工段下游已更新");
        Ok(())
    }

    /// 新建工人
    pub fn create_worker(
        &self,
        actor: &Actor,
        name: &str,
        section_id: Option<i64>,
    ) -> ApiResult<i64> {
        require_admin(actor)?;
        let name = validate_name(name)?;
        if let Some(section_id) = section_id {
            self.ensure_section_exists(section_id)?;
        }

        let id = self.worker_repo.create(&name, section_id)?;
        info!(id, name = %name, ?section_id, "工人已创建");
        Ok(id)
    }

    /// 新建物料品种
    pub fn create_item(
        &self,
        actor: &Actor,
        name: &str,
        unit: &str,
        default_target: i64,
    ) -> ApiResult<i64> {
        require_admin(actor)?;
        let name = validate_name(name)?;
        let unit = validate_name(unit)?;
        if default_target < 0 {
            return Err(ApiError::ValidationFailed {
                errors: vec![crate::i18n::t_with_args(
                    "validation.negative_value",
                    &[("field", "default_target")],
                )],
            });
        }

        let id = self.item_repo.create(&name, &unit, default_target)?;
        info!(id, name = %name, default_target, "品种已创建");
        Ok(id)
    }

    fn ensure_section_exists(&self, section_id: i64) -> ApiResult<()> {
        match self.section_repo.find_by_id(section_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("Section(id={})", section_id))),
        }
    }
}
