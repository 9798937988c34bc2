// ==========================================
// 车间生产管理系统 - 生产录入 API
// ==========================================
// 职责: 录入员提交生产数据
// 流程: 字段校验 -> 派生 target/wastage/overtime -> (事务内) 物料流转校验 + 写入
// 红线: 物料流转校验与写入在同一 IMMEDIATE 事务内，避免并发超额占用上游投入
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::api::access::require_section;
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_production;
use crate::config::ConfigManager;
use crate::domain::actor::Actor;
use crate::domain::production::{ProductionEntryRequest, ProductionLog};
use crate::engine::{MaterialFlowValidator, ProductionCalculator};
use crate::repository::{
    ItemRepository, ProductionLogRepository, SqliteFlowReadModel, WorkerRepository,
};

// ==========================================
// ProductionApi - 生产录入 API
// ==========================================
pub struct ProductionApi {
    production_repo: Arc<ProductionLogRepository>,
    item_repo: Arc<ItemRepository>,
    worker_repo: Arc<WorkerRepository>,
    config_manager: Arc<ConfigManager>,
    flow_validator: MaterialFlowValidator,
}

impl ProductionApi {
    pub fn new(
        production_repo: Arc<ProductionLogRepository>,
        item_repo: Arc<ItemRepository>,
        worker_repo: Arc<WorkerRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            production_repo,
            item_repo,
            worker_repo,
            config_manager,
            flow_validator: MaterialFlowValidator::new(),
        }
    }

    /// 提交生产数据（以本地日期为"今天"）
    ///
    /// # 返回
    /// - Ok(i64): 新记录 id
    /// - Err(ValidationFailed): 字段校验失败
    /// - Err(InsufficientInput): 上游投入不足
    /// - Err(NotFound): 工段/工人/品种不存在
    pub fn submit_entry(&self, actor: &Actor, req: ProductionEntryRequest) -> ApiResult<i64> {
        self.submit_entry_on(actor, req, Local::now().date_naive())
    }

    /// 提交生产数据（显式指定"今天"）
    pub fn submit_entry_on(
        &self,
        actor: &Actor,
        req: ProductionEntryRequest,
        today: NaiveDate,
    ) -> ApiResult<i64> {
        let section_id = require_section(actor)?;
        let entry = validate_production(&req, section_id, today)?;

        if self.worker_repo.find_by_id(entry.worker_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Worker(id={})", entry.worker_id)));
        }
        let item = self
            .item_repo
            .find_by_id(entry.item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Item(id={})", entry.item_id)))?;

        let calculator = ProductionCalculator::new(self.config_manager.get_shift_hours()?);
        let new_log = calculator.build(&entry, &item);

        let id = self.production_repo.run_immediate(|tx| -> ApiResult<i64> {
            let reader = SqliteFlowReadModel::new(tx);
            self.flow_validator.validate_flow(
                &reader,
                section_id,
                new_log.output_material,
                new_log.date,
            )?;
            Ok(ProductionLogRepository::insert_with(tx, &new_log)?)
        })?;

        info!(
            id,
            user_id = %actor.user_id,
            section_id,
            worker_id = new_log.worker_id,
            date = %new_log.date,
            output_material = new_log.output_material,
            "生产数据已保存"
        );
        Ok(id)
    }

    /// 查询生产记录
    pub fn get_entry(&self, id: i64) -> ApiResult<ProductionLog> {
        self.production_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ProductionLog(id={})", id)))
    }

    /// 本工段某日的生产记录
    pub fn list_section_entries(&self, actor: &Actor, date: NaiveDate) -> ApiResult<Vec<ProductionLog>> {
        let section_id = require_section(actor)?;
        Ok(self.production_repo.find_by_section_and_date(section_id, date)?)
    }
}
