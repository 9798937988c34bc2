// ==========================================
// 车间生产管理系统 - 物料流转校验引擎
// ==========================================
// 职责: 生产录入写入前的物料守恒校验
// 口径: 新记录的产出 <= 当日上游全部来源的产出合计 - 本工段当日已投入
// 红线: Engine 不拼 SQL，通过 MaterialFlowReader 读取读模型
// ==========================================

use crate::domain::section::Section;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// MaterialFlowReader - 物料流转读模型
// ==========================================
/// 按 (工段, 日期) 聚合的投入/产出读模型
///
/// 生产录入时由事务内的连接实现，保证"读-判-写"在同一事务内
pub trait MaterialFlowReader {
    /// 按 id 查询工段
    fn find_section(&self, section_id: i64) -> RepositoryResult<Option<Section>>;

    /// 查询 next_section_id 指向该工段的上游工段
    fn find_upstream_sections(&self, section_id: i64) -> RepositoryResult<Vec<Section>>;

    /// 工段当日产出合计
    fn sum_output_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64>;

    /// 工段当日投入合计
    fn sum_input_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64>;
}

// ==========================================
// 校验结果
// ==========================================

/// 校验通过的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowCheckOutcome {
    /// 链头工段（无上游），不受投入约束
    ChainHead,
    /// 上游投入足以覆盖本次产出
    Covered {
        upstream_count: usize,
        total_available_input: f64,
        already_consumed: f64,
        remaining: f64,
    },
}

/// 校验失败
#[derive(Error, Debug)]
pub enum FlowCheckError {
    #[error("工段不存在: section_id={section_id}")]
    SectionNotFound { section_id: i64 },

    /// available 为剩余可用投入（上游产出合计 - 已投入）
    #[error("上游投入不足: 可用={available}kg, 申请={requested}kg")]
    InsufficientInput { available: f64, requested: f64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ==========================================
// MaterialFlowValidator - 物料流转校验器
// ==========================================
pub struct MaterialFlowValidator {
    // 无状态引擎，读模型由调用方传入
}

impl MaterialFlowValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验工段某日的候选产出是否可被上游投入覆盖
    ///
    /// # 参数
    /// - `reader`: 读模型
    /// - `section_id`: 录入工段
    /// - `proposed_output`: 候选产出 (kg，非负)
    /// - `entry_date`: 录入日期（按日口径，不看时刻）
    ///
    /// # 返回
    /// - Ok(FlowCheckOutcome): 校验通过
    /// - Err(SectionNotFound): 工段不存在
    /// - Err(InsufficientInput): 剩余投入不足
    /// - Err(Repository): 读模型故障
    ///
    /// # 说明
    /// 纯读取 + 计算，无副作用；无写入时重复调用结果一致
    pub fn validate_flow<R: MaterialFlowReader + ?Sized>(
        &self,
        reader: &R,
        section_id: i64,
        proposed_output: f64,
        entry_date: NaiveDate,
    ) -> Result<FlowCheckOutcome, FlowCheckError> {
        // 1. 工段必须存在
        if reader.find_section(section_id)?.is_none() {
            return Err(FlowCheckError::SectionNotFound { section_id });
        }

        // 2. 上游来源（可能有多个）
        let upstream = reader.find_upstream_sections(section_id)?;
        if upstream.is_empty() {
            tracing::debug!(section_id, "链头工段，跳过投入约束");
            return Ok(FlowCheckOutcome::ChainHead);
        }

        // 3. 全部上游当日产出合计
        let mut total_available_input = 0.0;
        for source in &upstream {
            total_available_input += reader.sum_output_material(source.id, entry_date)?;
        }

        // 4. 本工段当日已投入
        let already_consumed = reader.sum_input_material(section_id, entry_date)?;

        // 5. 剩余可用
        let remaining = total_available_input - already_consumed;
        if proposed_output > remaining {
            tracing::info!(
                section_id,
                %entry_date,
                total_available_input,
                already_consumed,
                remaining,
                proposed_output,
                "物料流转校验未通过"
            );
            return Err(FlowCheckError::InsufficientInput {
                available: remaining,
                requested: proposed_output,
            });
        }

        Ok(FlowCheckOutcome::Covered {
            upstream_count: upstream.len(),
            total_available_input,
            already_consumed,
            remaining,
        })
    }
}

impl Default for MaterialFlowValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // ==========================================
    // 内存读模型
    // ==========================================
    #[derive(Default)]
    struct InMemoryFlow {
        sections: Vec<Section>,
        output: HashMap<(i64, NaiveDate), f64>,
        input: HashMap<(i64, NaiveDate), f64>,
    }

    impl InMemoryFlow {
        fn section(mut self, id: i64, next: Option<i64>) -> Self {
            self.sections.push(Section {
                id,
                name: format!("S{}", id),
                next_section_id: next,
            });
            self
        }

        fn output(mut self, id: i64, date: NaiveDate, qty: f64) -> Self {
            *self.output.entry((id, date)).or_insert(0.0) += qty;
            self
        }

        fn input(mut self, id: i64, date: NaiveDate, qty: f64) -> Self {
            *self.input.entry((id, date)).or_insert(0.0) += qty;
            self
        }
    }

    impl MaterialFlowReader for InMemoryFlow {
        fn find_section(&self, section_id: i64) -> RepositoryResult<Option<Section>> {
            Ok(self.sections.iter().find(|s| s.id == section_id).cloned())
        }

        fn find_upstream_sections(&self, section_id: i64) -> RepositoryResult<Vec<Section>> {
            Ok(self
                .sections
                .iter()
                .filter(|s| s.next_section_id == Some(section_id))
                .cloned()
                .collect())
        }

        fn sum_output_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
            Ok(self.output.get(&(section_id, date)).copied().unwrap_or(0.0))
        }

        fn sum_input_material(&self, section_id: i64, date: NaiveDate) -> RepositoryResult<f64> {
            Ok(self.input.get(&(section_id, date)).copied().unwrap_or(0.0))
        }
    }

    struct FailingReader;

    impl MaterialFlowReader for FailingReader {
        fn find_section(&self, _section_id: i64) -> RepositoryResult<Option<Section>> {
            Err(RepositoryError::DatabaseConnectionError("down".to_string()))
        }
        fn find_upstream_sections(&self, _section_id: i64) -> RepositoryResult<Vec<Section>> {
            unreachable!()
        }
        fn sum_output_material(&self, _s: i64, _d: NaiveDate) -> RepositoryResult<f64> {
            unreachable!()
        }
        fn sum_input_material(&self, _s: i64, _d: NaiveDate) -> RepositoryResult<f64> {
            unreachable!()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_chain_head_always_passes() {
        let reader = InMemoryFlow::default().section(1, Some(2)).section(2, None);
        let validator = MaterialFlowValidator::new();

        for qty in [0.0, 1.0, 480.0, 1.0e9] {
            let outcome = validator.validate_flow(&reader, 1, qty, day()).unwrap();
            assert_eq!(outcome, FlowCheckOutcome::ChainHead);
        }
    }

    #[test]
    fn test_single_upstream_boundary() {
        let reader = InMemoryFlow::default()
            .section(1, Some(2))
            .section(2, None)
            .output(1, day(), 480.0);
        let validator = MaterialFlowValidator::new();

        // 恰好等于可用量: 通过
        assert!(validator.validate_flow(&reader, 2, 480.0, day()).is_ok());

        // 超出 0.1: 失败，携带可用量与申请量
        match validator.validate_flow(&reader, 2, 480.1, day()) {
            Err(FlowCheckError::InsufficientInput { available, requested }) => {
                assert_eq!(available, 480.0);
                assert_eq!(requested, 480.1);
            }
            other => panic!("Expected InsufficientInput, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_upstream_sources_are_summed() {
        let reader = InMemoryFlow::default()
            .section(1, Some(3))
            .section(2, Some(3))
            .section(3, None)
            .output(1, day(), 350.0)
            .output(2, day(), 250.0)
            .input(3, day(), 100.0);
        let validator = MaterialFlowValidator::new();

        match validator.validate_flow(&reader, 3, 500.0, day()).unwrap() {
            FlowCheckOutcome::Covered {
                upstream_count,
                total_available_input,
                already_consumed,
                remaining,
            } => {
                assert_eq!(upstream_count, 2);
                assert_eq!(total_available_input, 600.0);
                assert_eq!(already_consumed, 100.0);
                assert_eq!(remaining, 500.0);
            }
            other => panic!("Expected Covered, got {:?}", other),
        }

        assert!(matches!(
            validator.validate_flow(&reader, 3, 500.5, day()),
            Err(FlowCheckError::InsufficientInput { .. })
        ));
    }

    #[test]
    fn test_other_dates_do_not_count() {
        let yesterday = day().pred_opt().unwrap();
        let reader = InMemoryFlow::default()
            .section(1, Some(2))
            .section(2, None)
            .output(1, yesterday, 1000.0);
        let validator = MaterialFlowValidator::new();

        match validator.validate_flow(&reader, 2, 1.0, day()) {
            Err(FlowCheckError::InsufficientInput { available, .. }) => assert_eq!(available, 0.0),
            other => panic!("Expected InsufficientInput, got {:?}", other),
        }
    }

    #[test]
    fn test_idempotent_without_writes() {
        let reader = InMemoryFlow::default()
            .section(1, Some(2))
            .section(2, None)
            .output(1, day(), 300.0)
            .input(2, day(), 50.0);
        let validator = MaterialFlowValidator::new();

        let first = validator.validate_flow(&reader, 2, 200.0, day()).unwrap();
        let second = validator.validate_flow(&reader, 2, 200.0, day()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_section_not_found() {
        let reader = InMemoryFlow::default().section(1, None);
        let validator = MaterialFlowValidator::new();

        assert!(matches!(
            validator.validate_flow(&reader, 9, 1.0, day()),
            Err(FlowCheckError::SectionNotFound { section_id: 9 })
        ));
    }

    #[test]
    fn test_reader_failure_propagates() {
        let validator = MaterialFlowValidator::new();
        assert!(matches!(
            validator.validate_flow(&FailingReader, 1, 1.0, day()),
            Err(FlowCheckError::Repository(_))
        ));
    }
}
