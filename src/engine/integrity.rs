// ==========================================
// 车间生产管理系统 - 数据完整性扫描引擎
// ==========================================
// 职责: 管理员触发的全系统扫描（当日口径）
// 检查1: 上下游工段物料不平衡 (material_flow)
// 检查2: 工人当日无生产记录 (missing_data)
// 红线: 任一读取失败即整体失败，不返回部分结果
// ==========================================

use crate::domain::integrity::{IntegrityFinding, SectionBalance};
use crate::domain::section::Section;
use crate::domain::types::{FindingKind, Severity};
use crate::domain::worker::Worker;
use crate::engine::flow_validator::MaterialFlowReader;
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashSet;

/// 默认不平衡容差 (kg)，吸收舍入误差
pub const DEFAULT_FLOW_TOLERANCE: f64 = 0.1;

/// 默认高严重度阈值 (kg)，严格大于才判 high
pub const DEFAULT_HIGH_SEVERITY_THRESHOLD: f64 = 10.0;

// ==========================================
// IntegrityReader - 完整性扫描读模型
// ==========================================
pub trait IntegrityReader: MaterialFlowReader {
    /// 全部工段（按 id 排序）
    fn list_sections(&self) -> RepositoryResult<Vec<Section>>;

    /// 全部工人（按 id 排序）
    fn list_workers(&self) -> RepositoryResult<Vec<Worker>>;

    /// 某日有生产记录的工人 id
    fn worker_ids_with_production(&self, date: NaiveDate) -> RepositoryResult<Vec<i64>>;
}

// ==========================================
// IntegrityThresholds - 扫描阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrityThresholds {
    pub flow_tolerance: f64,
    pub high_severity_threshold: f64,
}

impl Default for IntegrityThresholds {
    fn default() -> Self {
        Self {
            flow_tolerance: DEFAULT_FLOW_TOLERANCE,
            high_severity_threshold: DEFAULT_HIGH_SEVERITY_THRESHOLD,
        }
    }
}

// ==========================================
// IntegrityScanner - 完整性扫描器
// ==========================================
pub struct IntegrityScanner {
    thresholds: IntegrityThresholds,
}

impl IntegrityScanner {
    pub fn new(thresholds: IntegrityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> IntegrityThresholds {
        self.thresholds
    }

    /// 计算每一对 (工段 -> 下游工段) 的当日物料平衡
    ///
    /// # 说明
    /// 按"单个上游产出 vs 下游投入"逐对比较，不对流向同一下游的多个上游求和；
    /// 扇入情况通过 downstream_feeder_count 暴露给展示层
    pub fn section_balances<R: IntegrityReader + ?Sized>(
        &self,
        reader: &R,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<SectionBalance>> {
        let sections = reader.list_sections()?;
        let mut balances = Vec::new();

        for section in &sections {
            let Some(next_id) = section.next_section_id else {
                continue;
            };

            let output = reader.sum_output_material(section.id, date)?;
            let input = reader.sum_input_material(next_id, date)?;

            let to_section = sections
                .iter()
                .find(|s| s.id == next_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let downstream_feeder_count = sections
                .iter()
                .filter(|s| s.next_section_id == Some(next_id))
                .count();

            balances.push(SectionBalance {
                from_section_id: section.id,
                from_section: section.name.clone(),
                to_section_id: next_id,
                to_section,
                output,
                input,
                discrepancy: output - input,
                downstream_feeder_count,
            });
        }

        Ok(balances)
    }

    /// 不平衡量是否超出容差
    pub fn has_issue(&self, discrepancy: f64) -> bool {
        discrepancy.abs() > self.thresholds.flow_tolerance
    }

    /// 不平衡严重度: |d| > 高阈值 为 high，否则 medium
    pub fn flow_severity(&self, discrepancy: f64) -> Severity {
        if discrepancy.abs() > self.thresholds.high_severity_threshold {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    /// 执行扫描
    ///
    /// # 返回
    /// - Ok(findings): material_flow 在前（按上游工段 id），missing_data 在后（按工人 id）
    /// - Err: 读模型故障，整体失败
    pub fn scan<R: IntegrityReader + ?Sized>(
        &self,
        reader: &R,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<IntegrityFinding>> {
        let mut findings = Vec::new();

        // ===== 检查1: 物料流转不平衡 =====
        for balance in self.section_balances(reader, today)? {
            if !self.has_issue(balance.discrepancy) {
                continue;
            }

            findings.push(IntegrityFinding {
                kind: FindingKind::MaterialFlow,
                description: t_with_args(
                    "integrity.flow_discrepancy",
                    &[
                        ("from", balance.from_section.as_str()),
                        ("to", balance.to_section.as_str()),
                    ],
                ),
                details: json!({
                    "from_section_id": balance.from_section_id,
                    "to_section_id": balance.to_section_id,
                    "output": balance.output,
                    "input": balance.input,
                    "discrepancy": balance.discrepancy,
                    "downstream_feeder_count": balance.downstream_feeder_count,
                }),
                severity: self.flow_severity(balance.discrepancy),
            });
        }

        // ===== 检查2: 工人当日无生产记录 =====
        let sections = reader.list_sections()?;
        let with_production: HashSet<i64> = reader
            .worker_ids_with_production(today)?
            .into_iter()
            .collect();

        for worker in reader.list_workers()? {
            if with_production.contains(&worker.id) {
                continue;
            }

            let section_name = worker
                .section_id
                .and_then(|id| sections.iter().find(|s| s.id == id))
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            findings.push(IntegrityFinding {
                kind: FindingKind::MissingData,
                description: t_with_args(
                    "integrity.missing_data",
                    &[("worker", worker.name.as_str())],
                ),
                details: json!({
                    "worker_id": worker.id,
                    "section": section_name,
                }),
                severity: Severity::Low,
            });
        }

        tracing::info!(
            %today,
            findings = findings.len(),
            "数据完整性扫描完成"
        );

        Ok(findings)
    }
}

impl Default for IntegrityScanner {
    fn default() -> Self {
        Self::new(IntegrityThresholds::default())
    }
}
