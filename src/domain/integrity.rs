// ==========================================
// 车间生产管理系统 - 数据完整性检查结果
// ==========================================

use crate::domain::types::{FindingKind, Severity};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// SectionBalance - 上下游工段当日物料平衡
// ==========================================
// 口径: 上游单个工段的当日产出 vs 下游工段的当日投入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBalance {
    pub from_section_id: i64,
    pub from_section: String,
    pub to_section_id: i64,
    pub to_section: String, // 下游工段不存在时为 "Unknown"
    pub output: f64,        // 上游当日产出
    pub input: f64,         // 下游当日投入
    pub discrepancy: f64,   // output - input
    pub downstream_feeder_count: usize, // 流向同一下游的上游工段数
}

// ==========================================
// IntegrityFinding - 单条完整性问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityFinding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub description: String,
    pub details: serde_json::Value,
    pub severity: Severity,
}

// ==========================================
// IntegrityReport - 一次完整性扫描的结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub scan_id: String,
    pub scan_date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub findings: Vec<IntegrityFinding>,
}

impl IntegrityReport {
    /// 按类型统计问题数
    pub fn count_by_kind(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    /// 最高严重度（无问题时为 None）
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}
