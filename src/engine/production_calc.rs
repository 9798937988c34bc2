// ==========================================
// 车间生产管理系统 - 生产记录派生字段计算
// ==========================================
// 职责: 写入前派生 target / wastage / overtime_hours
// 红线: 纯计算，不读写数据库
// ==========================================

use crate::domain::production::NewProductionLog;
use crate::domain::worker::Item;
use chrono::NaiveDate;

/// 默认班次时长（小时）
pub const DEFAULT_SHIFT_HOURS: f64 = 8.0;

/// 校验通过的录入数据
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionEntry {
    pub worker_id: i64,
    pub item_id: i64,
    pub section_id: i64,
    pub date: NaiveDate,
    pub actual: i64,
    pub input_material: f64,
    pub output_material: f64,
}

// ==========================================
// ProductionCalculator - 派生字段计算器
// ==========================================
pub struct ProductionCalculator {
    shift_hours: f64,
}

impl ProductionCalculator {
    pub fn new(shift_hours: f64) -> Self {
        Self { shift_hours }
    }

    /// 损耗 = 投入 - 产出
    pub fn wastage(input_material: f64, output_material: f64) -> f64 {
        input_material - output_material
    }

    /// 加班工时
    ///
    /// 超产部分按"每小时目标产量"折算: (actual - target) / (target / shift_hours)；
    /// 未超产或目标为 0 时为 0
    pub fn overtime_hours(&self, target: i64, actual: i64) -> f64 {
        if target <= 0 || actual <= target || self.shift_hours <= 0.0 {
            return 0.0;
        }
        let hourly_rate = target as f64 / self.shift_hours;
        (actual - target) as f64 / hourly_rate
    }

    /// 组装待写入记录（目标产量取品种默认目标）
    pub fn build(&self, entry: &ProductionEntry, item: &Item) -> NewProductionLog {
        let target = item.default_target;
        NewProductionLog {
            worker_id: entry.worker_id,
            item_id: entry.item_id,
            section_id: entry.section_id,
            date: entry.date,
            target,
            actual: entry.actual,
            input_material: entry.input_material,
            output_material: entry.output_material,
            wastage: Self::wastage(entry.input_material, entry.output_material),
            overtime_hours: self.overtime_hours(target, entry.actual),
        }
    }
}

impl Default for ProductionCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SHIFT_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(default_target: i64) -> Item {
        Item {
            id: 1,
            name: "Raw Cotton".to_string(),
            unit: "kg".to_string(),
            default_target,
        }
    }

    #[test]
    fn test_overtime_above_target() {
        let calc = ProductionCalculator::default();
        // 目标 400 / 8h = 50/h，超产 100 => 2h
        assert_eq!(calc.overtime_hours(400, 500), 2.0);
    }

    #[test]
    fn test_no_overtime_at_or_below_target() {
        let calc = ProductionCalculator::default();
        assert_eq!(calc.overtime_hours(400, 400), 0.0);
        assert_eq!(calc.overtime_hours(400, 10), 0.0);
    }

    #[test]
    fn test_zero_target_no_overtime() {
        let calc = ProductionCalculator::default();
        assert_eq!(calc.overtime_hours(0, 100), 0.0);
    }

    #[test]
    fn test_custom_shift_hours() {
        let calc = ProductionCalculator::new(10.0);
        // 500 / 10h = 50/h，超产 50 => 1h
        assert_eq!(calc.overtime_hours(500, 550), 1.0);
    }

    #[test]
    fn test_build_derives_fields() {
        let calc = ProductionCalculator::default();
        let entry = ProductionEntry {
            worker_id: 3,
            item_id: 1,
            section_id: 2,
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            actual: 600,
            input_material: 500.0,
            output_material: 480.0,
        };

        let log = calc.build(&entry, &item(500));
        assert_eq!(log.target, 500);
        assert_eq!(log.wastage, 20.0);
        // 500 / 8 = 62.5/h，超产 100 => 1.6h
        assert!((log.overtime_hours - 1.6).abs() < 1e-9);
        assert_eq!(log.section_id, 2);
    }
}
