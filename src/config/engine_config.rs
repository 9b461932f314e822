// ==========================================
// 钢结构加工运营引擎 - 引擎阈值配置
// ==========================================
// 所有分档阈值均为具名常量，可经 config_kv 覆写
// 超载阈值固定为 100%（契约），不在此配置
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 产能状态分档阈值（百分比）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityBands {
    /// >= high_pct 且 <= 100 → High
    pub high_pct: i64,
    /// >= moderate_pct 且 < high_pct → Moderate
    pub moderate_pct: i64,
}

impl Default for CapacityBands {
    fn default() -> Self {
        Self {
            high_pct: 85,
            moderate_pct: 60,
        }
    }
}

/// 领先指标检测阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorThresholds {
    // ===== task_delay =====
    pub task_delay_lookahead_days: i64,
    pub task_delay_high_days: i64,

    // ===== cascade_risk =====
    pub cascade_high_count: usize,
    pub cascade_critical_count: usize,
    pub max_cascade_depth: usize,

    // ===== resource_overload =====
    pub overload_high_pct: i64,
    pub overload_critical_pct: i64,

    // ===== procurement_risk =====
    pub procurement_lookahead_days: i64,
    pub procurement_high_days: i64,

    // ===== schedule_slip =====
    pub slip_tolerance_pct: f64,
    pub slip_high_pct: f64,
    pub slip_critical_pct: f64,
    pub project_slip_min_units: usize,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            task_delay_lookahead_days: 3,
            task_delay_high_days: 1,
            cascade_high_count: 3,
            cascade_critical_count: 5,
            max_cascade_depth: 32,
            overload_high_pct: 125,
            overload_critical_pct: 150,
            procurement_lookahead_days: 7,
            procurement_high_days: 2,
            slip_tolerance_pct: 15.0,
            slip_high_pct: 30.0,
            slip_critical_pct: 50.0,
            project_slip_min_units: 3,
        }
    }
}

/// 引擎总配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub capacity_bands: CapacityBands,
    pub detector: DetectorThresholds,
    /// 整轮运行截止时间（毫秒）
    pub run_deadline_ms: u64,
    /// 引用解析并发度
    pub resolver_concurrency: usize,
    /// 解析失败时回退名称的截断长度
    pub fallback_name_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_bands: CapacityBands::default(),
            detector: DetectorThresholds::default(),
            run_deadline_ms: 10_000,
            resolver_concurrency: 8,
            fallback_name_len: 8,
        }
    }
}

impl EngineConfig {
    pub fn run_deadline(&self) -> Duration {
        Duration::from_millis(self.run_deadline_ms)
    }

    /// 校验阈值一致性
    pub fn validate(&self) -> Result<(), String> {
        let bands = &self.capacity_bands;
        if !(0 < bands.moderate_pct && bands.moderate_pct < bands.high_pct && bands.high_pct <= 100) {
            return Err(format!(
                "产能分档阈值不合法: moderate={} high={}（要求 0 < moderate < high <= 100）",
                bands.moderate_pct, bands.high_pct
            ));
        }

        let d = &self.detector;
        if d.task_delay_lookahead_days < 0 || d.task_delay_high_days > d.task_delay_lookahead_days {
            return Err(format!(
                "延误预警窗口不合法: lookahead={} high={}",
                d.task_delay_lookahead_days, d.task_delay_high_days
            ));
        }
        if d.cascade_high_count == 0 || d.cascade_high_count > d.cascade_critical_count {
            return Err(format!(
                "级联阈值不合法: high={} critical={}",
                d.cascade_high_count, d.cascade_critical_count
            ));
        }
        if d.max_cascade_depth == 0 {
            return Err("级联深度上限必须大于 0".to_string());
        }
        if !(100 < d.overload_high_pct && d.overload_high_pct <= d.overload_critical_pct) {
            return Err(format!(
                "超载分档不合法: high={} critical={}（要求 100 < high <= critical）",
                d.overload_high_pct, d.overload_critical_pct
            ));
        }
        if d.procurement_lookahead_days < 0 || d.procurement_high_days > d.procurement_lookahead_days {
            return Err(format!(
                "采购预警窗口不合法: lookahead={} high={}",
                d.procurement_lookahead_days, d.procurement_high_days
            ));
        }
        if !(0.0 < d.slip_tolerance_pct
            && d.slip_tolerance_pct <= d.slip_high_pct
            && d.slip_high_pct <= d.slip_critical_pct)
        {
            return Err(format!(
                "进度偏差阈值不合法: tolerance={} high={} critical={}",
                d.slip_tolerance_pct, d.slip_high_pct, d.slip_critical_pct
            ));
        }
        if self.run_deadline_ms == 0 {
            return Err("运行截止时间必须大于 0".to_string());
        }
        if self.resolver_concurrency == 0 {
            return Err("解析并发度必须大于 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_capacity_bands_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.capacity_bands.moderate_pct = 90;
        cfg.capacity_bands.high_pct = 80;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_overload_band_must_exceed_100() {
        let mut cfg = EngineConfig::default();
        cfg.detector.overload_high_pct = 100;
        assert!(cfg.validate().is_err());
    }
}
