// ==========================================
// 钢结构加工运营引擎 - 领先指标检测
// ==========================================
// 五条相互独立的检测规则共享同一份运行状态（单元/依赖图/产能负荷）
// 输出: 排序后的指标列表 + 按严重度/类别汇总
// 排序: 严重度降序 → days_until_impact 升序（无值在后）→ 类别 → 标题
// 幂等: 同一快照重复运行，内容与顺序一致（指标 id 除外）
// ==========================================

pub mod cascade;
pub mod overload;
pub mod procurement;
pub mod recommendation;
pub mod schedule_slip;
pub mod task_delay;

use crate::config::engine_config::DetectorThresholds;
use crate::domain::capacity::CapacityLoad;
use crate::domain::indicator::{AffectedItem, IndicatorSummary, LeadingIndicator};
use crate::domain::types::{IndicatorCategory, Severity};
use crate::domain::work_unit::WorkUnit;
use crate::engine::graph::DependencyGraph;
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

pub use cascade::CascadeRiskRule;
pub use overload::ResourceOverloadRule;
pub use procurement::ProcurementRiskRule;
pub use schedule_slip::ScheduleSlipRule;
pub use task_delay::TaskDelayRule;

// ==========================================
// DetectionContext - 规则输入
// ==========================================
pub struct DetectionContext<'a> {
    pub units: &'a [WorkUnit],
    pub graph: &'a DependencyGraph,
    /// 计算得到的阻塞标记（按节点索引）
    pub blocked: &'a [bool],
    pub loads: &'a [CapacityLoad],
    pub names: &'a HashMap<String, String>,
    pub thresholds: &'a DetectorThresholds,
    pub now: NaiveDateTime,
    pub fallback_name_len: usize,
}

impl<'a> DetectionContext<'a> {
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// 距指定时间的自然日数（过去为负）
    pub fn days_until(&self, at: NaiveDateTime) -> i64 {
        (at.date() - self.today()).num_days()
    }

    pub fn name_of(&self, idx: usize) -> String {
        let unit = &self.units[idx];
        self.names
            .get(&unit.id)
            .cloned()
            .unwrap_or_else(|| unit.short_id(self.fallback_name_len))
    }

    pub fn affected_unit(&self, idx: usize) -> AffectedItem {
        AffectedItem::work_unit(&self.units[idx].id, &self.name_of(idx))
    }

    /// 单元是否已延误: 计划开工已过仍未开工，或计划完工已过仍未完成
    pub fn is_delayed(&self, idx: usize) -> bool {
        let unit = &self.units[idx];
        if unit.is_completed() {
            return false;
        }
        (unit.actual_start.is_none() && unit.planned_start < self.now) || unit.planned_end < self.now
    }
}

/// 检测规则
pub trait DetectionRule: Send + Sync {
    fn category(&self) -> IndicatorCategory;

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator>;
}

/// 指标草稿（规则填写内容，检测器补齐 id 与时间）
#[derive(Debug, Clone)]
pub struct IndicatorDraft {
    pub severity: Severity,
    pub category: IndicatorCategory,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
    pub affected_items: Vec<AffectedItem>,
    pub project_id: Option<String>,
    pub days_until_impact: Option<i64>,
}

impl IndicatorDraft {
    pub fn into_indicator(self, detected_at: NaiveDateTime) -> LeadingIndicator {
        LeadingIndicator {
            id: Uuid::new_v4().to_string(),
            severity: self.severity,
            category: self.category,
            title: self.title,
            description: self.description,
            impact: self.impact,
            recommendation: self.recommendation,
            affected_items: self.affected_items,
            project_id: self.project_id,
            detected_at,
            days_until_impact: self.days_until_impact,
        }
    }
}

/// 指标排序
pub fn compare_indicators(a: &LeadingIndicator, b: &LeadingIndicator) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| match (a.days_until_impact, b.days_until_impact) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.description.cmp(&b.description))
}

// ==========================================
// LeadingIndicatorDetector
// ==========================================
pub struct LeadingIndicatorDetector {
    rules: Vec<Box<dyn DetectionRule>>,
}

impl LeadingIndicatorDetector {
    /// 默认五条规则
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TaskDelayRule),
                Box::new(CascadeRiskRule),
                Box::new(ResourceOverloadRule),
                Box::new(ProcurementRiskRule),
                Box::new(ScheduleSlipRule),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn DetectionRule>>) -> Self {
        Self { rules }
    }

    pub fn detect(&self, ctx: &DetectionContext<'_>) -> IndicatorSummary {
        let mut indicators = Vec::new();
        for rule in &self.rules {
            let found = rule.detect(ctx);
            tracing::debug!(category = %rule.category(), count = found.len(), "检测规则完成");
            indicators.extend(found);
        }
        indicators.sort_by(compare_indicators);

        let summary = IndicatorSummary::from_sorted(indicators, ctx.now);
        tracing::info!(
            total = summary.total,
            task_delay = summary.count_of(IndicatorCategory::TaskDelay),
            cascade_risk = summary.count_of(IndicatorCategory::CascadeRisk),
            resource_overload = summary.count_of(IndicatorCategory::ResourceOverload),
            procurement_risk = summary.count_of(IndicatorCategory::ProcurementRisk),
            schedule_slip = summary.count_of(IndicatorCategory::ScheduleSlip),
            "领先指标检测完成"
        );
        summary
    }
}

impl Default for LeadingIndicatorDetector {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::types::{UnitStatus, UnitType};

    #[test]
    fn test_sort_order_severity_then_days() {
        let draft = |severity, days: Option<i64>, title: &str| IndicatorDraft {
            severity,
            category: IndicatorCategory::TaskDelay,
            title: title.to_string(),
            description: String::new(),
            impact: String::new(),
            recommendation: String::new(),
            affected_items: Vec::new(),
            project_id: None,
            days_until_impact: days,
        }
        .into_indicator(now());

        let mut list = vec![
            draft(Severity::Medium, Some(1), "m1"),
            draft(Severity::Critical, None, "c-none"),
            draft(Severity::Critical, Some(3), "c3"),
            draft(Severity::High, Some(0), "h0"),
            draft(Severity::Critical, Some(-1), "c-1"),
        ];
        list.sort_by(compare_indicators);
        let titles: Vec<&str> = list.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c-1", "c3", "c-none", "h0", "m1"]);
    }

    #[test]
    fn test_detector_is_deterministic() {
        let units = vec![
            unit("A", UnitType::Procurement, UnitStatus::NotStarted, -2, 1),
            unit("B", UnitType::Production, UnitStatus::NotStarted, 2, 5),
            unit("C", UnitType::QC, UnitStatus::NotStarted, 6, 7),
            unit("D", UnitType::Design, UnitStatus::NotStarted, 1, 3),
        ];
        let edges = vec![fs("E1", "A", "B"), fs("E2", "B", "C")];
        let fixture = Fixture::new(units, edges);
        let detector = LeadingIndicatorDetector::new();

        let first = detector.detect(&fixture.ctx());
        let second = detector.detect(&fixture.ctx());

        assert!(first.total > 0);
        assert_eq!(first.by_severity, second.by_severity);
        assert_eq!(first.by_category, second.by_category);
        let key = |s: &IndicatorSummary| {
            s.indicators
                .iter()
                .map(|i| (i.category, i.severity, i.title.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn test_empty_snapshot_yields_zeroed_summary() {
        let fixture = Fixture::new(Vec::new(), Vec::new());
        let summary = LeadingIndicatorDetector::new().detect(&fixture.ctx());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.by_severity.len(), 4);
        assert_eq!(summary.by_category.len(), 5);
    }
}
