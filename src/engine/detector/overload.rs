// ==========================================
// 领先指标规则 - resource_overload（资源超载）
// ==========================================
// 触发: 产能负荷 is_overloaded（利用率 > 100%）
// 严重度: > overload_critical_pct → critical；> overload_high_pct → high；否则 medium
// 影响期: 本周（days_until_impact = 0）
// ==========================================

use crate::domain::capacity::CapacityLoad;
use crate::domain::indicator::{AffectedItem, LeadingIndicator};
use crate::domain::types::{IndicatorCategory, Severity};
use crate::engine::detector::recommendation::{recommendation, TemplateParams};
use crate::engine::detector::{DetectionContext, DetectionRule, IndicatorDraft};
use std::collections::HashMap;

pub struct ResourceOverloadRule;

impl ResourceOverloadRule {
    fn severity(ctx: &DetectionContext<'_>, load: &CapacityLoad) -> Severity {
        let t = ctx.thresholds;
        if load.utilization_pct > t.overload_critical_pct {
            Severity::Critical
        } else if load.utilization_pct > t.overload_high_pct {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl DetectionRule for ResourceOverloadRule {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::ResourceOverload
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator> {
        let index_of: HashMap<&str, usize> = ctx
            .units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id.as_str(), i))
            .collect();

        let mut out = Vec::new();
        for load in ctx.loads.iter().filter(|l| l.is_overloaded) {
            let severity = Self::severity(ctx, load);
            let pct = format!("{}%", load.utilization_pct);
            let excess = load.current_load - load.weekly_capacity;

            let mut affected_items = vec![AffectedItem::resource(&load.capacity_id, &load.resource_name)];
            for unit_id in &load.contributing_unit_ids {
                let item = match index_of.get(unit_id.as_str()) {
                    Some(idx) => ctx.affected_unit(*idx),
                    None => AffectedItem::work_unit(unit_id, unit_id),
                };
                affected_items.push(item);
            }

            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::ResourceOverload,
                title: format!(
                    "{} ({}) is at {} of weekly capacity",
                    load.resource_name, load.resource_type, pct
                ),
                description: format!(
                    "This week's load is {:.1} {} against a weekly capacity of {:.1} {} from {} work unit(s).",
                    load.current_load,
                    load.unit,
                    load.weekly_capacity,
                    load.unit,
                    load.contributing_unit_ids.len()
                ),
                impact: format!(
                    "{:.1} {} of planned work exceeds capacity this week and will slip unless rebalanced.",
                    excess, load.unit
                ),
                recommendation: recommendation(
                    IndicatorCategory::ResourceOverload,
                    severity,
                    &TemplateParams {
                        subject: &load.resource_name,
                        related: &pct,
                    },
                ),
                affected_items,
                project_id: None,
                days_until_impact: Some(0),
            };
            out.push(draft.into_indicator(ctx.now));
        }

        out
    }
}
