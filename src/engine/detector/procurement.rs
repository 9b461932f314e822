// ==========================================
// 领先指标规则 - procurement_risk（采购风险）
// ==========================================
// 触发: 未完成、未开工的 Production 单元计划开工在 lookahead 天内（或已过），
//       且其上游采购单元未完成
// 上游采购: 直接上游中的 Procurement 单元；
//           该单元没有任何上游边时，取同项目、计划开工不晚于它的未完成 Procurement 单元
// 严重度: 计划开工已过 → critical；剩余天数 <= high_days → high；否则 medium
// ==========================================

use crate::domain::indicator::LeadingIndicator;
use crate::domain::types::{IndicatorCategory, Severity, UnitType};
use crate::engine::detector::recommendation::{recommendation, TemplateParams};
use crate::engine::detector::{DetectionContext, DetectionRule, IndicatorDraft};
use std::collections::BTreeSet;

pub struct ProcurementRiskRule;

impl ProcurementRiskRule {
    /// 未完成的上游采购单元（索引升序）
    fn pending_procurement(ctx: &DetectionContext<'_>, idx: usize) -> Vec<usize> {
        let is_pending_procurement = |i: usize| {
            let u = &ctx.units[i];
            u.unit_type == UnitType::Procurement && !u.is_completed()
        };

        let has_upstream = ctx.graph.upstream_edges(idx).next().is_some();
        if has_upstream {
            let found: BTreeSet<usize> = ctx
                .graph
                .upstream_edges(idx)
                .map(|e| e.from)
                .filter(|i| is_pending_procurement(*i))
                .collect();
            return found.into_iter().collect();
        }

        let production = &ctx.units[idx];
        (0..ctx.units.len())
            .filter(|i| *i != idx && is_pending_procurement(*i))
            .filter(|i| {
                let u = &ctx.units[*i];
                u.project_id == production.project_id && u.planned_start <= production.planned_start
            })
            .collect()
    }
}

impl DetectionRule for ProcurementRiskRule {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::ProcurementRisk
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator> {
        let t = ctx.thresholds;
        let mut out = Vec::new();

        for (idx, unit) in ctx.units.iter().enumerate() {
            if unit.unit_type != UnitType::Production || unit.is_completed() || !unit.not_yet_started() {
                continue;
            }
            let days = ctx.days_until(unit.planned_start);
            if days > t.procurement_lookahead_days {
                continue;
            }

            let upstream = Self::pending_procurement(ctx, idx);
            if upstream.is_empty() {
                continue;
            }

            let severity = if unit.planned_start < ctx.now {
                Severity::Critical
            } else if days <= t.procurement_high_days {
                Severity::High
            } else {
                Severity::Medium
            };

            let name = ctx.name_of(idx);
            let upstream_names: Vec<String> = upstream.iter().map(|i| ctx.name_of(*i)).collect();
            let related = upstream_names.join(", ");

            let mut affected_items = vec![ctx.affected_unit(idx)];
            affected_items.extend(upstream.iter().map(|i| ctx.affected_unit(*i)));

            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::ProcurementRisk,
                title: format!(
                    "Production {} starts {} with {} open procurement item(s)",
                    name,
                    unit.planned_start.date(),
                    upstream.len()
                ),
                description: format!(
                    "Work unit {} is planned to start on {}; upstream procurement not completed: {}.",
                    unit.id,
                    unit.planned_start.date(),
                    related
                ),
                impact: format!(
                    "Production {} cannot start without materials; {} day(s) remain before planned start.",
                    name,
                    days.max(0)
                ),
                recommendation: recommendation(
                    IndicatorCategory::ProcurementRisk,
                    severity,
                    &TemplateParams {
                        subject: &name,
                        related: &related,
                    },
                ),
                affected_items,
                project_id: Some(unit.project_id.clone()),
                days_until_impact: Some(days),
            };
            out.push(draft.into_indicator(ctx.now));
        }

        out
    }
}
