// ==========================================
// 领先指标规则 - cascade_risk（级联风险）
// ==========================================
// 源头: 已延误或（计算得出）被阻塞、且存在下游的单元
// 去重: 源头若可由另一源头到达则并入上游源头；互相可达（环）时保留索引最小者
// 受影响: 沿"阻塞谁"边广度优先到达的未完成单元（visited + 深度上限保护）
// 严重度: 受影响数 >= critical_count → critical；>= high_count → high；否则 medium
//         任一受影响单元在 lookahead 天内计划开工 → 提升一档
// ==========================================

use crate::domain::indicator::LeadingIndicator;
use crate::domain::types::{IndicatorCategory, Severity};
use crate::engine::detector::recommendation::{recommendation, TemplateParams};
use crate::engine::detector::{DetectionContext, DetectionRule, IndicatorDraft};
use crate::engine::graph::CascadeWalk;

pub struct CascadeRiskRule;

impl CascadeRiskRule {
    fn severity(ctx: &DetectionContext<'_>, affected: &[usize]) -> Severity {
        let t = ctx.thresholds;
        let count = affected.len();
        let base = if count >= t.cascade_critical_count {
            Severity::Critical
        } else if count >= t.cascade_high_count {
            Severity::High
        } else {
            Severity::Medium
        };

        let imminent = affected.iter().any(|idx| {
            let unit = &ctx.units[*idx];
            unit.not_yet_started() && ctx.days_until(unit.planned_start) <= t.task_delay_lookahead_days
        });
        if imminent {
            base.escalate()
        } else {
            base
        }
    }
}

impl DetectionRule for CascadeRiskRule {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::CascadeRisk
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator> {
        let max_depth = ctx.thresholds.max_cascade_depth;

        let candidates: Vec<usize> = (0..ctx.units.len())
            .filter(|idx| ctx.graph.has_downstream(*idx))
            .filter(|idx| ctx.is_delayed(*idx) || ctx.blocked[*idx])
            .collect();

        let walks: Vec<(usize, CascadeWalk)> = candidates
            .iter()
            .map(|idx| (*idx, ctx.graph.walk_downstream(*idx, max_depth)))
            .collect();

        let mut out = Vec::new();
        for (source, walk) in &walks {
            let absorbed = walks.iter().any(|(other, other_walk)| {
                other != source
                    && other_walk.contains(*source)
                    && (!walk.contains(*other) || other < source)
            });
            if absorbed {
                continue;
            }
            if walk.depth_limited {
                tracing::debug!(
                    unit_id = %ctx.units[*source].id,
                    max_depth,
                    "级联遍历达到深度上限"
                );
            }

            let affected: Vec<usize> = walk
                .nodes()
                .filter(|idx| !ctx.units[*idx].is_completed())
                .collect();
            if affected.is_empty() {
                continue;
            }

            let unit = &ctx.units[*source];
            let name = ctx.name_of(*source);
            let severity = Self::severity(ctx, &affected);
            let days_until_impact = affected
                .iter()
                .map(|idx| ctx.days_until(ctx.units[*idx].planned_start))
                .min();
            let cause = if ctx.is_delayed(*source) { "delayed" } else { "blocked" };
            let count = affected.len().to_string();

            let mut affected_items = vec![ctx.affected_unit(*source)];
            affected_items.extend(affected.iter().map(|idx| ctx.affected_unit(*idx)));

            let downstream_names: Vec<String> =
                affected.iter().map(|idx| ctx.name_of(*idx)).collect();

            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::CascadeRisk,
                title: format!(
                    "{} {} is {} and holds up {} downstream unit(s)",
                    unit.unit_type, name, cause, count
                ),
                description: format!(
                    "Cause: work unit {} ({}). Downstream units reachable via finish/start dependencies: {}.",
                    unit.id,
                    cause,
                    downstream_names.join(", ")
                ),
                impact: format!(
                    "{} downstream unit(s) cannot proceed on plan until {} is resolved.",
                    count, name
                ),
                recommendation: recommendation(
                    IndicatorCategory::CascadeRisk,
                    severity,
                    &TemplateParams {
                        subject: &name,
                        related: &count,
                    },
                ),
                affected_items,
                project_id: Some(unit.project_id.clone()),
                days_until_impact,
            };
            out.push(draft.into_indicator(ctx.now));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{UnitStatus, UnitType};
    use crate::engine::detector::test_support::*;

    #[test]
    fn test_delayed_source_with_blocked_chain_reports_once() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Procurement, UnitStatus::NotStarted, -1, 2),
                unit("B", UnitType::Production, UnitStatus::NotStarted, 10, 12),
                unit("C", UnitType::QC, UnitStatus::NotStarted, 13, 14),
            ],
            vec![fs("E1", "A", "B"), fs("E2", "B", "C")],
        );
        let found = CascadeRiskRule.detect(&fixture.ctx());

        assert_eq!(found.len(), 1);
        let ids: Vec<&str> = found[0].affected_items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[0].days_until_impact, Some(10));
    }

    #[test]
    fn test_imminent_downstream_escalates() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Procurement, UnitStatus::NotStarted, -1, 2),
                unit("B", UnitType::Production, UnitStatus::NotStarted, 2, 4),
            ],
            vec![fs("E1", "A", "B")],
        );
        let found = CascadeRiskRule.detect(&fixture.ctx());
        assert_eq!(found[0].severity, Severity::High);
    }

    #[test]
    fn test_count_thresholds() {
        let mut units = vec![unit("A", UnitType::Design, UnitStatus::NotStarted, -1, 1)];
        let mut edges = Vec::new();
        for i in 0..5 {
            let id = format!("D{}", i);
            units.push(unit(&id, UnitType::Design, UnitStatus::NotStarted, 20, 21));
            edges.push(fs(&format!("E{}", i), "A", &id));
        }
        let fixture = Fixture::new(units, edges);
        let found = CascadeRiskRule.detect(&fixture.ctx());
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].affected_items.len(), 6);
    }

    #[test]
    fn test_cycle_terminates_and_reports_lowest_source() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::NotStarted, -2, -1),
                unit("B", UnitType::Design, UnitStatus::NotStarted, -1, 1),
                unit("C", UnitType::Design, UnitStatus::NotStarted, 20, 21),
            ],
            vec![fs("E1", "A", "B"), fs("E2", "B", "A"), fs("E3", "B", "C")],
        );
        let found = CascadeRiskRule.detect(&fixture.ctx());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].affected_items[0].id, "A");
    }

    #[test]
    fn test_completed_downstream_not_counted() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::NotStarted, -2, -1),
                unit("B", UnitType::Design, UnitStatus::Completed, -1, 0),
            ],
            vec![fs("E1", "A", "B")],
        );
        assert!(CascadeRiskRule.detect(&fixture.ctx()).is_empty());
    }

    #[test]
    fn test_on_track_units_produce_nothing() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::Completed, -5, -3),
                unit("B", UnitType::Design, UnitStatus::NotStarted, 5, 6),
            ],
            vec![fs("E1", "A", "B")],
        );
        assert!(CascadeRiskRule.detect(&fixture.ctx()).is_empty());
    }
}
