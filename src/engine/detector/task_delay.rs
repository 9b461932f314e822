// ==========================================
// 领先指标规则 - task_delay（开工延误）
// ==========================================
// 触发: 未开工（无实际开工、状态为 NotStarted/Blocked）
//       且计划开工已过或在 lookahead 天内
// 严重度: 计划开工已过 → critical；剩余天数 <= high_days → high；否则 medium
// ==========================================

use crate::domain::indicator::LeadingIndicator;
use crate::domain::types::{IndicatorCategory, Severity};
use crate::engine::detector::recommendation::{recommendation, TemplateParams};
use crate::engine::detector::{DetectionContext, DetectionRule, IndicatorDraft};

pub struct TaskDelayRule;

impl TaskDelayRule {
    fn severity(ctx: &DetectionContext<'_>, idx: usize, days: i64) -> Severity {
        if ctx.units[idx].planned_start < ctx.now {
            Severity::Critical
        } else if days <= ctx.thresholds.task_delay_high_days {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl DetectionRule for TaskDelayRule {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::TaskDelay
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator> {
        let mut out = Vec::new();

        for (idx, unit) in ctx.units.iter().enumerate() {
            if unit.is_completed() || !unit.not_yet_started() {
                continue;
            }
            let days = ctx.days_until(unit.planned_start);
            if days > ctx.thresholds.task_delay_lookahead_days {
                continue;
            }

            let severity = Self::severity(ctx, idx, days);
            let name = ctx.name_of(idx);
            let (title, impact) = if unit.planned_start < ctx.now {
                let overdue = (-days).max(0);
                (
                    format!("{} {} has not started (planned start passed)", unit.unit_type, name),
                    format!(
                        "Start is overdue by {} day(s); planned finish {} is at risk.",
                        overdue,
                        unit.planned_end.date()
                    ),
                )
            } else {
                (
                    format!("{} {} starts in {} day(s) and has not started", unit.unit_type, name, days),
                    format!(
                        "If not started by {}, planned finish {} is at risk.",
                        unit.planned_start.date(),
                        unit.planned_end.date()
                    ),
                )
            };

            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::TaskDelay,
                title,
                description: format!(
                    "Work unit {} (status {}) was planned to start on {} and has no actual start recorded.",
                    unit.id,
                    unit.status,
                    unit.planned_start.date()
                ),
                impact,
                recommendation: recommendation(
                    IndicatorCategory::TaskDelay,
                    severity,
                    &TemplateParams {
                        subject: &name,
                        related: "",
                    },
                ),
                affected_items: vec![ctx.affected_unit(idx)],
                project_id: Some(unit.project_id.clone()),
                days_until_impact: Some(days),
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
    fn test_overdue_start_is_critical() {
        let fixture = Fixture::new(
            vec![unit("A", UnitType::Procurement, UnitStatus::NotStarted, -1, 2)],
            vec![],
        );
        let found = TaskDelayRule.detect(&fixture.ctx());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].days_until_impact, Some(-1));
        assert_eq!(found[0].affected_items[0].id, "A");
    }

    #[test]
    fn test_start_earlier_today_is_overdue() {
        // now 10:00，计划 08:00 开工
        let fixture = Fixture::new(
            vec![unit("A", UnitType::Design, UnitStatus::NotStarted, 0, 2)],
            vec![],
        );
        let found = TaskDelayRule.detect(&fixture.ctx());
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].days_until_impact, Some(0));
    }

    #[test]
    fn test_lookahead_bands() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::NotStarted, 1, 2),
                unit("B", UnitType::Design, UnitStatus::NotStarted, 3, 4),
                unit("C", UnitType::Design, UnitStatus::NotStarted, 4, 5),
            ],
            vec![],
        );
        let found = TaskDelayRule.detect(&fixture.ctx());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].severity, Severity::High);
        assert_eq!(found[1].severity, Severity::Medium);
    }

    #[test]
    fn test_started_or_completed_units_ignored() {
        let mut started = unit("A", UnitType::Design, UnitStatus::InProgress, -3, 2);
        started.actual_start = Some(at_day(-3));
        let fixture = Fixture::new(
            vec![
                started,
                unit("B", UnitType::Design, UnitStatus::Completed, -3, -1),
            ],
            vec![],
        );
        assert!(TaskDelayRule.detect(&fixture.ctx()).is_empty());
    }

    #[test]
    fn test_persisted_blocked_status_still_counts_as_not_started() {
        let fixture = Fixture::new(
            vec![unit("A", UnitType::QC, UnitStatus::Blocked, -2, 1)],
            vec![],
        );
        assert_eq!(TaskDelayRule.detect(&fixture.ctx()).len(), 1);
    }
}
