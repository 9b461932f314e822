// ==========================================
// 领先指标规则 - schedule_slip（进度偏差）
// ==========================================
// 计划进度: 计划区间内已流逝时间占比（0~100，过计划完工即 100）
// 单元级: InProgress 且申报了进度的单元，gap = 计划进度 - 申报进度
// 项目级: 项目内参与计算的单元 >= project_slip_min_units 时取平均
//         Completed 计 100，NotStarted 计 0，其余取申报进度（缺失则不参与）
// 触发: gap > slip_tolerance_pct
// 严重度: gap >= slip_critical_pct → critical；>= slip_high_pct → high；否则 medium
// ==========================================

use crate::domain::indicator::{AffectedItem, LeadingIndicator};
use crate::domain::types::{IndicatorCategory, Severity, UnitStatus};
use crate::domain::work_unit::WorkUnit;
use crate::engine::detector::recommendation::{recommendation, TemplateParams};
use crate::engine::detector::{DetectionContext, DetectionRule, IndicatorDraft};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// 计划进度（百分比）
pub fn planned_progress_pct(unit: &WorkUnit, now: NaiveDateTime) -> f64 {
    if now >= unit.planned_end {
        return 100.0;
    }
    if now <= unit.planned_start {
        return 0.0;
    }
    let total = (unit.planned_end - unit.planned_start).num_seconds() as f64;
    let elapsed = (now - unit.planned_start).num_seconds() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

/// 参与项目级计算的申报进度
fn declared_progress_pct(unit: &WorkUnit) -> Option<f64> {
    match unit.status {
        UnitStatus::Completed => Some(100.0),
        UnitStatus::NotStarted => Some(0.0),
        UnitStatus::InProgress | UnitStatus::Blocked => {
            unit.progress_pct.map(|p| p.clamp(0.0, 100.0))
        }
    }
}

pub struct ScheduleSlipRule;

impl ScheduleSlipRule {
    fn severity(ctx: &DetectionContext<'_>, gap: f64) -> Option<Severity> {
        let t = ctx.thresholds;
        if gap <= t.slip_tolerance_pct {
            None
        } else if gap >= t.slip_critical_pct {
            Some(Severity::Critical)
        } else if gap >= t.slip_high_pct {
            Some(Severity::High)
        } else {
            Some(Severity::Medium)
        }
    }

    fn unit_level(&self, ctx: &DetectionContext<'_>, out: &mut Vec<LeadingIndicator>) {
        for (idx, unit) in ctx.units.iter().enumerate() {
            if unit.status != UnitStatus::InProgress {
                continue;
            }
            let declared = match unit.progress_pct {
                Some(p) => p.clamp(0.0, 100.0),
                None => continue,
            };
            let planned = planned_progress_pct(unit, ctx.now);
            let gap = planned - declared;
            let severity = match Self::severity(ctx, gap) {
                Some(s) => s,
                None => continue,
            };

            let name = ctx.name_of(idx);
            let gap_text = format!("{:.0} points", gap);
            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::ScheduleSlip,
                title: format!(
                    "{} {} is {:.0}% complete against {:.0}% planned",
                    unit.unit_type, name, declared, planned
                ),
                description: format!(
                    "Work unit {} planned {} to {}; declared progress {:.0}%, planned progress {:.0}%.",
                    unit.id,
                    unit.planned_start.date(),
                    unit.planned_end.date(),
                    declared,
                    planned
                ),
                impact: format!(
                    "At the current rate {} will miss its planned finish on {}.",
                    name,
                    unit.planned_end.date()
                ),
                recommendation: recommendation(
                    IndicatorCategory::ScheduleSlip,
                    severity,
                    &TemplateParams {
                        subject: &name,
                        related: &gap_text,
                    },
                ),
                affected_items: vec![ctx.affected_unit(idx)],
                project_id: Some(unit.project_id.clone()),
                days_until_impact: Some(ctx.days_until(unit.planned_end)),
            };
            out.push(draft.into_indicator(ctx.now));
        }
    }

    fn project_level(&self, ctx: &DetectionContext<'_>, out: &mut Vec<LeadingIndicator>) {
        let mut by_project: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, unit) in ctx.units.iter().enumerate() {
            if declared_progress_pct(unit).is_some() {
                by_project.entry(unit.project_id.as_str()).or_default().push(idx);
            }
        }

        for (project_id, members) in by_project {
            if members.len() < ctx.thresholds.project_slip_min_units {
                continue;
            }
            let n = members.len() as f64;
            let planned: f64 = members
                .iter()
                .map(|i| planned_progress_pct(&ctx.units[*i], ctx.now))
                .sum::<f64>()
                / n;
            let declared: f64 = members
                .iter()
                .filter_map(|i| declared_progress_pct(&ctx.units[*i]))
                .sum::<f64>()
                / n;
            let gap = planned - declared;
            let severity = match Self::severity(ctx, gap) {
                Some(s) => s,
                None => continue,
            };

            let latest_end = members.iter().map(|i| ctx.units[*i].planned_end).max();
            let gap_text = format!("{:.0} points", gap);

            let mut affected_items = vec![AffectedItem::project(project_id)];
            affected_items.extend(
                members
                    .iter()
                    .filter(|i| {
                        let u = &ctx.units[**i];
                        declared_progress_pct(u)
                            .map_or(false, |d| planned_progress_pct(u, ctx.now) - d > ctx.thresholds.slip_tolerance_pct)
                    })
                    .map(|i| ctx.affected_unit(*i)),
            );

            let draft = IndicatorDraft {
                severity,
                category: IndicatorCategory::ScheduleSlip,
                title: format!(
                    "Project {} is {:.0}% complete against {:.0}% planned",
                    project_id, declared, planned
                ),
                description: format!(
                    "Average over {} work unit(s): declared progress {:.0}%, planned progress {:.0}%.",
                    members.len(),
                    declared,
                    planned
                ),
                impact: match latest_end {
                    Some(end) => format!("Project finish planned for {} is at risk.", end.date()),
                    None => "Project finish is at risk.".to_string(),
                },
                recommendation: recommendation(
                    IndicatorCategory::ScheduleSlip,
                    severity,
                    &TemplateParams {
                        subject: &format!("project {}", project_id),
                        related: &gap_text,
                    },
                ),
                affected_items,
                project_id: Some(project_id.to_string()),
                days_until_impact: latest_end.map(|end| ctx.days_until(end)),
            };
            out.push(draft.into_indicator(ctx.now));
        }
    }
}

impl DetectionRule for ScheduleSlipRule {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::ScheduleSlip
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<LeadingIndicator> {
        let mut out = Vec::new();
        self.unit_level(ctx, &mut out);
        self.project_level(ctx, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UnitType;
    use crate::engine::detector::test_support::*;

    fn in_progress(id: &str, start: i64, end: i64, pct: f64) -> WorkUnit {
        let mut u = unit(id, UnitType::Production, UnitStatus::InProgress, start, end);
        u.actual_start = Some(at_day(start));
        u.progress_pct = Some(pct);
        u
    }

    #[test]
    fn test_planned_progress_fraction() {
        // -2 天 08:00 → +2 天 08:00，now 为第 0 天 10:00 → 略超一半
        let u = in_progress("A", -2, 2, 0.0);
        let pct = planned_progress_pct(&u, now());
        assert!(pct > 50.0 && pct < 53.0, "{}", pct);
        assert_eq!(planned_progress_pct(&in_progress("B", -5, -1, 0.0), now()), 100.0);
        assert_eq!(planned_progress_pct(&in_progress("C", 1, 5, 0.0), now()), 0.0);
    }

    #[test]
    fn test_unit_gap_bands() {
        let fixture = Fixture::new(
            vec![
                in_progress("A", -2, 2, 45.0), // gap ≈ 7 → 容差内
                in_progress("B", -2, 2, 30.0), // gap ≈ 22 → medium
                in_progress("C", -2, 2, 15.0), // gap ≈ 37 → high
                in_progress("D", -5, -1, 10.0), // gap 90 → critical
            ],
            vec![],
        );
        let mut out = Vec::new();
        ScheduleSlipRule.unit_level(&fixture.ctx(), &mut out);
        let severities: Vec<(String, Severity)> = out
            .iter()
            .map(|i| (i.affected_items[0].id.clone(), i.severity))
            .collect();
        assert_eq!(
            severities,
            vec![
                ("B".to_string(), Severity::Medium),
                ("C".to_string(), Severity::High),
                ("D".to_string(), Severity::Critical),
            ]
        );
        assert_eq!(out[2].days_until_impact, Some(-1));
    }

    #[test]
    fn test_project_level_requires_minimum_units() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::NotStarted, -5, -1),
                unit("B", UnitType::Design, UnitStatus::NotStarted, -5, -1),
            ],
            vec![],
        );
        let mut out = Vec::new();
        ScheduleSlipRule.project_level(&fixture.ctx(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_project_level_average_gap() {
        let fixture = Fixture::new(
            vec![
                unit("A", UnitType::Design, UnitStatus::Completed, -5, -1),
                unit("B", UnitType::Design, UnitStatus::NotStarted, -5, -1),
                unit("C", UnitType::Design, UnitStatus::NotStarted, -5, -1),
            ],
            vec![],
        );
        let mut out = Vec::new();
        ScheduleSlipRule.project_level(&fixture.ctx(), &mut out);
        // 计划 100，申报 (100+0+0)/3 ≈ 33 → gap ≈ 67
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Critical);
        assert_eq!(out[0].affected_items[0].id, "P1");
        assert_eq!(out[0].affected_items.len(), 3);
    }
}
