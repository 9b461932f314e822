// ==========================================
// 领先指标 端到端测试
// ==========================================
// 测试范围:
// 1. task_delay + cascade_risk: 采购延误阻塞生产
// 2. resource_overload: 本周焊接超载（含配置覆盖阈值）
// 3. procurement_risk / schedule_slip
// 4. 幂等: 同一快照重复运行结果一致（指标 id 除外）
// ==========================================

mod helpers;

use fab_ops_engine::config::config_keys;
use fab_ops_engine::domain::indicator::{AffectedItemType, IndicatorSummary, LeadingIndicator};
use fab_ops_engine::domain::types::{IndicatorCategory, ResourceType, Severity, UnitStatus, UnitType};
use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::{eval_now, CapacityBuilder, WorkUnitBuilder};

fn of_category(summary: &IndicatorSummary, category: IndicatorCategory) -> Vec<&LeadingIndicator> {
    summary
        .indicators
        .iter()
        .filter(|i| i.category == category)
        .collect()
}

fn overloaded_welding_env() -> ApiTestEnv {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[
        WorkUnitBuilder::new("PRD-1", UnitType::Production)
            .status(UnitStatus::InProgress)
            .planned(-1, 1)
            .weight(10.0)
            .build(),
        WorkUnitBuilder::new("PRD-2", UnitType::Production)
            .status(UnitStatus::InProgress)
            .planned(-1, 2)
            .weight(15.0)
            .build(),
        WorkUnitBuilder::new("PRD-3", UnitType::Production)
            .status(UnitStatus::InProgress)
            .planned(-1, 3)
            .weight(20.0)
            .build(),
    ]);
    env.add_capacity(
        &CapacityBuilder::new("CAP-WELD", ResourceType::Welder)
            .per_day(8.0)
            .working_days(5)
            .build(),
    );
    env
}

// ==========================================
// 延误 + 级联
// ==========================================

#[tokio::test]
async fn test_delayed_procurement_cascades_to_production_采购延误级联() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[
        WorkUnitBuilder::new("PRC-1", UnitType::Procurement)
            .planned(-1, 2)
            .build(),
        WorkUnitBuilder::new("PRD-1", UnitType::Production)
            .planned(10, 12)
            .weight(12.0)
            .build(),
    ]);
    env.add_fs_edge("E1", "PRC-1", "PRD-1");

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    let delays = of_category(&summary, IndicatorCategory::TaskDelay);
    assert_eq!(delays.len(), 1);
    assert_eq!(delays[0].severity, Severity::Critical);
    assert_eq!(delays[0].affected_items[0].id, "PRC-1");
    assert_eq!(delays[0].days_until_impact, Some(-1));

    let cascades = of_category(&summary, IndicatorCategory::CascadeRisk);
    assert_eq!(cascades.len(), 1);
    let cascade = cascades[0];
    assert_eq!(cascade.affected_items[0].id, "PRC-1");
    assert_eq!(cascade.affected_items[1].id, "PRD-1");
    assert_eq!(cascade.affected_items[1].item_type, AffectedItemType::WorkUnit);
    assert_eq!(cascade.project_id.as_deref(), Some("P1"));
    assert_eq!(cascade.days_until_impact, Some(10));

    // 生产单元 10 天后才开工，不触发采购风险
    assert!(of_category(&summary, IndicatorCategory::ProcurementRisk).is_empty());

    assert_eq!(summary.total, summary.indicators.len());
    assert_eq!(summary.by_category[&IndicatorCategory::CascadeRisk], 1);
    assert_eq!(
        summary.by_severity.values().sum::<usize>(),
        summary.indicators.len()
    );
}

#[tokio::test]
async fn test_indicators_sorted_by_severity() {
    let env = overloaded_welding_env();
    env.add_units(&[WorkUnitBuilder::new("PRC-9", UnitType::Procurement)
        .planned(-2, 1)
        .build()]);

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    assert!(summary.indicators.len() >= 2);
    for pair in summary.indicators.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }
    assert_eq!(summary.indicators[0].severity, Severity::Critical);
}

// ==========================================
// 资源超载
// ==========================================

#[tokio::test]
async fn test_welding_overload_indicator_焊接超载() {
    let env = overloaded_welding_env();

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    let overloads = of_category(&summary, IndicatorCategory::ResourceOverload);
    assert_eq!(overloads.len(), 1);
    let overload = overloads[0];
    // 113% 落在默认 (100, 125] 区间
    assert_eq!(overload.severity, Severity::Medium);
    assert_eq!(overload.affected_items[0].item_type, AffectedItemType::Resource);
    assert_eq!(overload.affected_items[0].id, "CAP-WELD");
    assert_eq!(overload.affected_items.len(), 4);
    assert_eq!(overload.days_until_impact, Some(0));
    assert!(overload.project_id.is_none());
    assert!(overload.title.contains("113%"));
}

#[tokio::test]
async fn test_overload_threshold_from_config() {
    let env = overloaded_welding_env();
    env.set_config(config_keys::OVERLOAD_HIGH_PCT, "110");

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    let overloads = of_category(&summary, IndicatorCategory::ResourceOverload);
    assert_eq!(overloads[0].severity, Severity::High);
}

#[tokio::test]
async fn test_no_risk_means_empty_success() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("DES-1", UnitType::Design)
        .planned(20, 25)
        .quantity(3.0)
        .build()]);

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert!(summary.indicators.is_empty());
    assert_eq!(summary.by_severity.values().sum::<usize>(), 0);
}

// ==========================================
// 采购风险 / 进度偏差
// ==========================================

#[tokio::test]
async fn test_pending_procurement_before_production_采购风险() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[
        WorkUnitBuilder::new("PRC-1", UnitType::Procurement)
            .planned(1, 2)
            .build(),
        WorkUnitBuilder::new("PRD-1", UnitType::Production)
            .planned(2, 4)
            .weight(5.0)
            .build(),
    ]);
    env.add_fs_edge("E1", "PRC-1", "PRD-1");

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    let risks = of_category(&summary, IndicatorCategory::ProcurementRisk);
    assert_eq!(risks.len(), 1);
    assert_eq!(risks[0].severity, Severity::High);
    assert_eq!(risks[0].affected_items[0].id, "PRD-1");
    assert_eq!(risks[0].affected_items[1].id, "PRC-1");
    assert_eq!(risks[0].days_until_impact, Some(2));
    assert!(risks[0].recommendation.starts_with("Expedite upstream procurement"));
}

#[tokio::test]
async fn test_declared_progress_behind_plan_进度偏差() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("DES-1", UnitType::Design)
        .status(UnitStatus::InProgress)
        .planned(-5, 5)
        .progress(10.0)
        .build()]);

    let summary = env
        .start()
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();

    let slips = of_category(&summary, IndicatorCategory::ScheduleSlip);
    assert_eq!(slips.len(), 1);
    // 计划进度约 51%，申报 10%
    assert_eq!(slips[0].severity, Severity::High);
    assert_eq!(slips[0].days_until_impact, Some(5));
}

// ==========================================
// 幂等
// ==========================================

#[tokio::test]
async fn test_repeated_runs_are_identical_幂等() {
    let env = overloaded_welding_env();
    env.add_units(&[
        WorkUnitBuilder::new("PRC-1", UnitType::Procurement).planned(-1, 2).build(),
        WorkUnitBuilder::new("PRD-9", UnitType::Production).planned(2, 4).build(),
    ]);
    env.add_fs_edge("E1", "PRC-1", "PRD-9");
    let state = env.start();

    let first = state.indicator_api.get_leading_indicators_at(eval_now()).await.unwrap();
    let second = state.indicator_api.get_leading_indicators_at(eval_now()).await.unwrap();

    let strip = |s: &IndicatorSummary| {
        s.indicators
            .iter()
            .map(|i| {
                let mut i = i.clone();
                i.id = String::new();
                i
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&first), strip(&second));
    assert_eq!(first.by_severity, second.by_severity);
    assert_eq!(first.by_category, second.by_category);
}
