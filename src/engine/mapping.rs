// ==========================================
// 钢结构加工运营引擎 - 工作类型 → 资源映射与负荷折算
// ==========================================
// 负荷优先级:
//   1. 映射单位为 Tons 且有重量 → 重量
//   2. 映射单位为 Drawings 且有数量 → 数量
//   3. 有数量 → 数量
//   4. 否则 → 计划工期(天, 向上取整) × 8 小时
// ==========================================

use crate::domain::types::{CapacityUnit, ResourceType, UnitType};
use crate::domain::work_unit::WorkUnit;
use serde::{Deserialize, Serialize};

/// 无数量/重量时按每天 8 小时估算
pub const HOURS_PER_DAY: f64 = 8.0;

pub fn resource_type_for(unit_type: UnitType) -> ResourceType {
    match unit_type {
        UnitType::Production => ResourceType::Welder,
        UnitType::Design => ResourceType::Designer,
        UnitType::QC => ResourceType::QC,
        UnitType::Procurement => ResourceType::Procurement,
        UnitType::Documentation => ResourceType::Designer,
    }
}

pub fn capacity_unit_for(unit_type: UnitType) -> CapacityUnit {
    match unit_type {
        UnitType::Production => CapacityUnit::Tons,
        UnitType::Design => CapacityUnit::Drawings,
        UnitType::QC => CapacityUnit::Hours,
        UnitType::Procurement => CapacityUnit::Hours,
        UnitType::Documentation => CapacityUnit::Drawings,
    }
}

/// 工作单元的产能影响
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityImpact {
    pub resource_type: ResourceType,
    pub unit: CapacityUnit,
    pub load: f64,
}

pub fn compute_load(work_unit: &WorkUnit) -> f64 {
    let unit = capacity_unit_for(work_unit.unit_type);

    match (unit, work_unit.weight, work_unit.quantity) {
        (CapacityUnit::Tons, Some(weight), _) => weight,
        (CapacityUnit::Drawings, _, Some(quantity)) => quantity,
        (_, _, Some(quantity)) => quantity,
        _ => work_unit.planned_duration_days() as f64 * HOURS_PER_DAY,
    }
}

pub fn capacity_impact(work_unit: &WorkUnit) -> CapacityImpact {
    CapacityImpact {
        resource_type: resource_type_for(work_unit.unit_type),
        unit: capacity_unit_for(work_unit.unit_type),
        load: compute_load(work_unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{OriginModule, UnitStatus};
    use crate::domain::work_unit::OriginRef;
    use chrono::NaiveDate;

    fn unit(unit_type: UnitType, quantity: Option<f64>, weight: Option<f64>) -> WorkUnit {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        WorkUnit {
            id: "WU-1".to_string(),
            unit_type,
            status: UnitStatus::NotStarted,
            origin: OriginRef::new(OriginModule::Task, "T1"),
            owner_id: None,
            project_id: "P1".to_string(),
            planned_start: start,
            planned_end: start + chrono::Duration::hours(60), // 2.5 天 → 3
            actual_start: None,
            actual_end: None,
            quantity,
            weight,
            progress_pct: None,
        }
    }

    #[test]
    fn test_tons_prefers_weight_over_quantity() {
        let u = unit(UnitType::Production, Some(4.0), Some(12.5));
        assert_eq!(compute_load(&u), 12.5);
    }

    #[test]
    fn test_tons_without_weight_uses_quantity() {
        let u = unit(UnitType::Production, Some(4.0), None);
        assert_eq!(compute_load(&u), 4.0);
    }

    #[test]
    fn test_drawings_uses_quantity() {
        let u = unit(UnitType::Documentation, Some(30.0), Some(99.0));
        assert_eq!(compute_load(&u), 30.0);
    }

    #[test]
    fn test_hours_quantity_then_duration_fallback() {
        assert_eq!(compute_load(&unit(UnitType::QC, Some(6.0), None)), 6.0);
        assert_eq!(compute_load(&unit(UnitType::QC, None, Some(3.0))), 24.0);
        assert_eq!(compute_load(&unit(UnitType::Production, None, None)), 24.0);
    }

    #[test]
    fn test_mapping_tables() {
        let impact = capacity_impact(&unit(UnitType::Documentation, None, None));
        assert_eq!(impact.resource_type, ResourceType::Designer);
        assert_eq!(impact.unit, CapacityUnit::Drawings);
        assert_eq!(resource_type_for(UnitType::Production), ResourceType::Welder);
        assert_eq!(capacity_unit_for(UnitType::Procurement), CapacityUnit::Hours);
    }
}
