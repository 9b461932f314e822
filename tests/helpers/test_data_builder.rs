// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fab_ops_engine::domain::capacity::ResourceCapacity;
use fab_ops_engine::domain::types::{CapacityUnit, OriginModule, ResourceType, UnitStatus, UnitType};
use fab_ops_engine::domain::work_unit::{OriginRef, WorkUnit};

/// 固定评估时间: 2026-03-04（周三）10:00
pub fn eval_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 4)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// 相对评估日的某天 08:00
pub fn day(offset: i64) -> NaiveDateTime {
    (eval_now().date() + Duration::days(offset))
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

// ==========================================
// WorkUnit 构建器
// ==========================================

pub struct WorkUnitBuilder {
    unit: WorkUnit,
}

impl WorkUnitBuilder {
    pub fn new(id: &str, unit_type: UnitType) -> Self {
        let module = match unit_type {
            UnitType::Design => OriginModule::Task,
            UnitType::Procurement => OriginModule::PurchaseOrder,
            UnitType::Production => OriginModule::ProductionRun,
            UnitType::QC => OriginModule::InspectionRequest,
            UnitType::Documentation => OriginModule::Document,
        };
        Self {
            unit: WorkUnit {
                id: id.to_string(),
                unit_type,
                status: UnitStatus::NotStarted,
                origin: OriginRef::new(module, format!("SRC-{}", id)),
                owner_id: None,
                project_id: "P1".to_string(),
                planned_start: day(0),
                planned_end: day(1),
                actual_start: None,
                actual_end: None,
                quantity: None,
                weight: None,
                progress_pct: None,
            },
        }
    }

    pub fn status(mut self, status: UnitStatus) -> Self {
        self.unit.status = status;
        if matches!(status, UnitStatus::InProgress | UnitStatus::Completed)
            && self.unit.actual_start.is_none()
        {
            self.unit.actual_start = Some(self.unit.planned_start);
        }
        self
    }

    /// 计划区间（相对评估日的天数偏移）
    pub fn planned(mut self, start_offset: i64, end_offset: i64) -> Self {
        self.unit.planned_start = day(start_offset);
        self.unit.planned_end = day(end_offset);
        if self.unit.actual_start.is_some() {
            self.unit.actual_start = Some(self.unit.planned_start);
        }
        self
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.unit.project_id = project_id.to_string();
        self
    }

    pub fn origin_record(mut self, record_id: &str) -> Self {
        self.unit.origin.record_id = record_id.to_string();
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.unit.weight = Some(weight);
        self
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.unit.quantity = Some(quantity);
        self
    }

    pub fn progress(mut self, pct: f64) -> Self {
        self.unit.progress_pct = Some(pct);
        self
    }

    pub fn build(self) -> WorkUnit {
        self.unit
    }
}

// ==========================================
// ResourceCapacity 构建器
// ==========================================

pub struct CapacityBuilder {
    capacity: ResourceCapacity,
}

impl CapacityBuilder {
    pub fn new(id: &str, resource_type: ResourceType) -> Self {
        let unit = match resource_type {
            ResourceType::Welder | ResourceType::Laser => CapacityUnit::Tons,
            ResourceType::Designer => CapacityUnit::Drawings,
            ResourceType::QC | ResourceType::Procurement => CapacityUnit::Hours,
        };
        Self {
            capacity: ResourceCapacity {
                id: id.to_string(),
                resource_type,
                resource_name: format!("{} 班组", resource_type),
                capacity_per_day: 8.0,
                unit,
                working_days_per_week: 5,
                is_active: true,
                notes: None,
            },
        }
    }

    pub fn per_day(mut self, capacity_per_day: f64) -> Self {
        self.capacity.capacity_per_day = capacity_per_day;
        self
    }

    pub fn working_days(mut self, days: i32) -> Self {
        self.capacity.working_days_per_week = days;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.capacity.is_active = false;
        self
    }

    pub fn build(self) -> ResourceCapacity {
        self.capacity
    }
}
