// ==========================================
// 钢结构加工运营引擎 - 产能负荷聚合
// ==========================================
// 周窗口: 周日对齐，week_start = 今天 - 距周日天数（00:00），week_end = week_start + 7 天
// 贡献条件: 映射资源类型一致 + 未完成 + 计划区间与周窗口重叠（不按比例拆分）
// 利用率: round(load / weekly × 100)；周产能为 0 时利用率为 0 且不超载
// ==========================================

use crate::config::engine_config::CapacityBands;
use crate::domain::capacity::{CapacityLoad, ResourceCapacity};
use crate::domain::types::CapacityStatus;
use crate::domain::work_unit::WorkUnit;
use crate::engine::mapping::{compute_load, resource_type_for};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

/// 超载阈值（契约固定）
pub const OVERLOAD_THRESHOLD_PCT: i64 = 100;

/// 聚合周窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    pub fn containing(now: NaiveDateTime) -> Self {
        let today = now.date();
        let offset = today.weekday().num_days_from_sunday() as i64;
        let start = (today - Duration::days(offset)).and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(7),
        }
    }
}

pub struct LoadAggregator {
    bands: CapacityBands,
}

impl LoadAggregator {
    pub fn new(bands: CapacityBands) -> Self {
        Self { bands }
    }

    /// 状态分档
    pub fn status_for(&self, utilization_pct: i64) -> CapacityStatus {
        if utilization_pct > OVERLOAD_THRESHOLD_PCT {
            CapacityStatus::Overloaded
        } else if utilization_pct >= self.bands.high_pct {
            CapacityStatus::High
        } else if utilization_pct >= self.bands.moderate_pct {
            CapacityStatus::Moderate
        } else {
            CapacityStatus::Low
        }
    }

    /// 聚合所有启用产能的本周负荷
    ///
    /// 同一资源类型下的多条产能各自承担该类型的全部负荷
    pub fn aggregate(
        &self,
        capacities: &[ResourceCapacity],
        units: &[WorkUnit],
        now: NaiveDateTime,
    ) -> Vec<CapacityLoad> {
        let window = WeekWindow::containing(now);

        let loads: Vec<CapacityLoad> = capacities
            .iter()
            .filter(|c| c.is_active)
            .map(|capacity| self.aggregate_one(capacity, units, window))
            .collect();

        let overloaded = loads.iter().filter(|l| l.is_overloaded).count();
        tracing::info!(
            capacities = loads.len(),
            overloaded,
            week_start = %window.start,
            "产能负荷聚合完成"
        );
        loads
    }

    fn aggregate_one(
        &self,
        capacity: &ResourceCapacity,
        units: &[WorkUnit],
        window: WeekWindow,
    ) -> CapacityLoad {
        let mut contributing: Vec<&WorkUnit> = units
            .iter()
            .filter(|u| resource_type_for(u.unit_type) == capacity.resource_type)
            .filter(|u| !u.is_completed())
            .filter(|u| u.overlaps(window.start, window.end))
            .collect();
        contributing.sort_by(|a, b| a.id.cmp(&b.id));

        let current_load: f64 = contributing.iter().map(|u| compute_load(u)).sum();
        let weekly_capacity = capacity.weekly_capacity();
        let utilization_pct = capacity.utilization_pct(current_load);
        let is_overloaded = weekly_capacity > 0.0 && utilization_pct > OVERLOAD_THRESHOLD_PCT;

        if weekly_capacity <= 0.0 {
            tracing::warn!(
                capacity_id = %capacity.id,
                resource_name = %capacity.resource_name,
                "周产能为 0（日产能或工作天数配置错误），利用率按 0 处理"
            );
        }

        CapacityLoad {
            capacity_id: capacity.id.clone(),
            resource_type: capacity.resource_type,
            resource_name: capacity.resource_name.clone(),
            unit: capacity.unit,
            weekly_capacity,
            current_load,
            utilization_pct,
            is_overloaded,
            status: self.status_for(utilization_pct),
            contributing_unit_ids: contributing.iter().map(|u| u.id.clone()).collect(),
        }
    }
}

impl Default for LoadAggregator {
    fn default() -> Self {
        Self::new(CapacityBands::default())
    }
}
