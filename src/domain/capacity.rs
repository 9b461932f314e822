// ==========================================
// 钢结构加工运营引擎 - 资源产能领域模型
// ==========================================
// 约束: 启用状态下 capacity_per_day > 0
// 周产能 = 日产能 × 每周工作天数
// ==========================================

use crate::domain::types::{CapacityStatus, CapacityUnit, ResourceType};
use serde::{Deserialize, Serialize};

// ==========================================
// ResourceCapacity - 申报产能
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCapacity {
    pub id: String,
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub capacity_per_day: f64,
    pub unit: CapacityUnit,
    pub working_days_per_week: i32,
    pub is_active: bool,
    pub notes: Option<String>,
}

impl ResourceCapacity {
    /// 周产能
    ///
    /// 配置错误（日产能或工作天数 <= 0）时返回 0
    pub fn weekly_capacity(&self) -> f64 {
        if self.capacity_per_day <= 0.0 || self.working_days_per_week <= 0 {
            return 0.0;
        }
        self.capacity_per_day * self.working_days_per_week as f64
    }

    /// 利用率（百分比，四舍五入取整）
    ///
    /// 周产能为 0 时定义为 0，不报错
    pub fn utilization_pct(&self, load: f64) -> i64 {
        let weekly = self.weekly_capacity();
        if weekly <= 0.0 {
            return 0;
        }
        (load / weekly * 100.0).round() as i64
    }
}

// ==========================================
// CapacityLoad - 本周负荷聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityLoad {
    pub capacity_id: String,
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub unit: CapacityUnit,
    pub weekly_capacity: f64,
    pub current_load: f64,
    pub utilization_pct: i64,
    pub is_overloaded: bool,
    pub status: CapacityStatus,
    /// 贡献负荷的工作单元（按 id 排序）
    pub contributing_unit_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welder(capacity_per_day: f64, days: i32) -> ResourceCapacity {
        ResourceCapacity {
            id: "C1".to_string(),
            resource_type: ResourceType::Welder,
            resource_name: "焊接一组".to_string(),
            capacity_per_day,
            unit: CapacityUnit::Tons,
            working_days_per_week: days,
            is_active: true,
            notes: None,
        }
    }

    #[test]
    fn test_weekly_capacity() {
        assert_eq!(welder(8.0, 5).weekly_capacity(), 40.0);
        assert_eq!(welder(0.0, 5).weekly_capacity(), 0.0);
        assert_eq!(welder(8.0, 0).weekly_capacity(), 0.0);
        assert_eq!(welder(-3.0, 5).weekly_capacity(), 0.0);
    }

    #[test]
    fn test_utilization_rounding() {
        let cap = welder(8.0, 5);
        assert_eq!(cap.utilization_pct(45.0), 113); // 112.5 → 113
        assert_eq!(cap.utilization_pct(40.0), 100);
        assert_eq!(cap.utilization_pct(0.0), 0);
    }

    #[test]
    fn test_utilization_zero_capacity_guard() {
        assert_eq!(welder(0.0, 5).utilization_pct(999.0), 0);
    }
}
