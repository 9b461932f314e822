// ==========================================
// 钢结构加工运营引擎 - 领域层
// ==========================================
// 职责: 定义实体与枚举，不含 I/O
// ==========================================

pub mod capacity;
pub mod dependency;
pub mod indicator;
pub mod types;
pub mod work_unit;

pub use capacity::{CapacityLoad, ResourceCapacity};
pub use dependency::DependencyEdge;
pub use indicator::{AffectedItem, AffectedItemType, IndicatorSummary, LeadingIndicator};
pub use types::{
    CapacityStatus, CapacityUnit, DependencyType, IndicatorCategory, OriginModule, ResourceType,
    Severity, UnitStatus, UnitType,
};
pub use work_unit::{truncate_id, OriginRef, WorkUnit};
