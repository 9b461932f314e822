// ==========================================
// 钢结构加工运营引擎 - 领域类型定义
// ==========================================
// 序列化格式: 与数据库存储值一致
// 约定: from_db_str 解析失败返回 None，由仓储层转换为字段错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工作单元类型 (Work Unit Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Design,        // 深化设计
    Procurement,   // 采购
    Production,    // 生产制作
    QC,            // 质检
    Documentation, // 资料
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Design,
        UnitType::Procurement,
        UnitType::Production,
        UnitType::QC,
        UnitType::Documentation,
    ];

    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DESIGN" => Some(UnitType::Design),
            "PROCUREMENT" => Some(UnitType::Procurement),
            "PRODUCTION" => Some(UnitType::Production),
            "QC" => Some(UnitType::QC),
            "DOCUMENTATION" => Some(UnitType::Documentation),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnitType::Design => "Design",
            UnitType::Procurement => "Procurement",
            UnitType::Production => "Production",
            UnitType::QC => "QC",
            UnitType::Documentation => "Documentation",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工作单元状态 (Work Unit Status)
// ==========================================
// 生命周期: NotStarted → InProgress → Completed
// Blocked 为业务系统人工设置的粗粒度标记，
// 真正的阻塞判定以依赖图计算结果 (is_blocked) 为准
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    NotStarted,
    InProgress,
    Blocked,
    Completed,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 4] = [
        UnitStatus::NotStarted,
        UnitStatus::InProgress,
        UnitStatus::Blocked,
        UnitStatus::Completed,
    ];

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(['_', ' '], "").as_str() {
            "NOTSTARTED" => Some(UnitStatus::NotStarted),
            "INPROGRESS" => Some(UnitStatus::InProgress),
            "BLOCKED" => Some(UnitStatus::Blocked),
            "COMPLETED" => Some(UnitStatus::Completed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnitStatus::NotStarted => "NotStarted",
            UnitStatus::InProgress => "InProgress",
            UnitStatus::Blocked => "Blocked",
            UnitStatus::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, UnitStatus::Completed)
    }

    /// 生命周期是否允许从 self 迁移到 next
    ///
    /// Blocked 视为叠加状态：可从 NotStarted/InProgress 进入，也可回到原状态
    pub fn can_transition_to(&self, next: UnitStatus) -> bool {
        use UnitStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, Completed)
                | (NotStarted, Blocked)
                | (InProgress, Blocked)
                | (Blocked, NotStarted)
                | (Blocked, InProgress)
        )
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 依赖类型 (Dependency Type)
// ==========================================
// 当前阻塞判定只评估 FS，其余类型仅记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    FS, // 完成-开始
    SS, // 开始-开始
    FF, // 完成-完成
    SF, // 开始-完成
}

impl DependencyType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FS" => Some(DependencyType::FS),
            "SS" => Some(DependencyType::SS),
            "FF" => Some(DependencyType::FF),
            "SF" => Some(DependencyType::SF),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DependencyType::FS => "FS",
            DependencyType::SS => "SS",
            DependencyType::FF => "FF",
            DependencyType::SF => "SF",
        }
    }

    /// 是否参与阻塞判定
    pub fn is_blocking(&self) -> bool {
        matches!(self, DependencyType::FS)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 资源类型 (Resource Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Designer,
    Laser,
    Welder,
    QC,
    Procurement,
}

impl ResourceType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DESIGNER" => Some(ResourceType::Designer),
            "LASER" => Some(ResourceType::Laser),
            "WELDER" => Some(ResourceType::Welder),
            "QC" => Some(ResourceType::QC),
            "PROCUREMENT" => Some(ResourceType::Procurement),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResourceType::Designer => "Designer",
            ResourceType::Laser => "Laser",
            ResourceType::Welder => "Welder",
            ResourceType::QC => "QC",
            ResourceType::Procurement => "Procurement",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 产能单位 (Capacity Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityUnit {
    Hours,
    Tons,
    Drawings,
}

impl CapacityUnit {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HOURS" => Some(CapacityUnit::Hours),
            "TONS" => Some(CapacityUnit::Tons),
            "DRAWINGS" => Some(CapacityUnit::Drawings),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            CapacityUnit::Hours => "Hours",
            CapacityUnit::Tons => "Tons",
            CapacityUnit::Drawings => "Drawings",
        }
    }
}

impl fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 产能状态分档 (Capacity Status)
// ==========================================
// 顺序: Low < Moderate < High < Overloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapacityStatus {
    Low,
    Moderate,
    High,
    Overloaded,
}

impl fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityStatus::Low => write!(f, "Low"),
            CapacityStatus::Moderate => write!(f, "Moderate"),
            CapacityStatus::High => write!(f, "High"),
            CapacityStatus::Overloaded => write!(f, "Overloaded"),
        }
    }
}

// ==========================================
// 风险严重度 (Severity)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// 提升一档（Critical 封顶）
    pub fn escalate(self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 领先指标类别 (Indicator Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    TaskDelay,
    CascadeRisk,
    ResourceOverload,
    ProcurementRisk,
    ScheduleSlip,
}

impl IndicatorCategory {
    pub const ALL: [IndicatorCategory; 5] = [
        IndicatorCategory::TaskDelay,
        IndicatorCategory::CascadeRisk,
        IndicatorCategory::ResourceOverload,
        IndicatorCategory::ProcurementRisk,
        IndicatorCategory::ScheduleSlip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorCategory::TaskDelay => "task_delay",
            IndicatorCategory::CascadeRisk => "cascade_risk",
            IndicatorCategory::ResourceOverload => "resource_overload",
            IndicatorCategory::ProcurementRisk => "procurement_risk",
            IndicatorCategory::ScheduleSlip => "schedule_slip",
        }
    }
}

impl fmt::Display for IndicatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 来源业务模块 (Origin Module)
// ==========================================
// 工作单元的多态来源引用，只通过引用解析器解引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginModule {
    Task,
    PurchaseOrder,
    ProductionRun,
    InspectionRequest,
    Document,
}

impl OriginModule {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "task" | "tasks" => Some(OriginModule::Task),
            "purchase_order" | "purchase_orders" => Some(OriginModule::PurchaseOrder),
            "production_run" | "production_runs" => Some(OriginModule::ProductionRun),
            "inspection_request" | "inspection_requests" => Some(OriginModule::InspectionRequest),
            "document" | "documents" => Some(OriginModule::Document),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OriginModule::Task => "task",
            OriginModule::PurchaseOrder => "purchase_order",
            OriginModule::ProductionRun => "production_run",
            OriginModule::InspectionRequest => "inspection_request",
            OriginModule::Document => "document",
        }
    }
}

impl fmt::Display for OriginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::Medium.escalate(), Severity::High);
        assert_eq!(Severity::Critical.escalate(), Severity::Critical);
    }

    #[test]
    fn test_status_parsing_accepts_common_spellings() {
        assert_eq!(UnitStatus::from_db_str("NotStarted"), Some(UnitStatus::NotStarted));
        assert_eq!(UnitStatus::from_db_str("not_started"), Some(UnitStatus::NotStarted));
        assert_eq!(UnitStatus::from_db_str("IN PROGRESS"), Some(UnitStatus::InProgress));
        assert_eq!(UnitStatus::from_db_str("done"), None);
    }

    #[test]
    fn test_status_transitions() {
        assert!(UnitStatus::NotStarted.can_transition_to(UnitStatus::InProgress));
        assert!(UnitStatus::InProgress.can_transition_to(UnitStatus::Completed));
        assert!(!UnitStatus::NotStarted.can_transition_to(UnitStatus::Completed));
        assert!(!UnitStatus::Completed.can_transition_to(UnitStatus::InProgress));
    }

    #[test]
    fn test_only_fs_is_blocking() {
        assert!(DependencyType::FS.is_blocking());
        assert!(!DependencyType::SS.is_blocking());
        assert!(!DependencyType::FF.is_blocking());
        assert!(!DependencyType::SF.is_blocking());
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&IndicatorCategory::ResourceOverload).unwrap();
        assert_eq!(json, "\"resource_overload\"");
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
