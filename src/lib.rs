// ==========================================
// 钢结构加工运营引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 只读研判引擎（运营视图 + 领先指标），不回写业务数据
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引用解析层 - 显示名称 / 楼栋
pub mod resolver;

// 引擎层 - 依赖图、阻塞、负荷、领先指标
pub mod engine;

// 配置层 - 阈值与运行参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 查询接口
pub mod api;

// 应用层 - 实例组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CapacityStatus, CapacityUnit, DependencyType, IndicatorCategory, OriginModule, ResourceType,
    Severity, UnitStatus, UnitType,
};

// 领域实体
pub use domain::{
    AffectedItem, CapacityLoad, DependencyEdge, IndicatorSummary, LeadingIndicator,
    ResourceCapacity, WorkUnit,
};

// 引擎
pub use engine::{
    DependencyGraph, EngineError, LeadingIndicatorDetector, LoadAggregator, OperationsEngine,
    RegistryFilter,
};

// API
pub use api::{ApiError, ApiResponse, CapacityApi, IndicatorApi, OperationsApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钢结构加工运营引擎";
