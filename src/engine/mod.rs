// ==========================================
// 钢结构加工运营引擎 - 引擎层
// ==========================================
// 职责: 注册表 / 依赖图 / 阻塞判定 / 产能负荷 / 领先指标检测
// 红线: Engine 不拼 SQL（数据经 Repository 读取，名称经 ReferenceResolver 解析）
// 红线: 只读，不回写任何派生状态
// ==========================================

pub mod blocking;
pub mod detector;
pub mod error;
pub mod graph;
pub mod load;
pub mod mapping;
pub mod orchestrator;
pub mod registry;
pub mod snapshot;

pub use blocking::{BlockingEvaluator, BlockingInfo, NeighborEdge};
pub use detector::{DetectionContext, DetectionRule, LeadingIndicatorDetector};
pub use error::{EngineError, EngineResult};
pub use graph::{CascadeWalk, DependencyGraph, GraphEdge, GraphStats};
pub use load::{LoadAggregator, WeekWindow, OVERLOAD_THRESHOLD_PCT};
pub use mapping::{capacity_impact, compute_load, CapacityImpact};
pub use orchestrator::{OperationsEngine, OperationsRun};
pub use registry::{EnrichedWorkUnit, RegistryBuild, RegistryFilter, WorkUnitRegistry};
pub use snapshot::{EngineRepositories, EngineSnapshot, FilterOptions};
