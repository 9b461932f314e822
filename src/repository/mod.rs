// ==========================================
// 钢结构加工运营引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供只读数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod capacity_repo;
pub mod dependency_repo;
pub mod error;
pub mod project_repo;
pub mod work_unit_repo;

// 重导出核心仓储
pub use capacity_repo::ResourceCapacityRepository;
pub use dependency_repo::DependencyEdgeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use project_repo::{BuildingOption, ProjectOption, ProjectRepository};
pub use work_unit_repo::WorkUnitRepository;
