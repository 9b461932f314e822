// ==========================================
// 钢结构加工运营引擎 - 只读快照
// ==========================================
// 每次运行各自读取一次快照，运行之间不共享可变状态
// 任一读取失败 → 本轮运行失败（不返回空结果冒充"无风险"）
// ==========================================

use crate::domain::capacity::ResourceCapacity;
use crate::domain::dependency::DependencyEdge;
use crate::domain::work_unit::WorkUnit;
use crate::perf::PerfGuard;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    BuildingOption, DependencyEdgeRepository, ProjectOption, ProjectRepository,
    ResourceCapacityRepository, WorkUnitRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 一次运行的输入快照
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    pub units: Vec<WorkUnit>,
    pub edges: Vec<DependencyEdge>,
    pub capacities: Vec<ResourceCapacity>,
}

/// 运营视图的筛选选项
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub projects: Vec<ProjectOption>,
    /// 仅在选中项目时填充
    pub buildings: Vec<BuildingOption>,
}

/// 引擎仓储集合
#[derive(Clone)]
pub struct EngineRepositories {
    pub work_unit_repo: Arc<WorkUnitRepository>,
    pub edge_repo: Arc<DependencyEdgeRepository>,
    pub capacity_repo: Arc<ResourceCapacityRepository>,
    pub project_repo: Arc<ProjectRepository>,
}

impl EngineRepositories {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            work_unit_repo: Arc::new(WorkUnitRepository::from_connection(conn.clone())),
            edge_repo: Arc::new(DependencyEdgeRepository::from_connection(conn.clone())),
            capacity_repo: Arc::new(ResourceCapacityRepository::from_connection(conn.clone())),
            project_repo: Arc::new(ProjectRepository::from_connection(conn)),
        }
    }

    /// 同步读取快照
    ///
    /// 工作单元读取全量（阻塞与级联需要跨项目的完整依赖图），项目过滤在引擎内完成
    pub fn load_snapshot(&self) -> RepositoryResult<EngineSnapshot> {
        let _perf = PerfGuard::new("load_snapshot");
        let units = self.work_unit_repo.list_all()?;
        let edges = self.edge_repo.list_all()?;
        let capacities = self.capacity_repo.list_active()?;

        tracing::debug!(
            units = units.len(),
            edges = edges.len(),
            capacities = capacities.len(),
            "快照读取完成"
        );

        Ok(EngineSnapshot {
            units,
            edges,
            capacities,
        })
    }

    /// 在阻塞线程池中读取快照
    pub async fn load_snapshot_blocking(&self) -> RepositoryResult<EngineSnapshot> {
        let repos = self.clone();
        tokio::task::spawn_blocking(move || repos.load_snapshot())
            .await
            .map_err(|e| RepositoryError::Other(anyhow::anyhow!("快照读取任务异常: {}", e)))?
    }

    pub fn load_filter_options(&self, project_id: Option<&str>) -> RepositoryResult<FilterOptions> {
        let _perf = PerfGuard::new("load_filter_options");
        let projects = self.project_repo.list_projects()?;
        let buildings = match project_id {
            Some(project_id) => self.project_repo.list_buildings(project_id)?,
            None => Vec::new(),
        };
        Ok(FilterOptions {
            projects,
            buildings,
        })
    }

    /// 在阻塞线程池中读取筛选选项
    pub async fn load_filter_options_blocking(
        &self,
        project_id: Option<String>,
    ) -> RepositoryResult<FilterOptions> {
        let repos = self.clone();
        tokio::task::spawn_blocking(move || repos.load_filter_options(project_id.as_deref()))
            .await
            .map_err(|e| RepositoryError::Other(anyhow::anyhow!("筛选选项读取任务异常: {}", e)))?
    }
}
