// ==========================================
// 钢结构加工运营引擎 - 工作单元注册表
// ==========================================
// 职责: 快照中的工作单元 → 带名称/楼栋/产能影响/阻塞信息的统一视图
// 流程:
//   1. 按项目过滤（内存）
//   2. 收集范围内单元及其直接邻居的来源引用，去重后并发解析（运行级缓存）
//   3. 按解析出的楼栋过滤（楼栋不存于工作单元，只能解析后过滤）
//   4. 组装名称、产能影响、阻塞信息
// 容错: 单条来源解析失败 → 名称回退为截断 id，楼栋为空，不影响其他单元
// ==========================================

use crate::domain::work_unit::{OriginRef, WorkUnit};
use crate::engine::blocking::{BlockingEvaluator, BlockingInfo};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::graph::DependencyGraph;
use crate::engine::mapping::{capacity_impact, CapacityImpact};
use crate::resolver::{BuildingRef, ReferenceResolver, ResolutionCache};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 注册表过滤条件（楼栋过滤要求同时指定项目）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFilter {
    pub project_id: Option<String>,
    pub building_id: Option<String>,
}

impl RegistryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn project(project_id: &str) -> Self {
        Self {
            project_id: Some(project_id.to_string()),
            building_id: None,
        }
    }

    pub fn building(project_id: &str, building_id: &str) -> Self {
        Self {
            project_id: Some(project_id.to_string()),
            building_id: Some(building_id.to_string()),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.building_id.is_some() && self.project_id.is_none() {
            return Err(EngineError::InvalidFilter(
                "按楼栋过滤时必须同时指定项目".to_string(),
            ));
        }
        Ok(())
    }

    fn includes_project(&self, unit: &WorkUnit) -> bool {
        self.project_id
            .as_deref()
            .map_or(true, |p| unit.project_id == p)
    }

    fn includes_building(&self, building: Option<&BuildingRef>) -> bool {
        match self.building_id.as_deref() {
            None => true,
            Some(wanted) => building.map_or(false, |b| b.building_id == wanted),
        }
    }
}

/// 统一视图中的工作单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedWorkUnit {
    #[serde(flatten)]
    pub unit: WorkUnit,
    pub display_name: String,
    pub building: Option<BuildingRef>,
    pub capacity_impact: CapacityImpact,
    pub blocking: BlockingInfo,
}

/// 注册表构建结果
#[derive(Debug, Clone, Default)]
pub struct RegistryBuild {
    /// 过滤后的工作单元（按 id 排序）
    pub units: Vec<EnrichedWorkUnit>,
    /// 已解析单元的显示名称（含范围外的直接邻居）
    pub display_names: HashMap<String, String>,
    pub resolver_lookups: usize,
    pub resolver_failures: usize,
}

impl RegistryBuild {
    /// 显示名称；未解析的单元回退为截断 id
    pub fn name_of(&self, unit: &WorkUnit, fallback_len: usize) -> String {
        self.display_names
            .get(&unit.id)
            .cloned()
            .unwrap_or_else(|| unit.short_id(fallback_len))
    }
}

// ==========================================
// WorkUnitRegistry
// ==========================================
pub struct WorkUnitRegistry<'a> {
    resolver: &'a dyn ReferenceResolver,
    concurrency: usize,
    fallback_name_len: usize,
    blocking: BlockingEvaluator,
}

impl<'a> WorkUnitRegistry<'a> {
    pub fn new(resolver: &'a dyn ReferenceResolver, concurrency: usize, fallback_name_len: usize) -> Self {
        Self {
            resolver,
            concurrency,
            fallback_name_len,
            blocking: BlockingEvaluator::new(),
        }
    }

    /// 构建注册表
    ///
    /// `units` 与 `graph` 必须来自同一快照（图的节点索引即 `units` 下标）
    pub async fn build(
        &self,
        units: &[WorkUnit],
        graph: &DependencyGraph,
        filter: &RegistryFilter,
    ) -> EngineResult<RegistryBuild> {
        filter.validate()?;

        let in_scope: Vec<usize> = (0..units.len())
            .filter(|idx| filter.includes_project(&units[*idx]))
            .collect();

        // 范围内单元 + 直接邻居（阻塞信息需要邻居名称）
        let mut named: BTreeSet<usize> = in_scope.iter().copied().collect();
        for idx in &in_scope {
            named.extend(graph.upstream_edges(*idx).map(|e| e.from));
            named.extend(graph.downstream_edges(*idx).map(|e| e.to));
        }

        let origins: Vec<&OriginRef> = named.iter().map(|idx| &units[*idx].origin).collect();
        let mut cache = ResolutionCache::new();
        cache
            .resolve_missing(self.resolver, origins, self.concurrency)
            .await;

        let display_names: HashMap<String, String> = named
            .iter()
            .map(|idx| {
                let unit = &units[*idx];
                (
                    unit.id.clone(),
                    cache.display_name(&unit.origin, &unit.id, self.fallback_name_len),
                )
            })
            .collect();

        let name_of = |idx: usize| {
            display_names
                .get(graph.unit_id(idx))
                .cloned()
                .unwrap_or_else(|| units[idx].short_id(self.fallback_name_len))
        };

        let mut enriched = Vec::with_capacity(in_scope.len());
        for idx in in_scope {
            let unit = &units[idx];
            let building = cache.building(&unit.origin).cloned();
            if !filter.includes_building(building.as_ref()) {
                continue;
            }

            enriched.push(EnrichedWorkUnit {
                display_name: name_of(idx),
                building,
                capacity_impact: capacity_impact(unit),
                blocking: self.blocking.blocking_info(graph, idx, &name_of),
                unit: unit.clone(),
            });
        }
        enriched.sort_by(|a, b| a.unit.id.cmp(&b.unit.id));

        let build = RegistryBuild {
            units: enriched,
            display_names,
            resolver_lookups: cache.lookup_count(),
            resolver_failures: cache.failure_count(),
        };

        tracing::info!(
            units = build.units.len(),
            distinct_origins = build.resolver_lookups,
            resolver_failures = build.resolver_failures,
            project_id = ?filter.project_id,
            building_id = ?filter.building_id,
            "工作单元注册表构建完成"
        );

        Ok(build)
    }
}
