// ==========================================
// 钢结构加工运营引擎 - 引擎编排器
// ==========================================
// 主流程: 快照 → 依赖图 → 阻塞 → 注册表（引用解析）→ 产能聚合 → 指标检测 / 筛选选项
// 无状态: 每次运行独立读取快照，运行之间不共享可变状态
// 截止时间: 整轮运行受 run_deadline 约束，超时整体失败（不返回部分结果）
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::capacity::CapacityLoad;
use crate::domain::dependency::DependencyEdge;
use crate::domain::indicator::IndicatorSummary;
use crate::engine::blocking::BlockingEvaluator;
use crate::engine::detector::{DetectionContext, LeadingIndicatorDetector};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::graph::{DependencyGraph, GraphStats};
use crate::engine::load::LoadAggregator;
use crate::engine::registry::{RegistryBuild, RegistryFilter, WorkUnitRegistry};
use crate::engine::snapshot::{EngineRepositories, EngineSnapshot, FilterOptions};
use crate::perf::RunTimer;
use crate::resolver::ReferenceResolver;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

// ==========================================
// OperationsRun - 统一运营视图的引擎输出
// ==========================================
#[derive(Debug, Clone)]
pub struct OperationsRun {
    pub registry: RegistryBuild,
    /// 与返回单元相关的依赖边（至少一端在返回集合内）
    pub edges: Vec<DependencyEdge>,
    pub capacity_loads: Vec<CapacityLoad>,
    pub graph_stats: GraphStats,
    /// 处于环上的单元 id（升序）
    pub cycle_unit_ids: Vec<String>,
    pub filter_options: FilterOptions,
}

/// 当前阶段（超时报告用）
#[derive(Debug, Default)]
struct StageTracker(Mutex<&'static str>);

impl StageTracker {
    fn enter(&self, stage: &'static str) {
        if let Ok(mut current) = self.0.lock() {
            *current = stage;
        }
    }

    fn current(&self) -> &'static str {
        self.0.lock().map(|s| *s).unwrap_or("unknown")
    }
}

// ==========================================
// OperationsEngine
// ==========================================
pub struct OperationsEngine {
    repos: EngineRepositories,
    resolver: Arc<dyn ReferenceResolver>,
    config: EngineConfig,
    detector: LeadingIndicatorDetector,
}

impl OperationsEngine {
    pub fn new(
        repos: EngineRepositories,
        resolver: Arc<dyn ReferenceResolver>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repos,
            resolver,
            config,
            detector: LeadingIndicatorDetector::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 统一运营视图
    pub async fn run_operations_view(
        &self,
        filter: &RegistryFilter,
        now: NaiveDateTime,
    ) -> EngineResult<OperationsRun> {
        filter.validate()?;
        let stage = StageTracker::default();
        self.with_deadline(&stage, self.operations_view_inner(filter, now, &stage))
            .await
    }

    /// 领先指标（全量，无过滤）
    pub async fn run_indicators(&self, now: NaiveDateTime) -> EngineResult<IndicatorSummary> {
        let stage = StageTracker::default();
        self.with_deadline(&stage, self.indicators_inner(now, &stage))
            .await
    }

    async fn with_deadline<T, F>(&self, stage: &StageTracker, run: F) -> EngineResult<T>
    where
        F: Future<Output = EngineResult<T>>,
    {
        let deadline_ms = self.config.run_deadline_ms;
        match tokio::time::timeout(self.config.run_deadline(), run).await {
            Ok(result) => result,
            Err(_) => {
                let stage = stage.current();
                tracing::error!(stage, deadline_ms, "引擎运行超时");
                Err(EngineError::DeadlineExceeded {
                    stage: stage.to_string(),
                    deadline_ms,
                })
            }
        }
    }

    async fn load_snapshot(&self, stage: &StageTracker) -> EngineResult<EngineSnapshot> {
        stage.enter("snapshot");
        match self.repos.load_snapshot_blocking().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::error!(error = %e, "快照读取失败，本轮运行终止");
                Err(EngineError::DataStore(e))
            }
        }
    }

    async fn load_filter_options(
        &self,
        filter: &RegistryFilter,
        stage: &StageTracker,
    ) -> EngineResult<FilterOptions> {
        stage.enter("filters");
        match self
            .repos
            .load_filter_options_blocking(filter.project_id.clone())
            .await
        {
            Ok(options) => Ok(options),
            Err(e) => {
                tracing::error!(error = %e, "筛选选项读取失败，本轮运行终止");
                Err(EngineError::DataStore(e))
            }
        }
    }

    async fn operations_view_inner(
        &self,
        filter: &RegistryFilter,
        now: NaiveDateTime,
        stage: &StageTracker,
    ) -> EngineResult<OperationsRun> {
        let mut timer = RunTimer::start("run_operations_view");

        let snapshot = self.load_snapshot(stage).await?;
        timer.mark("snapshot");

        stage.enter("graph");
        let graph = DependencyGraph::build(&snapshot.units, &snapshot.edges);
        timer.mark("graph");

        stage.enter("registry");
        let registry = WorkUnitRegistry::new(
            self.resolver.as_ref(),
            self.config.resolver_concurrency,
            self.config.fallback_name_len,
        )
        .build(&snapshot.units, &graph, filter)
        .await?;
        timer.mark("registry");

        stage.enter("capacity");
        let capacity_loads = LoadAggregator::new(self.config.capacity_bands.clone()).aggregate(
            &snapshot.capacities,
            &snapshot.units,
            now,
        );
        timer.mark("capacity");

        let returned: HashSet<&str> = registry.units.iter().map(|u| u.unit.id.as_str()).collect();
        let edges: Vec<DependencyEdge> = graph
            .edges()
            .iter()
            .filter(|e| {
                returned.contains(e.edge.from_unit_id.as_str())
                    || returned.contains(e.edge.to_unit_id.as_str())
            })
            .map(|e| e.edge.clone())
            .collect();

        let cycle_unit_ids: Vec<String> = graph
            .find_cycle_members()
            .into_iter()
            .map(|idx| graph.unit_id(idx).to_string())
            .collect();

        let filter_options = self.load_filter_options(filter, stage).await?;
        timer.mark("filters");

        Ok(OperationsRun {
            registry,
            edges,
            capacity_loads,
            graph_stats: graph.stats().clone(),
            cycle_unit_ids,
            filter_options,
        })
    }

    async fn indicators_inner(
        &self,
        now: NaiveDateTime,
        stage: &StageTracker,
    ) -> EngineResult<IndicatorSummary> {
        let mut timer = RunTimer::start("run_indicators");

        let snapshot = self.load_snapshot(stage).await?;
        timer.mark("snapshot");

        stage.enter("graph");
        let graph = DependencyGraph::build(&snapshot.units, &snapshot.edges);
        let blocked = BlockingEvaluator::new().evaluate_all(&graph);
        timer.mark("graph");

        stage.enter("registry");
        let registry = WorkUnitRegistry::new(
            self.resolver.as_ref(),
            self.config.resolver_concurrency,
            self.config.fallback_name_len,
        )
        .build(&snapshot.units, &graph, &RegistryFilter::all())
        .await?;
        timer.mark("registry");

        stage.enter("capacity");
        let loads = LoadAggregator::new(self.config.capacity_bands.clone()).aggregate(
            &snapshot.capacities,
            &snapshot.units,
            now,
        );
        timer.mark("capacity");

        stage.enter("detect");
        let ctx = DetectionContext {
            units: &snapshot.units,
            graph: &graph,
            blocked: &blocked,
            loads: &loads,
            names: &registry.display_names,
            thresholds: &self.config.detector,
            now,
            fallback_name_len: self.config.fallback_name_len,
        };
        let summary = self.detector.detect(&ctx);
        timer.mark("detect");

        Ok(summary)
    }
}
