// ==========================================
// 钢结构加工运营引擎 - 统一运营视图 API
// ==========================================
// 职责: 工作单元（阻塞/产能影响）+ 依赖边 + 产能汇总 + 聚合计数 + 筛选元数据
// 只读: 不修改工作单元、依赖边、产能
// ==========================================

use crate::api::dto::{
    FilterMetadata, GraphHealth, OperationsCounts, OperationsViewRequest, OperationsViewResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::engine::orchestrator::OperationsEngine;
use crate::engine::registry::RegistryFilter;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// 空白字符串视为未指定
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct OperationsApi {
    engine: Arc<OperationsEngine>,
}

impl OperationsApi {
    pub fn new(engine: Arc<OperationsEngine>) -> Self {
        Self { engine }
    }

    /// 统一运营视图（当前时间）
    pub async fn get_operations_view(
        &self,
        request: &OperationsViewRequest,
    ) -> ApiResult<OperationsViewResponse> {
        self.get_operations_view_at(request, chrono::Local::now().naive_local())
            .await
    }

    /// 统一运营视图（指定评估时间）
    pub async fn get_operations_view_at(
        &self,
        request: &OperationsViewRequest,
        now: NaiveDateTime,
    ) -> ApiResult<OperationsViewResponse> {
        let filter = RegistryFilter {
            project_id: normalize(&request.project_id),
            building_id: normalize(&request.building_id),
        };
        if filter.building_id.is_some() && filter.project_id.is_none() {
            return Err(ApiError::InvalidInput(
                "按楼栋过滤时必须同时指定项目".to_string(),
            ));
        }

        let run = self.engine.run_operations_view(&filter, now).await?;
        let filters = FilterMetadata {
            projects: run.filter_options.projects,
            buildings: run.filter_options.buildings,
            selected_project_id: filter.project_id,
            selected_building_id: filter.building_id,
        };

        let counts = OperationsCounts::tally(&run.registry.units, &run.edges, &run.capacity_loads);
        tracing::info!(
            units = counts.total_units,
            blocked = counts.blocked_count,
            dependencies = counts.dependency_count,
            overloaded = counts.overloaded_resources,
            "运营视图生成完成"
        );

        Ok(OperationsViewResponse {
            units: run.registry.units,
            edges: run.edges,
            capacity: run.capacity_loads,
            counts,
            filters,
            graph: GraphHealth {
                stats: run.graph_stats,
                cycle_unit_ids: run.cycle_unit_ids,
            },
            generated_at: now,
        })
    }
}
