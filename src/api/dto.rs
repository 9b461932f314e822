// ==========================================
// 钢结构加工运营引擎 - API 数据传输对象
// ==========================================
// 外层信封: {"status":"SUCCESS","data":…} / {"status":"FAILURE","error":{kind,message}}
// 空指标列表 + SUCCESS 才表示"无风险"
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::capacity::CapacityLoad;
use crate::domain::dependency::DependencyEdge;
use crate::domain::types::{CapacityUnit, ResourceType, UnitStatus, UnitType};
use crate::engine::graph::GraphStats;
use crate::engine::registry::EnrichedWorkUnit;
use crate::repository::{BuildingOption, ProjectOption};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 响应信封
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiResponse<T> {
    Success { data: T },
    Failure { error: ErrorBody },
}

impl<T> ApiResponse<T> {
    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => ApiResponse::Success { data },
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "API 调用失败");
                ApiResponse::Failure {
                    error: ErrorBody::from(&err),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { error } => Some(error),
        }
    }
}

impl<T> From<ApiResult<T>> for ApiResponse<T> {
    fn from(result: ApiResult<T>) -> Self {
        ApiResponse::from_result(result)
    }
}

// ==========================================
// 统一运营视图
// ==========================================

/// 运营视图请求（楼栋过滤要求同时指定项目）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationsViewRequest {
    pub project_id: Option<String>,
    pub building_id: Option<String>,
}

/// 聚合计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsCounts {
    pub total_units: usize,
    /// 全部状态键都存在
    pub by_status: BTreeMap<UnitStatus, usize>,
    /// 全部类型键都存在
    pub by_type: BTreeMap<UnitType, usize>,
    /// 计算得出的阻塞单元数
    pub blocked_count: usize,
    pub dependency_count: usize,
    pub overloaded_resources: usize,
}

impl OperationsCounts {
    pub fn tally(
        units: &[EnrichedWorkUnit],
        edges: &[DependencyEdge],
        capacity: &[CapacityLoad],
    ) -> Self {
        let mut by_status: BTreeMap<UnitStatus, usize> =
            UnitStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_type: BTreeMap<UnitType, usize> =
            UnitType::ALL.iter().map(|t| (*t, 0)).collect();

        for u in units {
            *by_status.entry(u.unit.status).or_insert(0) += 1;
            *by_type.entry(u.unit.unit_type).or_insert(0) += 1;
        }

        Self {
            total_units: units.len(),
            by_status,
            by_type,
            blocked_count: units.iter().filter(|u| u.blocking.is_blocked).count(),
            dependency_count: edges.len(),
            overloaded_resources: capacity.iter().filter(|c| c.is_overloaded).count(),
        }
    }
}

/// 筛选元数据（供前端下拉框）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMetadata {
    pub projects: Vec<ProjectOption>,
    /// 仅在选定项目时返回该项目的楼栋
    pub buildings: Vec<BuildingOption>,
    pub selected_project_id: Option<String>,
    pub selected_building_id: Option<String>,
}

/// 依赖图健康状况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphHealth {
    #[serde(flatten)]
    pub stats: GraphStats,
    pub cycle_unit_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsViewResponse {
    pub units: Vec<EnrichedWorkUnit>,
    pub edges: Vec<DependencyEdge>,
    pub capacity: Vec<CapacityLoad>,
    pub counts: OperationsCounts,
    pub filters: FilterMetadata,
    pub graph: GraphHealth,
    pub generated_at: NaiveDateTime,
}

// ==========================================
// 产能申报
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareCapacityRequest {
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub capacity_per_day: f64,
    pub unit: CapacityUnit,
    pub working_days_per_week: i32,
    pub notes: Option<String>,
}
