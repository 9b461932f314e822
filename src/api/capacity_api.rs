// ==========================================
// 钢结构加工运营引擎 - 产能申报 API
// ==========================================
// 职责: 申报/查询资源产能（引擎只消费产能记录，不参与申报流程）
// 校验: 日产能 > 0，每周工作天数 1..=7，名称非空
// ==========================================

use crate::api::dto::DeclareCapacityRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::capacity::ResourceCapacity;
use crate::perf::PerfGuard;
use crate::repository::ResourceCapacityRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct CapacityApi {
    capacity_repo: Arc<ResourceCapacityRepository>,
}

impl CapacityApi {
    pub fn new(capacity_repo: Arc<ResourceCapacityRepository>) -> Self {
        Self { capacity_repo }
    }

    fn validate(request: &DeclareCapacityRequest) -> ApiResult<()> {
        if request.resource_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("资源名称不能为空".to_string()));
        }
        if !request.capacity_per_day.is_finite() || request.capacity_per_day <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "日产能必须大于 0: {}",
                request.capacity_per_day
            )));
        }
        if !(1..=7).contains(&request.working_days_per_week) {
            return Err(ApiError::InvalidInput(format!(
                "每周工作天数必须在 1~7 之间: {}",
                request.working_days_per_week
            )));
        }
        Ok(())
    }

    /// 申报产能，返回入库记录
    pub fn declare_capacity(&self, request: DeclareCapacityRequest) -> ApiResult<ResourceCapacity> {
        let _perf = PerfGuard::new("declare_capacity");
        Self::validate(&request)?;

        let capacity = ResourceCapacity {
            id: Uuid::new_v4().to_string(),
            resource_type: request.resource_type,
            resource_name: request.resource_name.trim().to_string(),
            capacity_per_day: request.capacity_per_day,
            unit: request.unit,
            working_days_per_week: request.working_days_per_week,
            is_active: true,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        self.capacity_repo.insert(&capacity)?;

        tracing::info!(
            capacity_id = %capacity.id,
            resource_type = %capacity.resource_type,
            weekly_capacity = capacity.weekly_capacity(),
            "产能申报完成"
        );
        Ok(capacity)
    }

    pub fn list_capacities(&self) -> ApiResult<Vec<ResourceCapacity>> {
        let _perf = PerfGuard::new("list_capacities");
        Ok(self.capacity_repo.list_active()?)
    }

    pub fn get_capacity(&self, id: &str) -> ApiResult<ResourceCapacity> {
        self.capacity_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ResourceCapacity(id={})不存在", id)))
    }
}
