// ==========================================
// 钢结构加工运营引擎 - 领先指标 API
// ==========================================
// 无过滤条件；返回汇总（总数/按严重度/按类别）+ 排序后的全部指标
// 下游（驾驶舱/对话助手）必须原样引用指标字段
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::indicator::IndicatorSummary;
use crate::engine::orchestrator::OperationsEngine;
use chrono::NaiveDateTime;
use std::sync::Arc;

pub struct IndicatorApi {
    engine: Arc<OperationsEngine>,
}

impl IndicatorApi {
    pub fn new(engine: Arc<OperationsEngine>) -> Self {
        Self { engine }
    }

    pub async fn get_leading_indicators(&self) -> ApiResult<IndicatorSummary> {
        self.get_leading_indicators_at(chrono::Local::now().naive_local())
            .await
    }

    pub async fn get_leading_indicators_at(&self, now: NaiveDateTime) -> ApiResult<IndicatorSummary> {
        Ok(self.engine.run_indicators(now).await?)
    }
}
