// ==========================================
// 钢结构加工运营引擎 - API 层
// ==========================================
// 职责: 两个只读查询面（统一运营视图 / 领先指标）+ 产能申报
// 约定: 对外统一包装为 ApiResponse 信封
// ==========================================

pub mod capacity_api;
pub mod dto;
pub mod error;
pub mod indicator_api;
pub mod operations_api;

// 重导出核心类型
pub use capacity_api::CapacityApi;
pub use dto::{
    ApiResponse, DeclareCapacityRequest, ErrorBody, FilterMetadata, GraphHealth, OperationsCounts,
    OperationsViewRequest, OperationsViewResponse,
};
pub use error::{ApiError, ApiResult};
pub use indicator_api::IndicatorApi;
pub use operations_api::OperationsApi;
