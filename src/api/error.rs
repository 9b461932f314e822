// ==========================================
// 钢结构加工运营引擎 - API层错误类型
// ==========================================
// 职责: 将 Repository / Engine 错误转换为可区分的 API 错误
// 红线: "零风险"与"引擎无法运行"必须可区分，失败一律带 kind 判别
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 运行错误
    // ==========================================
    /// 数据源不可读（本轮结果未知，不是"无风险"）
    #[error("数据源不可用: {0}")]
    DataStoreUnavailable(String),

    /// 引擎运行超时（与数据源故障区分）
    #[error("引擎运行超时: stage={stage}, deadline={deadline_ms}ms")]
    DeadlineExceeded { stage: String, deadline_ms: u64 },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 稳定的错误判别码
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DataStoreUnavailable(_) => "DATA_STORE_UNAVAILABLE",
            ApiError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DataStoreUnavailable(msg),
            err @ RepositoryError::FieldValueError { .. } => {
                ApiError::DataStoreUnavailable(err.to_string())
            }
            RepositoryError::Other(err) => ApiError::Internal(err.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            // 读取快照失败一律视为数据源不可用（包括 NotFound 等）
            EngineError::DataStore(inner) => ApiError::DataStoreUnavailable(inner.to_string()),
            EngineError::DeadlineExceeded { stage, deadline_ms } => {
                ApiError::DeadlineExceeded { stage, deadline_ms }
            }
            EngineError::InvalidFilter(msg) => ApiError::InvalidInput(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_keep_distinct_kinds() {
        let store: ApiError = EngineError::DataStore(RepositoryError::LockError("x".into())).into();
        let slow: ApiError = EngineError::DeadlineExceeded {
            stage: "registry".into(),
            deadline_ms: 10,
        }
        .into();
        let filter: ApiError = EngineError::InvalidFilter("building".into()).into();

        assert_eq!(store.kind(), "DATA_STORE_UNAVAILABLE");
        assert_eq!(slow.kind(), "DEADLINE_EXCEEDED");
        assert_eq!(filter.kind(), "INVALID_INPUT");
    }

    #[test]
    fn test_repository_error_mapping() {
        let not_found: ApiError = RepositoryError::NotFound {
            entity: "ResourceCapacity".into(),
            id: "C1".into(),
        }
        .into();
        assert_eq!(not_found.kind(), "NOT_FOUND");

        let dup: ApiError = RepositoryError::UniqueConstraintViolation("id".into()).into();
        assert_eq!(dup.kind(), "INVALID_INPUT");

        let bad_row: ApiError = RepositoryError::field("work_unit", "WU-1", "status", "bad").into();
        assert_eq!(bad_row.kind(), "DATA_STORE_UNAVAILABLE");
    }
}
