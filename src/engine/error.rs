// ==========================================
// 钢结构加工运营引擎 - 引擎错误类型
// ==========================================
// 可恢复的问题（解析失败/坏图/产能配置错误）在引擎内部降级处理
// 只有数据源不可读与超时会终止本轮运行
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 无法读取工作单元/依赖边/产能（本轮运行失败）
    #[error("数据源读取失败: {0}")]
    DataStore(#[from] RepositoryError),

    /// 整轮运行超过截止时间
    #[error("引擎运行超时: stage={stage}, deadline={deadline_ms}ms")]
    DeadlineExceeded { stage: String, deadline_ms: u64 },

    #[error("过滤条件不合法: {0}")]
    InvalidFilter(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
