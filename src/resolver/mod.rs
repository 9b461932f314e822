// ==========================================
// 钢结构加工运营引擎 - 引用解析层
// ==========================================
// 职责: 来源记录 → 显示名称 / 所属楼栋
// 红线: 引擎不直接读取来源业务表，只经由 ReferenceResolver
// 红线: 单条解析失败只影响该记录（回退截断 id），不中断整批
// ==========================================

pub mod cache;
pub mod memory;
pub mod sqlite;

use crate::domain::work_unit::OriginRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{Resolution, ResolutionCache};
pub use memory::InMemoryReferenceResolver;
pub use sqlite::SqliteReferenceResolver;

/// 楼栋引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingRef {
    pub building_id: String,
    pub designation: String,
}

/// 单次解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("引用解析失败: module={module}, record_id={record_id}: {message}")]
    Lookup {
        module: String,
        record_id: String,
        message: String,
    },

    #[error("引用解析器不可用: {0}")]
    Unavailable(String),
}

impl ResolveError {
    pub fn lookup(origin: &OriginRef, message: impl Into<String>) -> Self {
        ResolveError::Lookup {
            module: origin.module.to_string(),
            record_id: origin.record_id.clone(),
            message: message.into(),
        }
    }
}

// ==========================================
// ReferenceResolver Trait
// ==========================================
// 实现者: SqliteReferenceResolver（读来源业务表）、InMemoryReferenceResolver（测试/演示）
// Ok(None) 表示记录不存在或无楼栋归属
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// 解析显示名称
    async fn resolve_name(&self, origin: &OriginRef) -> Result<Option<String>, ResolveError>;

    /// 解析所属楼栋
    async fn resolve_building(&self, origin: &OriginRef)
        -> Result<Option<BuildingRef>, ResolveError>;
}
