// ==========================================
// 钢结构加工运营引擎 - 单次运行解析缓存
// ==========================================
// 作用域: 一次注册表构建；构建结束即丢弃，不做全局长驻缓存
// 键: 来源引用（同一来源记录只解析一次）
// 名称或楼栋任一解析出错 → 整条记录按失败处理（截断标识 + 楼栋置空）
// ==========================================

use crate::domain::work_unit::{truncate_id, OriginRef};
use crate::resolver::{BuildingRef, ReferenceResolver};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};

/// 单个来源记录的解析结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub name: Option<String>,
    pub building: Option<BuildingRef>,
    /// 名称或楼栋任一解析出错
    pub failed: bool,
}

/// 运行级解析缓存
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<OriginRef, Resolution>,
    lookups: usize,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 并发解析尚未缓存的来源引用
    ///
    /// - 输入先去重排序，保证解析调用顺序确定
    /// - 并发度由 concurrency 限制（最少 1）
    /// - 解析错误记录为 failed，不向上传播
    pub async fn resolve_missing<'a, I>(
        &mut self,
        resolver: &dyn ReferenceResolver,
        origins: I,
        concurrency: usize,
    ) where
        I: IntoIterator<Item = &'a OriginRef>,
    {
        let pending: BTreeSet<&OriginRef> = origins
            .into_iter()
            .filter(|o| !self.entries.contains_key(*o))
            .collect();

        if pending.is_empty() {
            return;
        }

        let results: Vec<(OriginRef, Resolution)> = stream::iter(pending)
            .map(|origin| async move {
                let name = resolver.resolve_name(origin).await;
                let building = resolver.resolve_building(origin).await;

                let mut resolution = Resolution::default();
                match name {
                    Ok(n) => resolution.name = n.filter(|s| !s.trim().is_empty()),
                    Err(e) => {
                        tracing::warn!(
                            module = %origin.module,
                            record_id = %origin.record_id,
                            error = %e,
                            "名称解析失败，回退为截断标识"
                        );
                        resolution.failed = true;
                    }
                }
                match building {
                    Ok(b) => resolution.building = b,
                    Err(e) => {
                        tracing::warn!(
                            module = %origin.module,
                            record_id = %origin.record_id,
                            error = %e,
                            "楼栋解析失败，楼栋置空"
                        );
                        resolution.failed = true;
                    }
                }
                if resolution.failed {
                    resolution.name = None;
                    resolution.building = None;
                }
                (origin.clone(), resolution)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        self.lookups += results.len();
        self.entries.extend(results);
    }

    pub fn get(&self, origin: &OriginRef) -> Option<&Resolution> {
        self.entries.get(origin)
    }

    /// 显示名称；未解析出名称时回退为截断的 fallback_id
    pub fn display_name(&self, origin: &OriginRef, fallback_id: &str, fallback_len: usize) -> String {
        self.entries
            .get(origin)
            .and_then(|r| r.name.clone())
            .unwrap_or_else(|| truncate_id(fallback_id, fallback_len))
    }

    pub fn building(&self, origin: &OriginRef) -> Option<&BuildingRef> {
        self.entries.get(origin).and_then(|r| r.building.as_ref())
    }

    /// 实际发出的解析次数（去重后）
    pub fn lookup_count(&self) -> usize {
        self.lookups
    }

    pub fn failure_count(&self) -> usize {
        self.entries.values().filter(|r| r.failed).count()
    }
}
