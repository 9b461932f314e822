// ==========================================
// 钢结构加工运营引擎 - 内存引用解析器
// ==========================================
// 用途: 单元测试 / 演示；支持注入失败与延迟
// ==========================================

use crate::domain::types::OriginModule;
use crate::domain::work_unit::OriginRef;
use crate::resolver::{BuildingRef, ReferenceResolver, ResolveError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct InMemoryReferenceResolver {
    names: HashMap<OriginRef, String>,
    buildings: HashMap<OriginRef, BuildingRef>,
    failing: HashSet<OriginRef>,
    delay: Option<Duration>,
    name_calls: AtomicUsize,
    building_calls: AtomicUsize,
}

impl InMemoryReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, module: OriginModule, record_id: &str, name: &str) -> Self {
        self.names
            .insert(OriginRef::new(module, record_id), name.to_string());
        self
    }

    pub fn with_building(
        mut self,
        module: OriginModule,
        record_id: &str,
        building_id: &str,
        designation: &str,
    ) -> Self {
        self.buildings.insert(
            OriginRef::new(module, record_id),
            BuildingRef {
                building_id: building_id.to_string(),
                designation: designation.to_string(),
            },
        );
        self
    }

    /// 该记录的名称与楼栋解析都返回错误
    pub fn failing(mut self, module: OriginModule, record_id: &str) -> Self {
        self.failing.insert(OriginRef::new(module, record_id));
        self
    }

    /// 每次解析前等待（用于截止时间测试）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn name_calls(&self) -> usize {
        self.name_calls.load(Ordering::SeqCst)
    }

    pub fn building_calls(&self) -> usize {
        self.building_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ReferenceResolver for InMemoryReferenceResolver {
    async fn resolve_name(&self, origin: &OriginRef) -> Result<Option<String>, ResolveError> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.failing.contains(origin) {
            return Err(ResolveError::lookup(origin, "注入的解析失败"));
        }
        Ok(self.names.get(origin).cloned())
    }

    async fn resolve_building(
        &self,
        origin: &OriginRef,
    ) -> Result<Option<BuildingRef>, ResolveError> {
        self.building_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.failing.contains(origin) {
            return Err(ResolveError::lookup(origin, "注入的解析失败"));
        }
        Ok(self.buildings.get(origin).cloned())
    }
}
