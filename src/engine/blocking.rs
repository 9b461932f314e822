// ==========================================
// 钢结构加工运营引擎 - 阻塞判定
// ==========================================
// 规则: 存在至少一条 FS 上游边且其前置单元未完成 → 阻塞
// SS/FF/SF 只记录不参与判定
// 持久化的 Blocked 状态与计算出的 is_blocked 相互独立，以后者为准
// ==========================================

use crate::domain::types::{DependencyType, UnitStatus};
use crate::engine::graph::{DependencyGraph, GraphEdge};
use serde::{Deserialize, Serialize};

/// 带邻居信息的依赖边
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEdge {
    pub edge_id: String,
    pub unit_id: String,
    pub display_name: String,
    pub status: UnitStatus,
    pub dep_type: DependencyType,
    pub lag_days: i32,
}

/// 单个工作单元的阻塞信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockingInfo {
    pub is_blocked: bool,
    /// 造成阻塞的上游（FS 且未完成）
    pub blocked_by: Vec<NeighborEdge>,
    /// 全部上游
    pub upstream: Vec<NeighborEdge>,
    /// 全部下游
    pub downstream: Vec<NeighborEdge>,
}

pub struct BlockingEvaluator;

impl BlockingEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// 该边是否构成阻塞
    pub fn edge_blocks(&self, graph: &DependencyGraph, edge: &GraphEdge) -> bool {
        edge.edge.dep_type.is_blocking() && !graph.status(edge.from).is_completed()
    }

    pub fn is_blocked(&self, graph: &DependencyGraph, idx: usize) -> bool {
        graph
            .upstream_edges(idx)
            .any(|edge| self.edge_blocks(graph, edge))
    }

    /// 所有节点的阻塞标记（按节点索引）
    pub fn evaluate_all(&self, graph: &DependencyGraph) -> Vec<bool> {
        (0..graph.node_count())
            .map(|idx| self.is_blocked(graph, idx))
            .collect()
    }

    /// 组装阻塞信息，邻居名称由调用方提供
    pub fn blocking_info<F>(&self, graph: &DependencyGraph, idx: usize, name_of: F) -> BlockingInfo
    where
        F: Fn(usize) -> String,
    {
        let neighbor = |edge: &GraphEdge, other: usize| NeighborEdge {
            edge_id: edge.edge.id.clone(),
            unit_id: graph.unit_id(other).to_string(),
            display_name: name_of(other),
            status: graph.status(other),
            dep_type: edge.edge.dep_type,
            lag_days: edge.edge.lag_days,
        };

        let mut info = BlockingInfo::default();
        for edge in graph.upstream_edges(idx) {
            let entry = neighbor(edge, edge.from);
            if self.edge_blocks(graph, edge) {
                info.blocked_by.push(entry.clone());
            }
            info.upstream.push(entry);
        }
        for edge in graph.downstream_edges(idx) {
            info.downstream.push(neighbor(edge, edge.to));
        }
        info.is_blocked = !info.blocked_by.is_empty();
        info
    }
}

impl Default for BlockingEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
