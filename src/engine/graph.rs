// ==========================================
// 钢结构加工运营引擎 - 依赖图
// ==========================================
// 结构: 索引化节点表（arena）+ 边表，邻接表存边索引
// 顺序: 邻接表按边在快照中的顺序（id 升序）排列，遍历结果确定
// 容错:
// - 端点不在快照中的悬空边、自环边: 丢弃并计数
// - 环: 遍历使用 visited 集合，重复访问即终止
// ==========================================

use crate::domain::dependency::DependencyEdge;
use crate::domain::types::UnitStatus;
use crate::domain::work_unit::WorkUnit;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// 图中的一条有效边（端点已解析为节点索引）
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub edge: DependencyEdge,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub dangling_edges: usize,
    pub self_loops: usize,
    pub cycle_members: usize,
}

/// 下游遍历结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeWalk {
    /// (节点索引, 距起点层数)，按广度优先发现顺序
    pub reached: Vec<(usize, usize)>,
    /// 是否因深度上限提前停止
    pub depth_limited: bool,
}

impl CascadeWalk {
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.reached.iter().map(|(idx, _)| *idx)
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.reached.iter().any(|(n, _)| *n == idx)
    }
}

// ==========================================
// DependencyGraph
// ==========================================
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    ids: Vec<String>,
    statuses: Vec<UnitStatus>,
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    upstream: Vec<Vec<usize>>,
    downstream: Vec<Vec<usize>>,
    stats: GraphStats,
}

impl DependencyGraph {
    /// 以工作单元切片建图，节点索引即切片下标
    pub fn build(units: &[WorkUnit], edges: &[DependencyEdge]) -> Self {
        let ids: Vec<String> = units.iter().map(|u| u.id.clone()).collect();
        let statuses: Vec<UnitStatus> = units.iter().map(|u| u.status).collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut graph = Self {
            upstream: vec![Vec::new(); ids.len()],
            downstream: vec![Vec::new(); ids.len()],
            ids,
            statuses,
            index,
            edges: Vec::with_capacity(edges.len()),
            stats: GraphStats::default(),
        };

        for edge in edges {
            if edge.is_self_loop() {
                tracing::warn!(edge_id = %edge.id, unit_id = %edge.from_unit_id, "丢弃自环依赖边");
                graph.stats.self_loops += 1;
                continue;
            }
            let (from, to) = match (
                graph.index.get(&edge.from_unit_id),
                graph.index.get(&edge.to_unit_id),
            ) {
                (Some(from), Some(to)) => (*from, *to),
                _ => {
                    tracing::warn!(
                        edge_id = %edge.id,
                        from_unit_id = %edge.from_unit_id,
                        to_unit_id = %edge.to_unit_id,
                        "丢弃悬空依赖边（端点不在快照中）"
                    );
                    graph.stats.dangling_edges += 1;
                    continue;
                }
            };

            let edge_idx = graph.edges.len();
            graph.edges.push(GraphEdge {
                edge: edge.clone(),
                from,
                to,
            });
            graph.downstream[from].push(edge_idx);
            graph.upstream[to].push(edge_idx);
        }

        graph.stats.node_count = graph.ids.len();
        graph.stats.edge_count = graph.edges.len();
        graph.stats.cycle_members = graph.find_cycle_members().len();
        if graph.stats.cycle_members > 0 {
            tracing::warn!(cycle_members = graph.stats.cycle_members, "依赖图存在环");
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn index_of(&self, unit_id: &str) -> Option<usize> {
        self.index.get(unit_id).copied()
    }

    pub fn unit_id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn status(&self, idx: usize) -> UnitStatus {
        self.statuses[idx]
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// 指向该节点的边（"谁阻塞我"）
    pub fn upstream_edges(&self, idx: usize) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.upstream[idx].iter().map(move |e| &self.edges[*e])
    }

    /// 从该节点出发的边（"我阻塞谁"）
    pub fn downstream_edges(&self, idx: usize) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.downstream[idx].iter().map(move |e| &self.edges[*e])
    }

    pub fn has_downstream(&self, idx: usize) -> bool {
        !self.downstream[idx].is_empty()
    }

    /// 广度优先遍历下游（不含起点）
    ///
    /// visited 集合保证每个节点最多访问一次，环上重复访问即停止；
    /// 超过 max_depth 层的节点不再展开
    pub fn walk_downstream(&self, start: usize, max_depth: usize) -> CascadeWalk {
        let mut visited = vec![false; self.node_count()];
        visited[start] = true;

        let mut walk = CascadeWalk::default();
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        queue.push_back((start, 0));

        while let Some((node, depth)) = queue.pop_front() {
            for edge_idx in &self.downstream[node] {
                let next = self.edges[*edge_idx].to;
                if visited[next] {
                    continue;
                }
                if depth + 1 > max_depth {
                    walk.depth_limited = true;
                    continue;
                }
                visited[next] = true;
                walk.reached.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }

        walk
    }

    /// 处于环上的节点索引（升序）
    ///
    /// Kosaraju 强连通分量；规模 >= 2 的分量成员即环上节点
    pub fn find_cycle_members(&self) -> Vec<usize> {
        let n = self.node_count();

        // 第一遍: 正向图求完成序
        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        for root in 0..n {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(top) = stack.last_mut() {
                let (node, pos) = *top;
                match self.downstream[node].get(pos) {
                    Some(edge_idx) => {
                        top.1 += 1;
                        let next = self.edges[*edge_idx].to;
                        if !visited[next] {
                            visited[next] = true;
                            stack.push((next, 0));
                        }
                    }
                    None => {
                        order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        // 第二遍: 反向图按逆完成序划分分量
        let mut component: Vec<Option<usize>> = vec![None; n];
        let mut sizes: Vec<usize> = Vec::new();
        for root in order.into_iter().rev() {
            if component[root].is_some() {
                continue;
            }
            let comp_id = sizes.len();
            sizes.push(0);
            component[root] = Some(comp_id);
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                sizes[comp_id] += 1;
                for edge_idx in &self.upstream[node] {
                    let prev = self.edges[*edge_idx].from;
                    if component[prev].is_none() {
                        component[prev] = Some(comp_id);
                        stack.push(prev);
                    }
                }
            }
        }

        (0..n)
            .filter(|idx| matches!(component[*idx], Some(c) if sizes[c] >= 2))
            .collect()
    }
}
