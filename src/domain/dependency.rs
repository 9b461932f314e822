// ==========================================
// 钢结构加工运营引擎 - 依赖边领域模型
// ==========================================
// 约束: 无自环；图"预期"无环，但引擎不做此假设
// ==========================================

use crate::domain::types::DependencyType;
use serde::{Deserialize, Serialize};

/// 依赖边: from_unit 是前置, to_unit 是后置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub id: String,
    pub from_unit_id: String,
    pub to_unit_id: String,
    pub dep_type: DependencyType,
    pub lag_days: i32, // 负数表示提前量
}

impl DependencyEdge {
    pub fn is_self_loop(&self) -> bool {
        self.from_unit_id == self.to_unit_id
    }
}
