// ==========================================
// 钢结构加工运营引擎 - 领先指标（风险事件）
// ==========================================
// 红线: 标题/描述/影响/建议全部由检测规则输入确定性生成
// 下游（含对话助手）必须原样引用，不得改写数值与严重度
// 生命周期: 每次评估重新计算，不做持久化
// ==========================================

use crate::domain::types::{IndicatorCategory, Severity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 受影响条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectedItemType {
    WorkUnit,
    Resource,
    Project,
}

/// 受影响条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedItem {
    pub item_type: AffectedItemType,
    pub id: String,
    pub name: String,
    /// 前端可导航的引用（如 "work_unit/WU-001"）
    pub reference: String,
}

impl AffectedItem {
    pub fn work_unit(id: &str, name: &str) -> Self {
        Self {
            item_type: AffectedItemType::WorkUnit,
            id: id.to_string(),
            name: name.to_string(),
            reference: format!("work_unit/{}", id),
        }
    }

    pub fn resource(id: &str, name: &str) -> Self {
        Self {
            item_type: AffectedItemType::Resource,
            id: id.to_string(),
            name: name.to_string(),
            reference: format!("resource_capacity/{}", id),
        }
    }

    pub fn project(id: &str) -> Self {
        Self {
            item_type: AffectedItemType::Project,
            id: id.to_string(),
            name: id.to_string(),
            reference: format!("project/{}", id),
        }
    }
}

/// 领先指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadingIndicator {
    pub id: String,
    pub severity: Severity,
    pub category: IndicatorCategory,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
    pub affected_items: Vec<AffectedItem>,
    pub project_id: Option<String>,
    pub detected_at: NaiveDateTime,
    pub days_until_impact: Option<i64>,
}

/// 指标汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<IndicatorCategory, usize>,
    pub indicators: Vec<LeadingIndicator>,
    pub generated_at: NaiveDateTime,
}

impl IndicatorSummary {
    /// 由已排序的指标列表生成汇总（所有类别/严重度键都存在，计数可为 0）
    pub fn from_sorted(indicators: Vec<LeadingIndicator>, generated_at: NaiveDateTime) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_category: BTreeMap<IndicatorCategory, usize> =
            IndicatorCategory::ALL.iter().map(|c| (*c, 0)).collect();

        for indicator in &indicators {
            *by_severity.entry(indicator.severity).or_insert(0) += 1;
            *by_category.entry(indicator.category).or_insert(0) += 1;
        }

        Self {
            total: indicators.len(),
            by_severity,
            by_category,
            indicators,
            generated_at,
        }
    }

    pub fn count_of(&self, category: IndicatorCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}
