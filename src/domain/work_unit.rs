// ==========================================
// 钢结构加工运营引擎 - 工作单元领域模型
// ==========================================
// 用途: 统一设计/采购/生产/质检/资料等来源的可跟踪工作
// 红线: 来源记录只通过引用解析器解引用，不直接读取
// ==========================================

use crate::domain::types::{OriginModule, UnitStatus, UnitType};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// OriginRef - 多态来源引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OriginRef {
    pub module: OriginModule,
    pub record_id: String,
}

impl OriginRef {
    pub fn new(module: OriginModule, record_id: impl Into<String>) -> Self {
        Self {
            module,
            record_id: record_id.into(),
        }
    }
}

// ==========================================
// WorkUnit - 工作单元
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    // ===== 标识 =====
    pub id: String,
    pub unit_type: UnitType,
    pub status: UnitStatus,

    // ===== 来源 =====
    pub origin: OriginRef,
    pub owner_id: Option<String>,
    pub project_id: String,

    // ===== 计划与实际 =====
    pub planned_start: NaiveDateTime,
    pub planned_end: NaiveDateTime,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,

    // ===== 工作量 =====
    pub quantity: Option<f64>,
    pub weight: Option<f64>,      // 吨
    pub progress_pct: Option<f64>, // 申报进度 0-100
}

impl WorkUnit {
    /// 计划工期（天，向上取整）
    ///
    /// 不足一天按一天计；计划结束早于开始（脏数据）时返回 0
    pub fn planned_duration_days(&self) -> i64 {
        let secs = (self.planned_end - self.planned_start).num_seconds();
        if secs <= 0 {
            return 0;
        }
        let day = Duration::days(1).num_seconds();
        (secs + day - 1) / day
    }

    /// 计划区间是否与窗口重叠（闭区间，部分重叠也算）
    pub fn overlaps(&self, window_start: NaiveDateTime, window_end: NaiveDateTime) -> bool {
        self.planned_start <= window_end && self.planned_end >= window_start
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// 是否尚未实际开工
    pub fn not_yet_started(&self) -> bool {
        self.actual_start.is_none()
            && matches!(self.status, UnitStatus::NotStarted | UnitStatus::Blocked)
    }

    /// 截断后的标识（引用解析失败时的回退名称）
    pub fn short_id(&self, len: usize) -> String {
        truncate_id(&self.id, len)
    }
}

/// 截断标识到指定字符数
pub fn truncate_id(id: &str, len: usize) -> String {
    id.chars().take(len).collect()
}
