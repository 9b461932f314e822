// ==========================================
// 钢结构加工运营引擎 - 配置层
// ==========================================
// 职责: 引擎阈值（具名、可调）与 config_kv 覆写
// 存储: config_kv 表 (scope_id + key)
// ==========================================

pub mod config_manager;
pub mod engine_config;

pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::{CapacityBands, DetectorThresholds, EngineConfig};
