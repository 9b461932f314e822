// ==========================================
// 钢结构加工运营引擎 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表（scope_id='global'）加载阈值覆写
// 约定: 缺失 → 默认值；解析失败 → 告警并保留默认值
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取全部 global 配置
    fn load_global(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// 写入单个 global 配置（UPSERT）
    pub fn set_global(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载引擎配置
    ///
    /// 覆写后的配置若校验失败，整体回退为默认配置
    pub fn load_engine_config(&self) -> RepositoryResult<EngineConfig> {
        let raw = self.load_global()?;
        let mut cfg = EngineConfig::default();
        apply_overrides(&mut cfg, &raw);

        if let Err(reason) = cfg.validate() {
            tracing::warn!(reason = %reason, "引擎配置校验失败，使用默认配置");
            return Ok(EngineConfig::default());
        }
        Ok(cfg)
    }
}

fn override_value<T: FromStr>(raw: &HashMap<String, String>, key: &str, target: &mut T) {
    if let Some(value) = raw.get(key) {
        match value.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(
                config_key = key,
                raw_value = %value,
                "配置值格式错误，保留默认值"
            ),
        }
    }
}

/// 将 config_kv 覆写应用到配置
pub fn apply_overrides(cfg: &mut EngineConfig, raw: &HashMap<String, String>) {
    use config_keys::*;

    override_value(raw, CAPACITY_HIGH_PCT, &mut cfg.capacity_bands.high_pct);
    override_value(raw, CAPACITY_MODERATE_PCT, &mut cfg.capacity_bands.moderate_pct);

    let d = &mut cfg.detector;
    override_value(raw, TASK_DELAY_LOOKAHEAD_DAYS, &mut d.task_delay_lookahead_days);
    override_value(raw, TASK_DELAY_HIGH_DAYS, &mut d.task_delay_high_days);
    override_value(raw, CASCADE_HIGH_COUNT, &mut d.cascade_high_count);
    override_value(raw, CASCADE_CRITICAL_COUNT, &mut d.cascade_critical_count);
    override_value(raw, MAX_CASCADE_DEPTH, &mut d.max_cascade_depth);
    override_value(raw, OVERLOAD_HIGH_PCT, &mut d.overload_high_pct);
    override_value(raw, OVERLOAD_CRITICAL_PCT, &mut d.overload_critical_pct);
    override_value(raw, PROCUREMENT_LOOKAHEAD_DAYS, &mut d.procurement_lookahead_days);
    override_value(raw, PROCUREMENT_HIGH_DAYS, &mut d.procurement_high_days);
    override_value(raw, SLIP_TOLERANCE_PCT, &mut d.slip_tolerance_pct);
    override_value(raw, SLIP_HIGH_PCT, &mut d.slip_high_pct);
    override_value(raw, SLIP_CRITICAL_PCT, &mut d.slip_critical_pct);
    override_value(raw, PROJECT_SLIP_MIN_UNITS, &mut d.project_slip_min_units);

    override_value(raw, RUN_DEADLINE_MS, &mut cfg.run_deadline_ms);
    override_value(raw, RESOLVER_CONCURRENCY, &mut cfg.resolver_concurrency);
    override_value(raw, FALLBACK_NAME_LEN, &mut cfg.fallback_name_len);
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 产能分档
    pub const CAPACITY_HIGH_PCT: &str = "capacity_high_pct";
    pub const CAPACITY_MODERATE_PCT: &str = "capacity_moderate_pct";

    // 延误
    pub const TASK_DELAY_LOOKAHEAD_DAYS: &str = "task_delay_lookahead_days";
    pub const TASK_DELAY_HIGH_DAYS: &str = "task_delay_high_days";

    // 级联
    pub const CASCADE_HIGH_COUNT: &str = "cascade_high_count";
    pub const CASCADE_CRITICAL_COUNT: &str = "cascade_critical_count";
    pub const MAX_CASCADE_DEPTH: &str = "max_cascade_depth";

    // 超载
    pub const OVERLOAD_HIGH_PCT: &str = "overload_high_pct";
    pub const OVERLOAD_CRITICAL_PCT: &str = "overload_critical_pct";

    // 采购
    pub const PROCUREMENT_LOOKAHEAD_DAYS: &str = "procurement_lookahead_days";
    pub const PROCUREMENT_HIGH_DAYS: &str = "procurement_high_days";

    // 进度偏差
    pub const SLIP_TOLERANCE_PCT: &str = "slip_tolerance_pct";
    pub const SLIP_HIGH_PCT: &str = "slip_high_pct";
    pub const SLIP_CRITICAL_PCT: &str = "slip_critical_pct";
    pub const PROJECT_SLIP_MIN_UNITS: &str = "project_slip_min_units";

    // 运行
    pub const RUN_DEADLINE_MS: &str = "run_deadline_ms";
    pub const RESOLVER_CONCURRENCY: &str = "resolver_concurrency";
    pub const FALLBACK_NAME_LEN: &str = "fallback_name_len";
}
