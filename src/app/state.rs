// ==========================================
// 钢结构加工运营引擎 - 应用状态
// ==========================================
// 职责: 组装共享连接、仓储、引擎与 API 实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{CapacityApi, IndicatorApi, OperationsApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::{EngineRepositories, OperationsEngine};
use crate::resolver::{ReferenceResolver, SqliteReferenceResolver};

/// 应用状态
///
/// 持有全部 API 实例；CLI 与集成测试共用
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 统一运营视图 API
    pub operations_api: Arc<OperationsApi>,

    /// 领先指标 API
    pub indicator_api: Arc<IndicatorApi>,

    /// 产能申报 API
    pub capacity_api: Arc<CapacityApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 1. 打开共享连接并确保表结构存在
    /// 2. 从 config_kv 加载引擎配置
    /// 3. 以 SQLite 来源表作为引用解析器
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化表结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let resolver: Arc<dyn ReferenceResolver> =
            Arc::new(SqliteReferenceResolver::new(conn.clone()));
        Self::with_resolver(db_path, conn, resolver)
    }

    /// 使用指定的引用解析器组装（测试/演示注入 InMemoryReferenceResolver）
    pub fn with_resolver(
        db_path: String,
        conn: Arc<Mutex<rusqlite::Connection>>,
        resolver: Arc<dyn ReferenceResolver>,
    ) -> Result<Self, String> {
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let config = config_manager
            .load_engine_config()
            .map_err(|e| format!("无法加载引擎配置: {}", e))?;

        let repos = EngineRepositories::from_connection(conn);
        let capacity_api = Arc::new(CapacityApi::new(repos.capacity_repo.clone()));

        let engine = Arc::new(OperationsEngine::new(repos, resolver, config));
        let operations_api = Arc::new(OperationsApi::new(engine.clone()));
        let indicator_api = Arc::new(IndicatorApi::new(engine));

        tracing::info!("AppState初始化成功");
        Ok(Self {
            db_path,
            operations_api,
            indicator_api,
            capacity_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 FAB_OPS_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("FAB_OPS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fab_ops.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fab-ops-engine");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fab_ops.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.capacity_api.list_capacities().unwrap().is_empty());
    }
}
