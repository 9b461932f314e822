// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 临时数据库 + 共享连接 + AppState 组装
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex, MutexGuard};

use fab_ops_engine::app::AppState;
use fab_ops_engine::config::ConfigManager;
use fab_ops_engine::db::open_sqlite_connection;
use fab_ops_engine::domain::capacity::ResourceCapacity;
use fab_ops_engine::domain::work_unit::WorkUnit;
use fab_ops_engine::resolver::{ReferenceResolver, SqliteReferenceResolver};
use rusqlite::Connection;
use tempfile::NamedTempFile;

pub use test_helpers::{insert_building, insert_edge, insert_production_run, insert_project};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 先写数据，再调用 `start*` 组装 AppState（配置在组装时加载）
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        fab_ops_engine::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        Ok(Self {
            db_path,
            conn,
            _temp_file: temp_file,
        })
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    pub fn add_units(&self, units: &[WorkUnit]) {
        let conn = self.conn();
        for unit in units {
            test_helpers::insert_work_unit(&conn, unit).unwrap();
        }
    }

    pub fn add_fs_edge(&self, id: &str, from: &str, to: &str) {
        insert_edge(&self.conn(), id, from, to, "FS").unwrap();
    }

    pub fn add_capacity(&self, capacity: &ResourceCapacity) {
        test_helpers::insert_capacity(&self.conn(), capacity).unwrap();
    }

    pub fn set_config(&self, key: &str, value: &str) {
        ConfigManager::from_connection(self.conn.clone())
            .set_global(key, value)
            .unwrap();
    }

    /// 使用 SQLite 来源表作为引用解析器
    pub fn start(&self) -> AppState {
        let resolver: Arc<dyn ReferenceResolver> =
            Arc::new(SqliteReferenceResolver::new(self.conn.clone()));
        self.start_with(resolver)
    }

    /// 使用注入的引用解析器
    pub fn start_with(&self, resolver: Arc<dyn ReferenceResolver>) -> AppState {
        AppState::with_resolver(self.db_path.clone(), self.conn.clone(), resolver).unwrap()
    }
}
