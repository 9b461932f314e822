// ==========================================
// 钢结构加工运营引擎 - SQLite 引用解析器
// ==========================================
// 读取来源业务表的名称列与 building_id，楼栋名称取自 building 表
// 记录不存在 → Ok(None)；SQL 执行失败 → ResolveError
// 查询在阻塞线程池执行，不占用异步执行器（截止时间可随时生效）
// ==========================================

use crate::domain::types::OriginModule;
use crate::domain::work_unit::OriginRef;
use crate::resolver::{BuildingRef, ReferenceResolver, ResolveError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 来源模块 → (表名, 名称列)
fn source_table(module: OriginModule) -> (&'static str, &'static str) {
    match module {
        OriginModule::Task => ("task", "title"),
        OriginModule::PurchaseOrder => ("purchase_order", "po_number"),
        OriginModule::ProductionRun => ("production_run", "run_code"),
        OriginModule::InspectionRequest => ("inspection_request", "request_no"),
        OriginModule::Document => ("document", "doc_title"),
    }
}

pub struct SqliteReferenceResolver {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReferenceResolver {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lookup_name(
        conn: &Mutex<Connection>,
        origin: &OriginRef,
    ) -> Result<Option<String>, ResolveError> {
        let conn = conn
            .lock()
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        let (table, column) = source_table(origin.module);
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", column, table);

        conn.query_row(&sql, params![origin.record_id], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|e| ResolveError::lookup(origin, e.to_string()))
    }

    fn lookup_building(
        conn: &Mutex<Connection>,
        origin: &OriginRef,
    ) -> Result<Option<BuildingRef>, ResolveError> {
        let conn = conn
            .lock()
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        let (table, _) = source_table(origin.module);
        let sql = format!(
            r#"
            SELECT b.id, b.designation
            FROM {} s
            JOIN building b ON b.id = s.building_id
            WHERE s.id = ?1
            "#,
            table
        );

        conn.query_row(&sql, params![origin.record_id], |row| {
            Ok(BuildingRef {
                building_id: row.get(0)?,
                designation: row.get(1)?,
            })
        })
        .optional()
        .map_err(|e| ResolveError::lookup(origin, e.to_string()))
    }

    async fn run_blocking<T, F>(&self, origin: &OriginRef, lookup: F) -> Result<T, ResolveError>
    where
        T: Send + 'static,
        F: FnOnce(&Mutex<Connection>, &OriginRef) -> Result<T, ResolveError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let owned = origin.clone();
        tokio::task::spawn_blocking(move || lookup(conn.as_ref(), &owned))
            .await
            .map_err(|e| ResolveError::Unavailable(format!("解析任务异常: {}", e)))?
    }
}

#[async_trait]
impl ReferenceResolver for SqliteReferenceResolver {
    async fn resolve_name(&self, origin: &OriginRef) -> Result<Option<String>, ResolveError> {
        self.run_blocking(origin, Self::lookup_name).await
    }

    async fn resolve_building(
        &self,
        origin: &OriginRef,
    ) -> Result<Option<BuildingRef>, ResolveError> {
        self.run_blocking(origin, Self::lookup_building).await
    }
}
