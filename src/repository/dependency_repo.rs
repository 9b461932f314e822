// ==========================================
// 钢结构加工运营引擎 - 依赖边数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 悬挂边/自环不在此过滤，由依赖图构建时统一处理并计数
// ==========================================

use crate::domain::dependency::DependencyEdge;
use crate::domain::types::DependencyType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// 依赖边仓储
pub struct DependencyEdgeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DependencyEdgeRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部依赖边（按 id 排序，保证遍历顺序稳定）
    pub fn list_all(&self) -> RepositoryResult<Vec<DependencyEdge>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, from_unit_id, to_unit_id, dep_type, lag_days
            FROM dependency_edge
            ORDER BY id
            "#,
        )?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i32>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, from_unit_id, to_unit_id, dep_type, lag_days)| {
                let dep_type = DependencyType::from_db_str(&dep_type).ok_or_else(|| {
                    RepositoryError::field(
                        "dependency_edge",
                        &id,
                        "dep_type",
                        format!("未知依赖类型: {}", dep_type),
                    )
                })?;
                Ok(DependencyEdge {
                    id,
                    from_unit_id,
                    to_unit_id,
                    dep_type,
                    lag_days,
                })
            })
            .collect()
    }
}
