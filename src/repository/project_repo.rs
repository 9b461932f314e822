// ==========================================
// 钢结构加工运营引擎 - 项目/楼栋元数据仓储
// ==========================================
// 用途: 统一运营视图的筛选元数据（可选项目/楼栋）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingOption {
    pub id: String,
    pub project_id: String,
    pub designation: String,
}

/// 项目元数据仓储
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn list_projects(&self) -> RepositoryResult<Vec<ProjectOption>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM project ORDER BY name, id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProjectOption {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn list_buildings(&self, project_id: &str) -> RepositoryResult<Vec<BuildingOption>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, designation FROM building WHERE project_id = ?1 ORDER BY designation, id",
        )?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok(BuildingOption {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    designation: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
