// ==========================================
// 钢结构加工运营引擎 - 资源产能数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 引擎只消费启用的产能记录；insert 仅供产能申报接口使用
// ==========================================

use crate::domain::capacity::ResourceCapacity;
use crate::domain::types::{CapacityUnit, ResourceType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT id, resource_type, resource_name, capacity_per_day, unit,
           working_days_per_week, is_active, notes
    FROM resource_capacity
"#;

type CapacityRow = (String, String, String, f64, String, i32, i32, Option<String>);

fn read_row(row: &Row) -> rusqlite::Result<CapacityRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_domain(raw: CapacityRow) -> RepositoryResult<ResourceCapacity> {
    let (id, resource_type, resource_name, capacity_per_day, unit, days, is_active, notes) = raw;
    let resource_type = ResourceType::from_db_str(&resource_type).ok_or_else(|| {
        RepositoryError::field(
            "resource_capacity",
            &id,
            "resource_type",
            format!("未知资源类型: {}", resource_type),
        )
    })?;
    let unit = CapacityUnit::from_db_str(&unit).ok_or_else(|| {
        RepositoryError::field("resource_capacity", &id, "unit", format!("未知单位: {}", unit))
    })?;

    Ok(ResourceCapacity {
        id,
        resource_type,
        resource_name,
        capacity_per_day,
        unit,
        working_days_per_week: days,
        is_active: is_active != 0,
        notes,
    })
}

/// 资源产能仓储
pub struct ResourceCapacityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ResourceCapacityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部启用的产能（按 id 排序）
    pub fn list_active(&self) -> RepositoryResult<Vec<ResourceCapacity>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE is_active = 1 ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(into_domain).collect()
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ResourceCapacity>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let raw = conn.query_row(&sql, params![id], read_row).optional()?;
        raw.map(into_domain).transpose()
    }

    /// 插入产能记录
    pub fn insert(&self, capacity: &ResourceCapacity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO resource_capacity (
                id, resource_type, resource_name, capacity_per_day, unit,
                working_days_per_week, is_active, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                capacity.id,
                capacity.resource_type.to_db_str(),
                capacity.resource_name,
                capacity.capacity_per_day,
                capacity.unit.to_db_str(),
                capacity.working_days_per_week,
                if capacity.is_active { 1 } else { 0 },
                capacity.notes,
            ],
        )?;
        Ok(())
    }
}
