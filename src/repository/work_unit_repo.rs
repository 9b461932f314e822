// ==========================================
// 钢结构加工运营引擎 - 工作单元数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，只读
// 顺序: 按 id 排序，保证快照确定性
// ==========================================

use crate::db::parse_dt_best_effort;
use crate::domain::types::{OriginModule, UnitStatus, UnitType};
use crate::domain::work_unit::{OriginRef, WorkUnit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, unit_type, status, origin_module, origin_record_id,
        owner_id, project_id, planned_start, planned_end,
        actual_start, actual_end, quantity, weight, progress_pct
    FROM work_unit
"#;

/// 原始行（先取字符串，再统一校验转换）
struct WorkUnitRow {
    id: String,
    unit_type: String,
    status: String,
    origin_module: String,
    origin_record_id: String,
    owner_id: Option<String>,
    project_id: String,
    planned_start: String,
    planned_end: String,
    actual_start: Option<String>,
    actual_end: Option<String>,
    quantity: Option<f64>,
    weight: Option<f64>,
    progress_pct: Option<f64>,
}

impl WorkUnitRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            unit_type: row.get(1)?,
            status: row.get(2)?,
            origin_module: row.get(3)?,
            origin_record_id: row.get(4)?,
            owner_id: row.get(5)?,
            project_id: row.get(6)?,
            planned_start: row.get(7)?,
            planned_end: row.get(8)?,
            actual_start: row.get(9)?,
            actual_end: row.get(10)?,
            quantity: row.get(11)?,
            weight: row.get(12)?,
            progress_pct: row.get(13)?,
        })
    }

    fn into_domain(self) -> RepositoryResult<WorkUnit> {
        let id = self.id;
        let unit_type = UnitType::from_db_str(&self.unit_type).ok_or_else(|| {
            RepositoryError::field("work_unit", &id, "unit_type", format!("未知类型: {}", self.unit_type))
        })?;
        let status = UnitStatus::from_db_str(&self.status).ok_or_else(|| {
            RepositoryError::field("work_unit", &id, "status", format!("未知状态: {}", self.status))
        })?;
        let module = OriginModule::from_db_str(&self.origin_module).ok_or_else(|| {
            RepositoryError::field(
                "work_unit",
                &id,
                "origin_module",
                format!("未知来源模块: {}", self.origin_module),
            )
        })?;

        let planned_start = required_dt(&id, "planned_start", &self.planned_start)?;
        let planned_end = required_dt(&id, "planned_end", &self.planned_end)?;
        if planned_end < planned_start {
            return Err(RepositoryError::field(
                "work_unit",
                &id,
                "planned_end",
                "计划结束早于计划开始",
            ));
        }

        Ok(WorkUnit {
            unit_type,
            status,
            origin: OriginRef::new(module, self.origin_record_id),
            owner_id: self.owner_id,
            project_id: self.project_id,
            planned_start,
            planned_end,
            actual_start: self.actual_start.as_deref().and_then(parse_dt_best_effort),
            actual_end: self.actual_end.as_deref().and_then(parse_dt_best_effort),
            quantity: self.quantity,
            weight: self.weight,
            progress_pct: self.progress_pct,
            id,
        })
    }
}

fn required_dt(id: &str, field: &str, raw: &str) -> RepositoryResult<NaiveDateTime> {
    parse_dt_best_effort(raw).ok_or_else(|| {
        RepositoryError::field("work_unit", id, field, format!("无法解析时间: {}", raw))
    })
}

// ==========================================
// WorkUnitRepository - 工作单元仓储
// ==========================================
pub struct WorkUnitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkUnitRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部工作单元
    pub fn list_all(&self) -> RepositoryResult<Vec<WorkUnit>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], WorkUnitRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(WorkUnitRow::into_domain).collect()
    }

    /// 按项目查询工作单元
    pub fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<WorkUnit>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE project_id = ?1 ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![project_id], WorkUnitRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(WorkUnitRow::into_domain).collect()
    }
}
