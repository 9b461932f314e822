// ==========================================
// 钢结构加工运营引擎 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发读写时的偶发 busy 错误
// - 统一建表（幂等），引擎只读，写入由外围业务系统完成
// ==========================================

use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 时间戳统一存储格式
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置（含 SQL 计数/慢查询 trace）
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 幂等建表
///
/// 业务来源表（task / purchase_order / production_run / inspection_request / document）
/// 只保留引用解析所需的列：名称 + 所属楼栋。
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS project (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS building (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES project(id) ON DELETE CASCADE,
            designation TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            building_id TEXT
        );

        CREATE TABLE IF NOT EXISTS purchase_order (
            id TEXT PRIMARY KEY,
            po_number TEXT NOT NULL,
            building_id TEXT
        );

        CREATE TABLE IF NOT EXISTS production_run (
            id TEXT PRIMARY KEY,
            run_code TEXT NOT NULL,
            building_id TEXT
        );

        CREATE TABLE IF NOT EXISTS inspection_request (
            id TEXT PRIMARY KEY,
            request_no TEXT NOT NULL,
            building_id TEXT
        );

        CREATE TABLE IF NOT EXISTS document (
            id TEXT PRIMARY KEY,
            doc_title TEXT NOT NULL,
            building_id TEXT
        );

        CREATE TABLE IF NOT EXISTS work_unit (
            id TEXT PRIMARY KEY,
            unit_type TEXT NOT NULL,
            status TEXT NOT NULL,
            origin_module TEXT NOT NULL,
            origin_record_id TEXT NOT NULL,
            owner_id TEXT,
            project_id TEXT NOT NULL,
            planned_start TEXT NOT NULL,
            planned_end TEXT NOT NULL,
            actual_start TEXT,
            actual_end TEXT,
            quantity REAL,
            weight REAL,
            progress_pct REAL,
            CHECK (planned_end >= planned_start)
        );

        CREATE INDEX IF NOT EXISTS idx_work_unit_project ON work_unit(project_id);

        CREATE TABLE IF NOT EXISTS dependency_edge (
            id TEXT PRIMARY KEY,
            from_unit_id TEXT NOT NULL,
            to_unit_id TEXT NOT NULL,
            dep_type TEXT NOT NULL DEFAULT 'FS',
            lag_days INTEGER NOT NULL DEFAULT 0,
            CHECK (from_unit_id <> to_unit_id)
        );

        CREATE TABLE IF NOT EXISTS resource_capacity (
            id TEXT PRIMARY KEY,
            resource_type TEXT NOT NULL,
            resource_name TEXT NOT NULL,
            capacity_per_day REAL NOT NULL,
            unit TEXT NOT NULL,
            working_days_per_week INTEGER NOT NULL DEFAULT 5,
            is_active INTEGER NOT NULL DEFAULT 1,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}

/// 尽力解析日期时间字符串
///
/// # 支持格式
/// - `%Y-%m-%d %H:%M:%S` (例如: 2026-01-01 12:30:00)
/// - `%Y-%m-%d %H:%M`
/// - `%Y-%m-%dT%H:%M:%S`
/// - `%Y-%m-%d` (按 00:00:00 处理)
/// - RFC3339 (例如: 2026-01-01T12:30:00+08:00)
pub fn parse_dt_best_effort(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FMT) {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    None
}

/// 格式化为统一存储格式
pub fn format_dt(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='work_unit'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_self_loop_edge_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO dependency_edge (id, from_unit_id, to_unit_id) VALUES ('E1', 'U1', 'U1')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_dt_best_effort() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_dt_best_effort("2026-03-02 08:30:00"), Some(expected));
        assert_eq!(parse_dt_best_effort("2026-03-02T08:30:00"), Some(expected));
        assert_eq!(parse_dt_best_effort("2026-03-02 08:30"), Some(expected));
        assert_eq!(
            parse_dt_best_effort("2026-03-02"),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_dt_best_effort("  "), None);
        assert_eq!(parse_dt_best_effort("not a date"), None);
    }

    #[test]
    fn test_format_dt_round_trip_format() {
        let dt = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap();
        assert_eq!(format_dt(&dt), "2026-01-05 17:00:00");
    }
}
