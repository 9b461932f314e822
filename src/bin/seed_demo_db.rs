// ==========================================
// 钢结构加工运营引擎 - 演示数据库生成
// ==========================================
// 用法: seed_demo_db [db_path]
// 已存在的库先备份再重建；计划时间相对"今天"生成，保证每次运行都能触发各类领先指标
// ==========================================

use chrono::{Duration, Local, NaiveDateTime};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::Path;

use fab_ops_engine::app::get_default_db_path;
use fab_ops_engine::db::{ensure_schema, format_dt, open_sqlite_connection};

const PROJECT_ID: &str = "PRJ-001";

struct SeedUnit {
    id: &'static str,
    unit_type: &'static str,
    status: &'static str,
    origin_module: &'static str,
    record_id: &'static str,
    start_offset_days: i64,
    duration_days: i64,
    weight: Option<f64>,
    quantity: Option<f64>,
    progress_pct: Option<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;
    seed_demo_scenario(&conn)?;
    print_quick_counts(&conn)?;

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn at(base: NaiveDateTime, offset_days: i64) -> String {
    format_dt(&(base + Duration::days(offset_days)))
}

fn seed_demo_scenario(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let base = Local::now()
        .date_naive()
        .and_hms_opt(8, 0, 0)
        .ok_or("invalid base time")?;

    conn.execute(
        "INSERT INTO project (id, name) VALUES (?1, ?2)",
        params![PROJECT_ID, "滨江物流中心钢结构"],
    )?;
    for (id, designation) in [("BLD-A", "A 栋仓库"), ("BLD-B", "B 栋办公楼")] {
        conn.execute(
            "INSERT INTO building (id, project_id, designation) VALUES (?1, ?2, ?3)",
            params![id, PROJECT_ID, designation],
        )?;
    }

    // 来源业务记录（名称 + 楼栋）
    let sources: [(&str, &str, &str, &str, Option<&str>); 8] = [
        ("task", "title", "T-100", "A 栋深化设计", Some("BLD-A")),
        ("purchase_order", "po_number", "PO-2001", "PO-2001 H型钢", Some("BLD-A")),
        ("purchase_order", "po_number", "PO-2002", "PO-2002 高强螺栓", Some("BLD-B")),
        ("production_run", "run_code", "RUN-01", "RUN-01 钢柱", Some("BLD-A")),
        ("production_run", "run_code", "RUN-02", "RUN-02 钢梁", Some("BLD-A")),
        ("production_run", "run_code", "RUN-03", "RUN-03 桁架", Some("BLD-B")),
        ("inspection_request", "request_no", "IR-01", "IR-01 焊缝探伤", Some("BLD-A")),
        ("document", "doc_title", "DOC-01", "竣工资料汇编", None),
    ];
    for (table, column, id, name, building) in sources {
        let sql = format!(
            "INSERT INTO {} (id, {}, building_id) VALUES (?1, ?2, ?3)",
            table, column
        );
        conn.execute(&sql, params![id, name, building])?;
    }

    let units = [
        SeedUnit { id: "WU-DES-01", unit_type: "Design", status: "InProgress", origin_module: "task", record_id: "T-100", start_offset_days: -10, duration_days: 14, weight: None, quantity: Some(40.0), progress_pct: Some(30.0) },
        SeedUnit { id: "WU-PRC-01", unit_type: "Procurement", status: "NotStarted", origin_module: "purchase_order", record_id: "PO-2001", start_offset_days: -1, duration_days: 5, weight: None, quantity: None, progress_pct: None },
        SeedUnit { id: "WU-PRC-02", unit_type: "Procurement", status: "NotStarted", origin_module: "purchase_order", record_id: "PO-2002", start_offset_days: 2, duration_days: 4, weight: None, quantity: None, progress_pct: None },
        SeedUnit { id: "WU-PRD-01", unit_type: "Production", status: "NotStarted", origin_module: "production_run", record_id: "RUN-01", start_offset_days: 4, duration_days: 6, weight: Some(20.0), quantity: None, progress_pct: None },
        SeedUnit { id: "WU-PRD-02", unit_type: "Production", status: "InProgress", origin_module: "production_run", record_id: "RUN-02", start_offset_days: -2, duration_days: 5, weight: Some(15.0), quantity: None, progress_pct: Some(10.0) },
        SeedUnit { id: "WU-PRD-03", unit_type: "Production", status: "NotStarted", origin_module: "production_run", record_id: "RUN-03", start_offset_days: 1, duration_days: 3, weight: Some(10.0), quantity: None, progress_pct: None },
        SeedUnit { id: "WU-QC-01", unit_type: "QC", status: "NotStarted", origin_module: "inspection_request", record_id: "IR-01", start_offset_days: 10, duration_days: 2, weight: None, quantity: None, progress_pct: None },
        SeedUnit { id: "WU-DOC-01", unit_type: "Documentation", status: "NotStarted", origin_module: "document", record_id: "DOC-01", start_offset_days: 12, duration_days: 3, weight: None, quantity: Some(12.0), progress_pct: None },
    ];

    for u in &units {
        let actual_start = if u.status == "NotStarted" {
            None
        } else {
            Some(at(base, u.start_offset_days))
        };
        conn.execute(
            r#"
            INSERT INTO work_unit (
                id, unit_type, status, origin_module, origin_record_id, owner_id, project_id,
                planned_start, planned_end, actual_start, actual_end,
                quantity, weight, progress_pct
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7, ?8, ?9, NULL, ?10, ?11, ?12)
            "#,
            params![
                u.id,
                u.unit_type,
                u.status,
                u.origin_module,
                u.record_id,
                PROJECT_ID,
                at(base, u.start_offset_days),
                at(base, u.start_offset_days + u.duration_days),
                actual_start,
                u.quantity,
                u.weight,
                u.progress_pct,
            ],
        )?;
    }

    let edges = [
        ("E-01", "WU-DES-01", "WU-PRC-01", "FS", 0),
        ("E-02", "WU-PRC-01", "WU-PRD-01", "FS", 0),
        ("E-03", "WU-PRC-02", "WU-PRD-03", "FS", 0),
        ("E-04", "WU-PRD-01", "WU-QC-01", "FS", 1),
        ("E-05", "WU-PRD-02", "WU-QC-01", "FS", 0),
        ("E-06", "WU-QC-01", "WU-DOC-01", "SS", 2),
    ];
    for (id, from, to, dep_type, lag) in edges {
        conn.execute(
            "INSERT INTO dependency_edge (id, from_unit_id, to_unit_id, dep_type, lag_days) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, from, to, dep_type, lag],
        )?;
    }

    let capacities = [
        ("CAP-WELD", "Welder", "焊接班组", 8.0, "Tons", 5),
        ("CAP-LASER", "Laser", "激光切割线", 12.0, "Tons", 6),
        ("CAP-DES", "Designer", "深化设计组", 16.0, "Hours", 5),
        ("CAP-QC", "QC", "质检组", 8.0, "Hours", 5),
    ];
    for (id, resource_type, name, per_day, unit, days) in capacities {
        conn.execute(
            r#"
            INSERT INTO resource_capacity (
                id, resource_type, resource_name, capacity_per_day, unit, working_days_per_week, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)
            "#,
            params![id, resource_type, name, per_day, unit, days],
        )?;
    }

    Ok(())
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    for table in ["work_unit", "dependency_edge", "resource_capacity", "building"] {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        println!("{:<20} {}", table, count);
    }
    Ok(())
}
