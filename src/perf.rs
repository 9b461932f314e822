// ==========================================
// 钢结构加工运营引擎 - 性能统计
// ==========================================
// PerfGuard: 同步代码段耗时 + SQL 语句数 + 慢 SQL 数（rusqlite trace/profile）
// RunTimer: 一次引擎运行的分阶段耗时（可跨 await）
// 输出 target = "perf" / "slow_sql"
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static SQL_TRACE_ON: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

/// 线程内 SQL 计数
#[derive(Debug, Clone, Copy, Default)]
struct SqlCounters {
    /// 嵌套的 PerfGuard 数；为 0 时不计数
    depth: u32,
    statements: u64,
    slow: u64,
}

thread_local! {
    static COUNTERS: Cell<SqlCounters> = Cell::new(SqlCounters::default());
}

fn update_counters(f: impl FnOnce(&mut SqlCounters)) {
    COUNTERS.with(|cell| {
        let mut c = cell.get();
        f(&mut c);
        cell.set(c);
    });
}

fn counters() -> SqlCounters {
    COUNTERS.with(|cell| cell.get())
}

/// SQL 跟踪开关
///
/// - `FAB_OPS_PERF_SQL`: 1/true/yes/on 开启；未设置时 Debug 构建默认开启
/// - `FAB_OPS_SLOW_SQL_MS`: 慢 SQL 阈值（毫秒），默认 Debug 50 / Release 200
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SqlTraceSettings {
    enabled: bool,
    slow_ms: u64,
}

impl SqlTraceSettings {
    fn from_env() -> Self {
        let enabled = std::env::var("FAB_OPS_PERF_SQL")
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(cfg!(debug_assertions));
        let slow_ms = std::env::var("FAB_OPS_SLOW_SQL_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        Self { enabled, slow_ms }
    }
}

/// 单行化并按字符截断 SQL（日志用）
fn shorten_sql(sql: &str, max_chars: usize) -> String {
    let flat: String = sql.trim().split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut short: String = flat.chars().take(max_chars).collect();
    short.push('…');
    short
}

/// 为连接安装 SQL 计数与慢查询日志
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let settings = SqlTraceSettings::from_env();
    SQL_TRACE_ON.store(settings.enabled, Ordering::Relaxed);
    SLOW_SQL_MS.store(settings.slow_ms, Ordering::Relaxed);

    if settings.enabled {
        conn.trace(Some(on_sql_statement));
        conn.profile(Some(on_sql_finished));
    } else {
        conn.trace(None);
        conn.profile(None);
    }
}

fn on_sql_statement(_sql: &str) {
    if !SQL_TRACE_ON.load(Ordering::Relaxed) {
        return;
    }
    update_counters(|c| {
        if c.depth > 0 {
            c.statements = c.statements.saturating_add(1);
        }
    });
}

fn on_sql_finished(sql: &str, duration: Duration) {
    if !SQL_TRACE_ON.load(Ordering::Relaxed) {
        return;
    }
    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    if threshold == 0 || ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        sql = %shorten_sql(sql, 400),
        "慢 SQL"
    );
    update_counters(|c| {
        if c.depth > 0 {
            c.slow = c.slow.saturating_add(1);
        }
    });
}

/// 同步操作的耗时与 SQL 统计
///
/// 计数基于线程局部变量，不要跨 await 持有。
///
/// ```ignore
/// let _perf = fab_ops_engine::perf::PerfGuard::new("load_snapshot");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    baseline: SqlCounters,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        update_counters(|c| c.depth = c.depth.saturating_add(1));
        Self {
            op,
            start: Instant::now(),
            baseline: counters(),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let now = counters();
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = now.statements.saturating_sub(self.baseline.statements),
            slow_sql_count = now.slow.saturating_sub(self.baseline.slow),
            "操作完成"
        );
        update_counters(|c| c.depth = c.depth.saturating_sub(1));
    }
}

// ==========================================
// RunTimer - 引擎运行分阶段计时
// ==========================================
#[derive(Debug)]
pub struct RunTimer {
    run: &'static str,
    start: Instant,
    last: Instant,
    stages: Vec<(&'static str, u64)>,
}

impl RunTimer {
    pub fn start(run: &'static str) -> Self {
        let now = Instant::now();
        Self {
            run,
            start: now,
            last: now,
            stages: Vec::new(),
        }
    }

    /// 记录自上一次标记以来的阶段耗时
    pub fn mark(&mut self, stage: &'static str) {
        let now = Instant::now();
        self.stages
            .push((stage, now.duration_since(self.last).as_millis() as u64));
        self.last = now;
    }

    pub fn stages(&self) -> &[(&'static str, u64)] {
        &self.stages
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        let stages = self
            .stages
            .iter()
            .map(|(name, ms)| format!("{}={}ms", name, ms))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(
            target: "perf",
            op = self.run,
            elapsed_ms = self.elapsed_ms(),
            stages = %stages,
            "引擎运行完成"
        );
    }
}
