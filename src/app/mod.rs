// ==========================================
// 钢结构加工运营引擎 - 应用层
// ==========================================
// 职责: 组装各层实例，供 CLI 与宿主程序使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
