// ==========================================
// 钢结构加工运营引擎 - 命令行入口
// ==========================================
// 用法:
//   fab-ops-engine ops [db_path] [project_id] [building_id]
//   fab-ops-engine indicators [db_path]
// 输出: ApiResponse 信封 JSON（stdout）
// ==========================================

use anyhow::{bail, Context};
use fab_ops_engine::api::{ApiResponse, OperationsViewRequest};
use fab_ops_engine::app::{get_default_db_path, AppState};
use fab_ops_engine::logging;

fn non_empty(arg: Option<String>) -> Option<String> {
    arg.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "ops".to_string());
    let db_path = non_empty(args.next()).unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", fab_ops_engine::APP_NAME, fab_ops_engine::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let json = match command.as_str() {
        "ops" => {
            let request = OperationsViewRequest {
                project_id: non_empty(args.next()),
                building_id: non_empty(args.next()),
            };
            let result = state.operations_api.get_operations_view(&request).await;
            serde_json::to_string_pretty(&ApiResponse::from_result(result))?
        }
        "indicators" => {
            let result = state.indicator_api.get_leading_indicators().await;
            serde_json::to_string_pretty(&ApiResponse::from_result(result))?
        }
        other => bail!("未知命令: {} (可用: ops / indicators)", other),
    };

    println!("{}", json);
    Ok(())
}
