// ==========================================
// 引擎集成测试 - 图健壮性与失败路径
// ==========================================
// 测试范围:
// 1. 环 / 悬空边: 运行完成，环成员与悬空边计入图健康
// 2. 数据源不可用: FAILURE 信封，绝不返回空列表冒充"无风险"
// 3. 截止时间: 解析器过慢 / SQLite 连接被占用 → DEADLINE_EXCEEDED（带阶段）
// 4. 筛选选项读取失败: 同属数据源不可用
// ==========================================

mod helpers;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fab_ops_engine::api::{ApiResponse, IndicatorApi, OperationsApi, OperationsViewRequest};
use fab_ops_engine::config::{config_keys, EngineConfig};
use fab_ops_engine::db::open_sqlite_connection;
use fab_ops_engine::domain::types::{IndicatorCategory, UnitStatus, UnitType};
use fab_ops_engine::engine::{EngineRepositories, OperationsEngine};
use fab_ops_engine::resolver::{
    InMemoryReferenceResolver, ReferenceResolver, SqliteReferenceResolver,
};
use helpers::api_test_helper::{insert_edge, ApiTestEnv};
use helpers::test_data_builder::{eval_now, WorkUnitBuilder};

// ==========================================
// 图健壮性
// ==========================================

#[tokio::test]
async fn test_cycle_does_not_hang_环依赖() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[
        WorkUnitBuilder::new("A", UnitType::Design).planned(-2, 1).build(),
        WorkUnitBuilder::new("B", UnitType::Procurement).planned(2, 4).build(),
        WorkUnitBuilder::new("C", UnitType::Production).planned(5, 6).build(),
    ]);
    env.add_fs_edge("E1", "A", "B");
    env.add_fs_edge("E2", "B", "A");
    env.add_fs_edge("E3", "B", "C");
    // 悬空边: 下游单元不存在
    env.add_fs_edge("E4", "C", "GHOST");
    let state = env.start();

    let view = state
        .operations_api
        .get_operations_view_at(&OperationsViewRequest::default(), eval_now())
        .await
        .unwrap();
    assert_eq!(view.graph.cycle_unit_ids, vec!["A", "B"]);
    assert_eq!(view.graph.stats.dangling_edges, 1);
    assert_eq!(view.graph.stats.edge_count, 3);
    // 环上互相阻塞
    assert!(view.units.iter().all(|u| u.blocking.is_blocked));

    let summary = state
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .unwrap();
    // 环只产生一条级联指标
    let cascades: Vec<_> = summary
        .indicators
        .iter()
        .filter(|i| i.category == IndicatorCategory::CascadeRisk)
        .collect();
    assert_eq!(cascades.len(), 1);
    assert_eq!(cascades[0].affected_items[0].id, "A");
}

#[tokio::test]
async fn test_self_loop_is_ignored() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("A", UnitType::Design)
        .status(UnitStatus::InProgress)
        .planned(0, 2)
        .build()]);
    // 表约束禁止自环，临时关闭后写入模拟脏数据
    {
        let conn = env.conn();
        conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
        insert_edge(&conn, "E-SELF", "A", "A", "FS").unwrap();
        conn.execute_batch("PRAGMA ignore_check_constraints = OFF;").unwrap();
    }

    let view = env
        .start()
        .operations_api
        .get_operations_view_at(&OperationsViewRequest::default(), eval_now())
        .await
        .unwrap();
    assert_eq!(view.graph.stats.self_loops, 1);
    assert_eq!(view.graph.stats.edge_count, 0);
    assert!(!view.units[0].blocking.is_blocked);
}

// ==========================================
// 失败路径
// ==========================================

fn engine_on(conn: rusqlite::Connection, resolver: Arc<dyn ReferenceResolver>, config: EngineConfig) -> Arc<OperationsEngine> {
    let repos = EngineRepositories::from_connection(Arc::new(Mutex::new(conn)));
    Arc::new(OperationsEngine::new(repos, resolver, config))
}

#[tokio::test]
async fn test_missing_tables_is_data_store_failure_数据源不可用() {
    let (_temp, db_path) = test_helpers::create_empty_db().unwrap();
    let conn = open_sqlite_connection(&db_path).unwrap();
    let engine = engine_on(
        conn,
        Arc::new(InMemoryReferenceResolver::new()),
        EngineConfig::default(),
    );

    let indicators = IndicatorApi::new(engine.clone())
        .get_leading_indicators_at(eval_now())
        .await;
    let response = ApiResponse::from_result(indicators);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "FAILURE");
    assert_eq!(json["error"]["kind"], "DATA_STORE_UNAVAILABLE");
    assert!(json.get("data").is_none());

    let view = OperationsApi::new(engine)
        .get_operations_view_at(&OperationsViewRequest::default(), eval_now())
        .await;
    assert_eq!(view.unwrap_err().kind(), "DATA_STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_slow_resolver_hits_deadline_超时() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("A", UnitType::Design).planned(1, 2).build()]);
    env.set_config(config_keys::RUN_DEADLINE_MS, "50");

    let resolver = InMemoryReferenceResolver::new().with_delay(Duration::from_millis(500));
    let state = env.start_with(Arc::new(resolver));

    let result = state.indicator_api.get_leading_indicators_at(eval_now()).await;
    let response = ApiResponse::from_result(result);
    let error = response.error().unwrap();
    assert_eq!(error.kind, "DEADLINE_EXCEEDED");
    assert!(error.message.contains("registry"));
}

#[tokio::test]
async fn test_busy_sqlite_resolver_hits_deadline_连接占用超时() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("A", UnitType::Design).planned(1, 2).build()]);
    env.set_config(config_keys::RUN_DEADLINE_MS, "100");

    // 解析器使用独立连接，由另一线程长时间占用
    let resolver_conn = Arc::new(Mutex::new(open_sqlite_connection(&env.db_path).unwrap()));
    let state = env.start_with(Arc::new(SqliteReferenceResolver::new(resolver_conn.clone())));

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let holder = std::thread::spawn(move || {
        let _guard = resolver_conn.lock().unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(1500));
    });
    locked_rx.recv().unwrap();

    let started = Instant::now();
    let result = state
        .operations_api
        .get_operations_view_at(&OperationsViewRequest::default(), eval_now())
        .await;
    let elapsed = started.elapsed();

    let error = result.unwrap_err();
    assert_eq!(error.kind(), "DEADLINE_EXCEEDED");
    assert!(error.to_string().contains("registry"));
    assert!(elapsed < Duration::from_millis(1000), "elapsed={:?}", elapsed);

    holder.join().unwrap();
}

#[tokio::test]
async fn test_filter_options_failure_is_data_store_error_筛选选项读取失败() {
    let env = ApiTestEnv::new().unwrap();
    env.add_units(&[WorkUnitBuilder::new("A", UnitType::Design).planned(1, 2).build()]);
    let state = env.start();
    env.conn()
        .execute_batch("PRAGMA foreign_keys = OFF; DROP TABLE project;")
        .unwrap();

    let view = state
        .operations_api
        .get_operations_view_at(&OperationsViewRequest::default(), eval_now())
        .await;
    assert_eq!(view.unwrap_err().kind(), "DATA_STORE_UNAVAILABLE");

    // 领先指标不读取筛选选项
    assert!(state
        .indicator_api
        .get_leading_indicators_at(eval_now())
        .await
        .is_ok());
}
