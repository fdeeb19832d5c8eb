// ==========================================
// OrderApi 集成测试
// ==========================================
// 测试范围:
// 1. 创建: 默认工序、费率默认值、输入校验
// 2. 查询: 角色视图过滤、列表上限
// 3. 修改/删除/附件/成本: 权限校验
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::NewOrderBuilder;
use production_tracker::api::ApiError;
use production_tracker::config::config_keys;
use production_tracker::domain::order::OrderUpdate;
use production_tracker::domain::types::{MarketType, StageCategory, StageKind, StageStatus};

// ==========================================
// 创建订单
// ==========================================

#[test]
fn test_create_order_defaults() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let created = env
        .order_api
        .create_order(&employee(), NewOrderBuilder::new("PO-1").build())
        .expect("创建失败");

    // 员工视图: 成本与费率置零
    assert_eq!(created.material_cost, 0.0);
    assert_eq!(created.minute_rate_domestic, 0.0);

    let stored = env.reload(&created.id);
    assert_eq!(stored.created_by, "employee-1");
    assert_eq!(stored.minute_rate_domestic, 25.0);
    assert_eq!(stored.minute_rate_foreign, 0.42);
    assert_eq!(stored.material_cost, 1000.0);
    assert_eq!(stored.revision, 0);

    assert_eq!(stored.stages.len(), 8);
    for (i, stage) in stored.stages.iter().enumerate() {
        assert_eq!(stage.index(), i);
        assert_eq!(stage.status, StageStatus::Pending);
        assert_eq!(stage.percentage, 0);
        match stage.category {
            StageCategory::Gating => assert!(i < 3 && stage.completed_units.is_none()),
            StageCategory::Quantity => assert!(i >= 3 && stage.completed_units == Some(0)),
        }
    }
}

#[test]
fn test_create_order_rates_from_config() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.config_manager
        .set_global_config_value(config_keys::DEFAULT_MINUTE_RATE_DOMESTIC, "30")
        .unwrap();

    let order = env.create_order(NewOrderBuilder::new("PO-2"));
    assert_eq!(order.minute_rate_domestic, 30.0);
    assert_eq!(order.minute_rate_foreign, 0.42);

    let explicit = env.create_order(NewOrderBuilder::new("PO-3").rates(20.0, 0.5));
    assert_eq!(explicit.minute_rate_domestic, 20.0);
    assert_eq!(explicit.minute_rate_foreign, 0.5);
}

#[test]
fn test_create_order_invalid_input() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = env
        .order_api
        .create_order(&manager(), NewOrderBuilder::new("PO-4").quantity(0).build());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = env
        .order_api
        .create_order(&manager(), NewOrderBuilder::new("  ").build());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = env.order_api.create_order(
        &manager(),
        NewOrderBuilder::new("PO-5").material_cost(-1.0).build(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = env.order_api.create_order(
        &manager(),
        NewOrderBuilder::new("PO-6").rates(-25.0, -1.0).build(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = env.order_api.create_order(
        &manager(),
        NewOrderBuilder::new("PO-7").rates(25.0, f64::NAN).build(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    // 配置中的默认费率同样校验
    env.config_manager
        .set_global_config_value(config_keys::DEFAULT_MINUTE_RATE_DOMESTIC, "-3")
        .unwrap();
    let result = env
        .order_api
        .create_order(&manager(), NewOrderBuilder::new("PO-8").build());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    assert!(env.order_api.list_orders(&manager()).unwrap().is_empty());
}

#[tokio::test]
async fn test_order_api_inside_async_runtime() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let created = env
        .order_api
        .create_order(&manager(), NewOrderBuilder::new("PO-T").build())
        .expect("创建失败");
    assert_eq!(created.minute_rate_domestic, 25.0);

    let orders = env.order_api.list_orders(&employee()).unwrap();
    assert_eq!(orders.len(), 1);

    let dashboard = env.dashboard_api.get_dashboard(&manager()).unwrap();
    assert_eq!(dashboard.stats.total, 1);
}

// ==========================================
// 查询
// ==========================================

#[test]
fn test_get_order_role_views() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-10"));
    env.order_api
        .attach_file(&manager(), &order.id, "a1.pdf", "чертеж.pdf", "uploads/a1.pdf")
        .expect("上传失败");

    let manager_view = env.order_api.get_order(&manager(), &order.id).unwrap();
    assert_eq!(manager_view.files.len(), 1);
    assert_eq!(manager_view.material_cost, 1000.0);

    let employee_view = env.order_api.get_order(&employee(), &order.id).unwrap();
    assert!(employee_view.files.is_empty());
    assert_eq!(employee_view.material_cost, 0.0);
    assert_eq!(employee_view.minute_rate_domestic, 0.0);
    assert_eq!(employee_view.minute_rate_foreign, 0.0);
    assert_eq!(employee_view.quantity, order.quantity);
    assert_eq!(employee_view.stages, order.stages);

    // 存储中的订单不受影响
    assert_eq!(env.reload(&order.id).files.len(), 1);
}

#[test]
fn test_get_order_not_found() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let result = env.order_api.get_order(&manager(), "missing");
    assert!(matches!(result, Err(ApiError::OrderNotFound(_))));
}

#[test]
fn test_list_orders_limit() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    for i in 0..3 {
        env.create_order(NewOrderBuilder::new(&format!("PO-L{}", i)));
    }

    assert_eq!(env.order_api.list_orders(&manager()).unwrap().len(), 3);

    env.config_manager
        .set_global_config_value(config_keys::ORDER_LIST_LIMIT, "2")
        .unwrap();
    let orders = env.order_api.list_orders(&employee()).unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.material_cost == 0.0));
}

// ==========================================
// 修改/删除
// ==========================================

#[test]
fn test_update_order_manager_only() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-20"));
    let update = OrderUpdate {
        quantity: Some(200),
        market_type: Some(MarketType::Foreign),
        ..Default::default()
    };

    let result = env
        .order_api
        .update_order(&employee(), &order.id, update.clone());
    assert!(matches!(result, Err(ApiError::PermissionDenied(_))));

    let updated = env
        .order_api
        .update_order(&manager(), &order.id, update)
        .expect("修改失败");
    assert_eq!(updated.quantity, 200);
    assert_eq!(updated.market_type, MarketType::Foreign);
    assert_eq!(env.reload(&order.id).quantity, 200);
}

#[test]
fn test_update_order_empty_and_missing() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-21"));

    let result = env
        .order_api
        .update_order(&manager(), &order.id, OrderUpdate::default());
    assert!(matches!(result, Err(ApiError::EmptyUpdate)));

    let result = env.order_api.update_order(
        &manager(),
        "missing",
        OrderUpdate {
            client_name: Some("x".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(ApiError::OrderNotFound(_))));
}

#[test]
fn test_update_order_rejects_invalid_rates() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-22"));

    for update in [
        OrderUpdate {
            minute_rate_domestic: Some(-1.0),
            ..Default::default()
        },
        OrderUpdate {
            minute_rate_foreign: Some(f64::INFINITY),
            ..Default::default()
        },
    ] {
        let result = env.order_api.update_order(&manager(), &order.id, update);
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    let stored = env.reload(&order.id);
    assert_eq!(stored.minute_rate_domestic, 25.0);
    assert_eq!(stored.minute_rate_foreign, 0.42);
}

#[test]
fn test_delete_order() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-30"));

    let result = env.order_api.delete_order(&employee(), &order.id);
    assert!(matches!(result, Err(ApiError::PermissionDenied(_))));

    env.order_api
        .delete_order(&manager(), &order.id)
        .expect("删除失败");
    assert!(env.order_repo.find_by_id(&order.id).unwrap().is_none());

    // 日志保留
    let logs = env.action_log_repo.find_by_order(&order.id).unwrap();
    assert_eq!(logs.len(), 2);

    let result = env.order_api.delete_order(&manager(), &order.id);
    assert!(matches!(result, Err(ApiError::OrderNotFound(_))));
}

#[test]
fn test_attach_file_employee_denied() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(NewOrderBuilder::new("PO-31"));

    let result = env
        .order_api
        .attach_file(&employee(), &order.id, "a.pdf", "a.pdf", "uploads/a.pdf");
    assert!(matches!(result, Err(ApiError::PermissionDenied(_))));

    let result = env
        .order_api
        .attach_file(&manager(), "missing", "a.pdf", "a.pdf", "uploads/a.pdf");
    assert!(matches!(result, Err(ApiError::OrderNotFound(_))));
}

// ==========================================
// 成本
// ==========================================

#[test]
fn test_order_cost_breakdown() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(
        NewOrderBuilder::new("PO-40")
            .quantity(10)
            .material_cost(1000.0)
            .processing_time(45.0)
            .rates(25.0, 0.42),
    );

    let cost = env.order_api.get_order_cost(&manager(), &order.id).unwrap();
    assert_eq!(cost.material_cost_per_unit, 100.0);
    assert_eq!(cost.processing_cost_per_unit, 1125.0);
    assert_eq!(cost.total_cost_per_unit, 1225.0);
    assert_eq!(cost.total_order_cost, 12250.0);

    let result = env.order_api.get_order_cost(&employee(), &order.id);
    assert!(matches!(result, Err(ApiError::PermissionDenied(_))));
}

#[test]
fn test_order_cost_foreign_market() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let order = env.create_order(
        NewOrderBuilder::new("PO-41")
            .quantity(5)
            .material_cost(500.0)
            .processing_time(60.0)
            .market(MarketType::Foreign)
            .rates(25.0, 0.5),
    );

    let cost = env.order_api.get_order_cost(&manager(), &order.id).unwrap();
    assert_eq!(cost.processing_rate, 0.5);
    assert_eq!(cost.processing_cost_per_unit, 30.0);
    assert_eq!(cost.total_order_cost, 650.0);

    let stored = env.reload(&order.id);
    assert_eq!(stored.stage(StageKind::Shipping).unwrap().units(), 0);
}
