// ==========================================
// 生产订单跟踪系统 - 命令行入口
// ==========================================
// 打开数据库、组装 AppState、输出驾驶舱汇总
// ==========================================

use anyhow::anyhow;
use production_tracker::app::{get_default_db_path, AppState};
use production_tracker::domain::types::Caller;
use production_tracker::{i18n, logging, StageKind};

fn main() -> anyhow::Result<()> {
    logging::init();

    if let Ok(locale) = std::env::var("APP_LOCALE") {
        i18n::set_locale(locale.trim());
    }

    tracing::info!("==================================================");
    tracing::info!("{}", production_tracker::APP_NAME);
    tracing::info!("系统版本: {}", production_tracker::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let caller = Caller::manager("cli");

    let dashboard = state
        .dashboard_api
        .get_dashboard(&caller)
        .map_err(|e| anyhow!(e.to_error_json()))?;

    println!(
        "total={} not_started={} in_progress={} completed={}",
        dashboard.stats.total,
        dashboard.stats.not_started,
        dashboard.stats.in_progress,
        dashboard.stats.completed
    );
    println!(
        "{:<16} {:<24} {:>6} {:>8} {:>10} {:>8} {:>8}",
        "order",
        "client",
        "%",
        i18n::stage_display_name(StageKind::Manufacturing),
        i18n::stage_display_name(StageKind::Shipping),
        "ready",
        "cost"
    );
    for summary in &dashboard.orders {
        println!(
            "{:<16} {:<24} {:>6} {:>8} {:>10} {:>8} {:>8}",
            summary.order_number,
            summary.client_name,
            summary.progress,
            summary.manufacturing_units,
            summary.shipped_units,
            summary.ready_to_ship,
            summary
                .total_cost
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    Ok(())
}
