// ==========================================
// 生产订单跟踪系统 - 配置层
// ==========================================
// 职责: 系统配置读取（费率默认值、列表上限）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod order_config_trait;

// 重导出核心配置管理器
pub use config_manager::{block_on_config, config_keys, ConfigManager};
pub use order_config_trait::OrderConfigReader;
