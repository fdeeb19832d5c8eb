// ==========================================
// 生产订单跟踪系统 - 订单配置读取 Trait
// ==========================================
// 职责: 定义订单模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// OrderConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait OrderConfigReader: Send + Sync {
    /// 新建订单未指定时的国内分钟费率
    ///
    /// # 默认值
    /// - 25.0
    async fn get_default_minute_rate_domestic(&self) -> Result<f64, Box<dyn Error>>;

    /// 新建订单未指定时的国外分钟费率
    ///
    /// # 默认值
    /// - 0.42
    async fn get_default_minute_rate_foreign(&self) -> Result<f64, Box<dyn Error>>;

    /// 订单列表最大返回条数
    ///
    /// # 默认值
    /// - 1000
    async fn get_order_list_limit(&self) -> Result<i64, Box<dyn Error>>;
}
