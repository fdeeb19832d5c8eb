// ==========================================
// 生产订单跟踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::order_config_trait::OrderConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::order::{DEFAULT_MINUTE_RATE_DOMESTIC, DEFAULT_MINUTE_RATE_FOREIGN};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Handle, RuntimeFlavor};

/// 订单列表默认上限
pub const DEFAULT_ORDER_LIST_LIMIT: i64 = 1000;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取数值配置；缺失或无法解析时回落到默认值
    fn get_parsed_or_default<T: std::str::FromStr>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|v| v.trim().parse::<T>().ok())
            .unwrap_or(default))
    }
}

// ==========================================
// OrderConfigReader 实现
// ==========================================
#[async_trait]
impl OrderConfigReader for ConfigManager {
    async fn get_default_minute_rate_domestic(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::DEFAULT_MINUTE_RATE_DOMESTIC,
            DEFAULT_MINUTE_RATE_DOMESTIC,
        )
    }

    async fn get_default_minute_rate_foreign(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::DEFAULT_MINUTE_RATE_FOREIGN,
            DEFAULT_MINUTE_RATE_FOREIGN,
        )
    }

    async fn get_order_list_limit(&self) -> Result<i64, Box<dyn Error>> {
        let limit = self.get_parsed_or_default(config_keys::ORDER_LIST_LIMIT, DEFAULT_ORDER_LIST_LIMIT)?;
        Ok(if limit > 0 { limit } else { DEFAULT_ORDER_LIST_LIMIT })
    }
}

/// 在同步上下文中执行配置读取
///
/// - tokio 多线程运行时: block_in_place + block_on
/// - tokio current_thread 运行时: 不允许 block_in_place,在独立线程上执行
/// - 不在运行时中: 临时创建 current_thread 运行时
pub fn block_on_config<F, T>(fut: F) -> Result<T, Box<dyn Error>>
where
    F: Future<Output = Result<T, Box<dyn Error>>> + Send,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(fut))
        }
        Ok(_) => {
            let joined = std::thread::scope(|s| {
                s.spawn(move || run_on_local_runtime(fut).map_err(|e| e.to_string()))
                    .join()
            });
            match joined {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err("配置读取线程异常退出".into()),
            }
        }
        Err(_) => run_on_local_runtime(fut),
    }
}

fn run_on_local_runtime<F, T>(fut: F) -> Result<T, Box<dyn Error>>
where
    F: Future<Output = Result<T, Box<dyn Error>>>,
{
    let rt = Builder::new_current_thread().enable_all().build()?;
    rt.block_on(fut)
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 费率
    pub const DEFAULT_MINUTE_RATE_DOMESTIC: &str = "default_minute_rate_domestic";
    pub const DEFAULT_MINUTE_RATE_FOREIGN: &str = "default_minute_rate_foreign";

    // 列表
    pub const ORDER_LIST_LIMIT: &str = "order_list_limit";
}
