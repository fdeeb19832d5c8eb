// ==========================================
// 生产订单跟踪系统 - 订单级互斥锁
// ==========================================
// 职责: 同一进程内按 order_id 串行化 读取→计算→保存
// 跨进程写入由 production_order.revision 乐观锁兜底
// 注册表只保留正在使用的锁,最后一个持有者释放时移除
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// 订单锁注册表
#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: Mutex<LockMap>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 持有指定订单的锁执行 f
    ///
    /// 同一 order_id 的调用依次执行；返回后若无其他等待者则移除该锁
    pub fn with_lock<R>(&self, order_id: &str, f: impl FnOnce() -> R) -> R {
        let lock = self.lock_for(order_id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|p| p.into_inner());
            f()
        };
        drop(lock);
        self.release(order_id);
        result
    }

    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取指定订单的锁（不存在则创建）
    fn lock_for(&self, order_id: &str) -> Arc<Mutex<()>> {
        self.registry()
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 注册表是唯一持有者时移除
    fn release(&self, order_id: &str) {
        let mut locks = self.registry();
        if locks
            .get(order_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(order_id);
        }
    }

    // 注册表内只有 HashMap 操作,中毒时数据仍可用
    fn registry(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(|p| p.into_inner())
    }
}
