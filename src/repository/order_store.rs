// ==========================================
// 生产订单跟踪系统 - 订单存储 Trait
// ==========================================
// 职责: 工序更新边界层所需的最小持久化接口
// 红线: Repository 不含业务规则,只做数据读写
// ==========================================

use crate::domain::order::Order;
use crate::domain::stage::ProductionStage;
use crate::repository::error::RepositoryResult;

// ==========================================
// OrderStore Trait
// ==========================================
// 实现者: OrderRepository（rusqlite）
pub trait OrderStore: Send + Sync {
    /// 读取订单快照（含 8 道工序、附件、revision）
    ///
    /// # 返回
    /// - Ok(Some(Order)): 找到订单
    /// - Ok(None): 订单不存在
    fn load_order(&self, order_id: &str) -> RepositoryResult<Option<Order>>;

    /// 保存工序序列（带乐观锁检查）
    ///
    /// # 参数
    /// - expected_revision: 读取快照时的 revision
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 订单不存在
    /// - `RepositoryError::OptimisticLockFailure`: revision 不匹配（其他写入者已保存）
    fn save_stages(
        &self,
        order_id: &str,
        stages: &[ProductionStage],
        expected_revision: i64,
    ) -> RepositoryResult<()>;
}
