// ==========================================
// 生产订单跟踪系统 - 订单 API
// ==========================================
// 职责: 订单创建、查询、修改、删除、附件登记、成本查询
// 权限: 修改/删除/附件/成本仅限 Manager
// 视图: 返回给调用方的订单一律经过 VisibilityFilter
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::order_locks::OrderLocks;
use crate::config::{block_on_config, OrderConfigReader};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::order::{FileInfo, NewOrder, Order, OrderUpdate};
use crate::domain::stage::default_stages;
use crate::domain::types::Caller;
use crate::engine::cost::{CostBreakdown, CostCalculator};
use crate::engine::shipping::ReadyToShipCalculator;
use crate::engine::visibility::{Capabilities, VisibilityFilter};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::order_repo::OrderRepository;

// ==========================================
// OrderApi - 订单 API
// ==========================================
pub struct OrderApi {
    order_repo: Arc<OrderRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn OrderConfigReader>,
    order_locks: Arc<OrderLocks>,
}

impl OrderApi {
    pub fn new(
        order_repo: Arc<OrderRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn OrderConfigReader>,
        order_locks: Arc<OrderLocks>,
    ) -> Self {
        Self {
            order_repo,
            action_log_repo,
            config,
            order_locks,
        }
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建订单
    ///
    /// # 说明
    /// - 任意角色均可创建
    /// - 8 道工序由 default_stages() 生成
    /// - 未指定费率时读取配置默认值
    pub fn create_order(&self, caller: &Caller, input: NewOrder) -> ApiResult<Order> {
        if input.order_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单号不能为空".to_string()));
        }
        if input.client_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户名称不能为空".to_string()));
        }
        validate_quantity(input.quantity)?;
        validate_non_negative("material_cost", input.material_cost)?;
        validate_non_negative("processing_time_per_unit", input.processing_time_per_unit)?;

        let minute_rate_domestic = match input.minute_rate_domestic {
            Some(v) => v,
            None => self.read_config(self.config.get_default_minute_rate_domestic())?,
        };
        let minute_rate_foreign = match input.minute_rate_foreign {
            Some(v) => v,
            None => self.read_config(self.config.get_default_minute_rate_foreign())?,
        };
        validate_non_negative("minute_rate_domestic", minute_rate_domestic)?;
        validate_non_negative("minute_rate_foreign", minute_rate_foreign)?;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: input.order_number,
            client_name: input.client_name,
            description: input.description,
            processing_types: input.processing_types,
            quantity: input.quantity,
            market_type: input.market_type,
            material_cost: input.material_cost,
            processing_time_per_unit: input.processing_time_per_unit,
            minute_rate_domestic,
            minute_rate_foreign,
            files: Vec::new(),
            stages: default_stages(),
            created_at: Utc::now(),
            created_by: caller.user_id.clone(),
            revision: 0,
        };

        self.order_repo.insert(&order)?;

        self.log_action(
            caller,
            ActionType::CreateOrder,
            Some(&order.id),
            json!({
                "order_number": order.order_number,
                "quantity": order.quantity,
                "market_type": order.market_type,
            }),
            format!("创建订单: {}", order.order_number),
        )?;

        info!(order_id = %order.id, order_number = %order.order_number, actor = %caller.user_id, "订单已创建");
        Ok(VisibilityFilter::filter_for_role(&order, caller.role))
    }

    /// 修改订单字段（仅 Manager）
    pub fn update_order(
        &self,
        caller: &Caller,
        order_id: &str,
        update: OrderUpdate,
    ) -> ApiResult<Order> {
        require_manager(caller, "修改订单")?;
        if update.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(cost) = update.material_cost {
            validate_non_negative("material_cost", cost)?;
        }
        if let Some(time) = update.processing_time_per_unit {
            validate_non_negative("processing_time_per_unit", time)?;
        }
        if let Some(rate) = update.minute_rate_domestic {
            validate_non_negative("minute_rate_domestic", rate)?;
        }
        if let Some(rate) = update.minute_rate_foreign {
            validate_non_negative("minute_rate_foreign", rate)?;
        }

        let order = self.order_locks.with_lock(order_id, || -> ApiResult<Order> {
            let mut order = self.load(order_id)?;
            update.apply_to(&mut order);
            self.order_repo.update(&order)?;
            Ok(order)
        })?;

        self.log_action(
            caller,
            ActionType::UpdateOrder,
            Some(order_id),
            serde_json::to_value(&update).unwrap_or_default(),
            format!("修改订单: {}", order.order_number),
        )?;

        info!(order_id = %order_id, actor = %caller.user_id, "订单已修改");
        Ok(order)
    }

    /// 删除订单（仅 Manager,工序与附件记录级联删除）
    pub fn delete_order(&self, caller: &Caller, order_id: &str) -> ApiResult<()> {
        require_manager(caller, "删除订单")?;

        self.order_locks
            .with_lock(order_id, || self.order_repo.delete(order_id))?;

        self.log_action(
            caller,
            ActionType::DeleteOrder,
            Some(order_id),
            json!({ "order_id": order_id }),
            "删除订单".to_string(),
        )?;

        warn!(order_id = %order_id, actor = %caller.user_id, "订单已删除");
        Ok(())
    }

    /// 登记附件元数据（仅 Manager,文件内容由外部存储负责）
    pub fn attach_file(
        &self,
        caller: &Caller,
        order_id: &str,
        filename: &str,
        original_filename: &str,
        file_path: &str,
    ) -> ApiResult<FileInfo> {
        require_manager(caller, "上传附件")?;
        if filename.trim().is_empty() || file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件名与存储路径不能为空".to_string()));
        }

        let file = FileInfo {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            original_filename: original_filename.to_string(),
            file_path: file_path.to_string(),
            uploaded_at: Utc::now(),
        };
        self.order_repo.add_file(order_id, &file)?;

        self.log_action(
            caller,
            ActionType::AttachFile,
            Some(order_id),
            json!({ "file_id": file.id, "original_filename": file.original_filename }),
            format!("上传附件: {}", file.original_filename),
        )?;

        info!(order_id = %order_id, file_id = %file.id, "附件已登记");
        Ok(file)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询订单列表（按角色过滤,上限取配置值）
    pub fn list_orders(&self, caller: &Caller) -> ApiResult<Vec<Order>> {
        let limit = self.read_config(self.config.get_order_list_limit())?;
        let orders = self.order_repo.list_all(limit)?;
        Ok(VisibilityFilter::filter_all(orders, caller.role))
    }

    /// 查询单个订单（按角色过滤）
    pub fn get_order(&self, caller: &Caller, order_id: &str) -> ApiResult<Order> {
        let order = self.load(order_id)?;
        Ok(VisibilityFilter::filter_for_role(&order, caller.role))
    }

    /// 查询订单成本明细（仅 Manager）
    pub fn get_order_cost(&self, caller: &Caller, order_id: &str) -> ApiResult<CostBreakdown> {
        if !Capabilities::for_role(caller.role).can_see_costs {
            return Err(ApiError::PermissionDenied(format!(
                "角色{}无权查看成本",
                caller.role
            )));
        }
        let order = self.load(order_id)?;
        Ok(CostCalculator::breakdown(&order))
    }

    /// 查询待发货件数（包装完成件数 - 已发货件数,不小于 0）
    pub fn get_ready_to_ship(&self, _caller: &Caller, order_id: &str) -> ApiResult<i64> {
        let order = self.load(order_id)?;
        Ok(ReadyToShipCalculator::ready_to_ship(&order))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn load(&self, order_id: &str) -> ApiResult<Order> {
        self.order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::OrderNotFound(order_id.to_string()))
    }

    fn read_config<F, T>(&self, fut: F) -> ApiResult<T>
    where
        F: std::future::Future<Output = Result<T, Box<dyn std::error::Error>>> + Send,
        T: Send,
    {
        block_on_config(fut).map_err(|e| ApiError::InternalError(format!("读取配置失败: {}", e)))
    }

    fn log_action(
        &self,
        caller: &Caller,
        action_type: ActionType,
        order_id: Option<&str>,
        payload: serde_json::Value,
        detail: String,
    ) -> ApiResult<()> {
        let action_log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            order_id: order_id.map(|s| s.to_string()),
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: caller.user_id.clone(),
            payload_json: Some(payload),
            detail: Some(detail),
        };
        self.action_log_repo.insert(&action_log)?;
        Ok(())
    }
}

// ==========================================
// 校验辅助函数
// ==========================================

pub(crate) fn require_manager(caller: &Caller, operation: &str) -> ApiResult<()> {
    if Capabilities::for_role(caller.role).can_manage_orders {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(format!(
            "角色{}无权执行: {}",
            caller.role, operation
        )))
    }
}

fn validate_quantity(quantity: i64) -> ApiResult<()> {
    if quantity <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "订单数量必须为正整数，实际为{}",
            quantity
        )));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ApiResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "字段{}必须为非负数，实际为{}",
            field, value
        )));
    }
    Ok(())
}
