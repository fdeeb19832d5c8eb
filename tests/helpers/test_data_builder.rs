// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use production_tracker::domain::order::NewOrder;
use production_tracker::domain::types::{MarketType, ProcessingType};

// ==========================================
// NewOrder 构建器
// ==========================================

pub struct NewOrderBuilder {
    order_number: String,
    client_name: String,
    description: String,
    quantity: i64,
    market_type: MarketType,
    material_cost: f64,
    processing_time_per_unit: f64,
    processing_types: Vec<ProcessingType>,
    minute_rate_domestic: Option<f64>,
    minute_rate_foreign: Option<f64>,
}

impl NewOrderBuilder {
    pub fn new(order_number: &str) -> Self {
        Self {
            order_number: order_number.to_string(),
            client_name: "ООО Заказчик".to_string(),
            description: "Вал приводной".to_string(),
            quantity: 100,
            market_type: MarketType::Domestic,
            material_cost: 1000.0,
            processing_time_per_unit: 45.0,
            processing_types: vec![ProcessingType::Turning],
            minute_rate_domestic: None,
            minute_rate_foreign: None,
        }
    }

    pub fn client(mut self, client: &str) -> Self {
        self.client_name = client.to_string();
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn market(mut self, market_type: MarketType) -> Self {
        self.market_type = market_type;
        self
    }

    pub fn material_cost(mut self, cost: f64) -> Self {
        self.material_cost = cost;
        self
    }

    pub fn processing_time(mut self, minutes: f64) -> Self {
        self.processing_time_per_unit = minutes;
        self
    }

    pub fn rates(mut self, domestic: f64, foreign: f64) -> Self {
        self.minute_rate_domestic = Some(domestic);
        self.minute_rate_foreign = Some(foreign);
        self
    }

    pub fn build(self) -> NewOrder {
        NewOrder {
            order_number: self.order_number,
            client_name: self.client_name,
            description: self.description,
            quantity: self.quantity,
            market_type: self.market_type,
            material_cost: self.material_cost,
            processing_time_per_unit: self.processing_time_per_unit,
            processing_types: self.processing_types,
            minute_rate_domestic: self.minute_rate_domestic,
            minute_rate_foreign: self.minute_rate_foreign,
        }
    }
}
