// ==========================================
// 生产订单跟踪系统 - 订单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: production_order / production_stage / order_file
// 并发控制: production_order.revision 乐观锁
// ==========================================

use crate::domain::order::{FileInfo, Order};
use crate::domain::stage::ProductionStage;
use crate::domain::types::{MarketType, StageCategory, StageKind, StageStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::order_store::OrderStore;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 订单固定工序数
pub const STAGE_COUNT: usize = 8;

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入订单（订单行 + 8 道工序 + 附件,单事务）
    pub fn insert(&self, order: &Order) -> RepositoryResult<()> {
        if order.stages.len() != STAGE_COUNT {
            return Err(RepositoryError::FieldValueError {
                field: "stages".to_string(),
                message: format!("工序数量必须为{}，实际为{}", STAGE_COUNT, order.stages.len()),
            });
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO production_order (
                order_id, order_number, client_name, description, processing_types_json,
                quantity, market_type, material_cost, processing_time_per_unit,
                minute_rate_domestic, minute_rate_foreign,
                created_at, created_by, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                order.id,
                order.order_number,
                order.client_name,
                order.description,
                serde_json::to_string(&order.processing_types)?,
                order.quantity,
                order.market_type.to_db_str(),
                order.material_cost,
                order.processing_time_per_unit,
                order.minute_rate_domestic,
                order.minute_rate_foreign,
                order.created_at,
                order.created_by,
                order.revision,
            ],
        )?;

        for stage in &order.stages {
            tx.execute(
                r#"
                INSERT INTO production_stage (
                    order_id, stage_index, stage_id, name, category, status,
                    start_date, end_date, percentage, completed_units,
                    notes, responsible_person
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    order.id,
                    stage.index() as i64,
                    stage.id,
                    stage.name,
                    stage.category.to_db_str(),
                    stage.status.to_db_str(),
                    stage.start_date,
                    stage.end_date,
                    stage.percentage,
                    stage.completed_units,
                    stage.notes,
                    stage.responsible_person,
                ],
            )?;
        }

        for file in &order.files {
            insert_file_row(&tx, &order.id, file)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 更新订单字段（不含工序）
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 订单不存在
    pub fn update(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE production_order
            SET client_name = ?1, description = ?2, processing_types_json = ?3,
                quantity = ?4, market_type = ?5, material_cost = ?6,
                processing_time_per_unit = ?7, minute_rate_domestic = ?8,
                minute_rate_foreign = ?9
            WHERE order_id = ?10
            "#,
            params![
                order.client_name,
                order.description,
                serde_json::to_string(&order.processing_types)?,
                order.quantity,
                order.market_type.to_db_str(),
                order.material_cost,
                order.processing_time_per_unit,
                order.minute_rate_domestic,
                order.minute_rate_foreign,
                order.id,
            ],
        )?;

        if rows == 0 {
            return Err(not_found(&order.id));
        }
        Ok(())
    }

    /// 删除订单（工序与附件记录级联删除）
    pub fn delete(&self, order_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM production_order WHERE order_id = ?1",
            params![order_id],
        )?;

        if rows == 0 {
            return Err(not_found(order_id));
        }
        Ok(())
    }

    /// 追加附件元数据
    pub fn add_file(&self, order_id: &str, file: &FileInfo) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if !order_exists(&conn, order_id)? {
            return Err(not_found(order_id));
        }
        insert_file_row(&conn, order_id, file)?;
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                &format!("{} WHERE order_id = ?1", SELECT_ORDER_SQL),
                params![order_id],
                map_order_row,
            )
            .optional()?;

        match order {
            Some(mut order) => {
                order.stages = read_stages(&conn, &order.id)?;
                order.files = read_files(&conn, &order.id)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// 查询订单列表（按创建时间倒序）
    pub fn list_all(&self, limit: i64) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, order_number ASC LIMIT ?1",
            SELECT_ORDER_SQL
        ))?;

        let mut orders = stmt
            .query_map(params![limit], map_order_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        for order in orders.iter_mut() {
            order.stages = read_stages(&conn, &order.id)?;
            order.files = read_files(&conn, &order.id)?;
        }

        Ok(orders)
    }
}

// ==========================================
// OrderStore 实现
// ==========================================
impl OrderStore for OrderRepository {
    fn load_order(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        self.find_by_id(order_id)
    }

    fn save_stages(
        &self,
        order_id: &str,
        stages: &[ProductionStage],
        expected_revision: i64,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 先推进 revision,失败说明记录不存在或已被其他写入者修改
        let rows = tx.execute(
            "UPDATE production_order SET revision = revision + 1 WHERE order_id = ?1 AND revision = ?2",
            params![order_id, expected_revision],
        )?;

        if rows == 0 {
            let actual: Option<i64> = tx
                .query_row(
                    "SELECT revision FROM production_order WHERE order_id = ?1",
                    params![order_id],
                    |row| row.get(0),
                )
                .optional()?;

            return match actual {
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    order_id: order_id.to_string(),
                    expected: expected_revision,
                    actual,
                }),
                None => Err(not_found(order_id)),
            };
        }

        for stage in stages {
            tx.execute(
                r#"
                UPDATE production_stage
                SET status = ?1, start_date = ?2, end_date = ?3, percentage = ?4,
                    completed_units = ?5, notes = ?6, responsible_person = ?7
                WHERE order_id = ?8 AND stage_id = ?9
                "#,
                params![
                    stage.status.to_db_str(),
                    stage.start_date,
                    stage.end_date,
                    stage.percentage,
                    stage.completed_units,
                    stage.notes,
                    stage.responsible_person,
                    order_id,
                    stage.id,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

// ==========================================
// 行映射辅助函数
// ==========================================

const SELECT_ORDER_SQL: &str = r#"
    SELECT
        order_id, order_number, client_name, description, processing_types_json,
        quantity, market_type, material_cost, processing_time_per_unit,
        minute_rate_domestic, minute_rate_foreign,
        created_at, created_by, revision
    FROM production_order
"#;

fn not_found(order_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Order".to_string(),
        id: order_id.to_string(),
    }
}

fn order_exists(conn: &Connection, order_id: &str) -> RepositoryResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM production_order WHERE order_id = ?1",
            params![order_id],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    Ok(exists)
}

fn insert_file_row(conn: &Connection, order_id: &str, file: &FileInfo) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO order_file (file_id, order_id, filename, original_filename, file_path, uploaded_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            file.id,
            order_id,
            file.filename,
            file.original_filename,
            file.file_path,
            file.uploaded_at,
        ],
    )?;
    Ok(())
}

/// 订单行映射（工序与附件另行读取）
fn map_order_row(row: &Row) -> SqliteResult<Order> {
    let processing_types_json: String = row.get(4)?;
    let processing_types = serde_json::from_str(&processing_types_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Order {
        id: row.get(0)?,
        order_number: row.get(1)?,
        client_name: row.get(2)?,
        description: row.get(3)?,
        processing_types,
        quantity: row.get(5)?,
        market_type: MarketType::parse(&row.get::<_, String>(6)?),
        material_cost: row.get(7)?,
        processing_time_per_unit: row.get(8)?,
        minute_rate_domestic: row.get(9)?,
        minute_rate_foreign: row.get(10)?,
        files: Vec::new(),
        stages: Vec::new(),
        created_at: row.get::<_, DateTime<Utc>>(11)?,
        created_by: row.get(12)?,
        revision: row.get(13)?,
    })
}

fn read_stages(conn: &Connection, order_id: &str) -> RepositoryResult<Vec<ProductionStage>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT
            stage_index, stage_id, name, category, status,
            start_date, end_date, percentage, completed_units,
            notes, responsible_person
        FROM production_stage
        WHERE order_id = ?1
        ORDER BY stage_index ASC
        "#,
    )?;

    let stages = stmt
        .query_map(params![order_id], |row| {
            let stage_index: i64 = row.get(0)?;
            let kind = StageKind::from_index(stage_index as usize)
                .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, stage_index))?;

            Ok(ProductionStage {
                id: row.get(1)?,
                kind,
                name: row.get(2)?,
                category: StageCategory::parse(&row.get::<_, String>(3)?),
                status: StageStatus::parse(&row.get::<_, String>(4)?),
                start_date: row.get::<_, Option<NaiveDate>>(5)?,
                end_date: row.get::<_, Option<NaiveDate>>(6)?,
                percentage: row.get(7)?,
                completed_units: row.get(8)?,
                notes: row.get(9)?,
                responsible_person: row.get(10)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    if stages.len() != STAGE_COUNT {
        return Err(RepositoryError::FieldValueError {
            field: "stages".to_string(),
            message: format!(
                "订单{}工序数量异常: 期望{}，实际{}",
                order_id,
                STAGE_COUNT,
                stages.len()
            ),
        });
    }

    Ok(stages)
}

fn read_files(conn: &Connection, order_id: &str) -> RepositoryResult<Vec<FileInfo>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT file_id, filename, original_filename, file_path, uploaded_at
        FROM order_file
        WHERE order_id = ?1
        ORDER BY uploaded_at ASC
        "#,
    )?;

    let files = stmt
        .query_map(params![order_id], |row| {
            Ok(FileInfo {
                id: row.get(0)?,
                filename: row.get(1)?,
                original_filename: row.get(2)?,
                file_path: row.get(3)?,
                uploaded_at: row.get::<_, DateTime<Utc>>(4)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    Ok(files)
}
