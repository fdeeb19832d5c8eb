// ==========================================
// 生产订单跟踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联删除工序/附件依赖它）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表脚本幂等，启动时与测试时共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并写入 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS production_order (
            order_id TEXT PRIMARY KEY,
            order_number TEXT NOT NULL,
            client_name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            processing_types_json TEXT NOT NULL DEFAULT '[]',
            quantity INTEGER NOT NULL,
            market_type TEXT NOT NULL CHECK(market_type IN ('domestic', 'foreign')),
            material_cost REAL NOT NULL,
            processing_time_per_unit REAL NOT NULL,
            minute_rate_domestic REAL NOT NULL,
            minute_rate_foreign REAL NOT NULL,
            created_at TEXT NOT NULL,
            created_by TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS production_stage (
            order_id TEXT NOT NULL REFERENCES production_order(order_id) ON DELETE CASCADE,
            stage_index INTEGER NOT NULL CHECK(stage_index BETWEEN 0 AND 7),
            stage_id TEXT NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('gating', 'quantity')),
            status TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            percentage INTEGER NOT NULL DEFAULT 0,
            completed_units INTEGER,
            notes TEXT,
            responsible_person TEXT,
            PRIMARY KEY (order_id, stage_index),
            UNIQUE (order_id, stage_id)
        );

        CREATE TABLE IF NOT EXISTS order_file (
            file_id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES production_order(order_id) ON DELETE CASCADE,
            filename TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            file_path TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            order_id TEXT,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_order_file_order ON order_file(order_id);
        CREATE INDEX IF NOT EXISTS idx_action_log_order ON action_log(order_id);
        CREATE INDEX IF NOT EXISTS idx_action_log_ts ON action_log(action_ts DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
