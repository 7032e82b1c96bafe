// ==========================================
// OEE 生产监控系统 - SQLite 记录存储
// ==========================================
// 职责: 以 SQLite 实现电子表格语义的记录存储
// - 全 TEXT 列、无主键、无唯一约束（重复行允许存在）
// - 读取按 rowid（即写入顺序）
// - 追加不走事务组：生产行与停机行各自独立追加
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{RawRow, RecordStore, RecordTable};
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// SQLite 记录存储
pub struct SqliteSheetStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSheetStore {
    /// 打开（或创建）数据库文件并确保两张表存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// 从已有连接创建（测试常用 in-memory 连接）
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)
                .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        }
        let store = Self { conn };
        store.ensure_tables()?;
        Ok(store)
    }

    /// 共享底层连接（供 ConfigManager 等复用同一数据库文件）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 建表（幂等）。全 TEXT 列，无主键。
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        for table in [RecordTable::Production, RecordTable::Downtime] {
            let cols = table
                .columns()
                .iter()
                .map(|c| format!("{} TEXT", c))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", table.name(), cols);
            conn.execute(&sql, [])?;
        }
        Ok(())
    }
}

impl RecordStore for SqliteSheetStore {
    fn read_table(&self, table: RecordTable) -> RepositoryResult<Vec<RawRow>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let columns = table.columns();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            columns.join(", "),
            table.name()
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| {
                let mut raw = RawRow::new();
                for (idx, col) in columns.iter().enumerate() {
                    let value: Option<String> = row.get(idx)?;
                    raw.insert((*col).to_string(), value.unwrap_or_default());
                }
                Ok(raw)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(table = table.name(), rows = rows.len(), "整表读取完成");
        Ok(rows)
    }

    fn append_row(&self, table: RecordTable, row: &RawRow) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let columns = table.columns();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders
        );

        // 未提供的列落为空串；多余的键忽略
        let values: Vec<String> = columns
            .iter()
            .map(|col| row.get(*col).cloned().unwrap_or_default())
            .collect();

        conn.execute(&sql, params_from_iter(values.iter()))
            .map_err(|e| RepositoryError::DatabaseWriteError(e.to_string()))?;

        tracing::debug!(table = table.name(), "追加一行");
        Ok(())
    }
}
