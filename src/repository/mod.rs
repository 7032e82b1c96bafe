// ==========================================
// OEE 生产监控系统 - 数据仓储层
// ==========================================

pub mod error;
pub mod record_store;
pub mod sheet_store;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::{RawRow, RecordStore, RecordTable};
pub use sheet_store::SqliteSheetStore;
