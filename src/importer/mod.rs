// ==========================================
// OEE 生产监控系统 - 导入层
// ==========================================
// 旧电子表格导出文件的整批回填
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;

pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser};
pub use record_importer::{ImportSummary, RecordImporter};
