// ==========================================
// OEE 生产监控系统 - 记录导入器
// ==========================================
// 职责: 旧电子表格导出文件整批回填到记录存储
// - 按扩展名选择解析器（.csv / .xlsx / .xls）
// - 列名经 FieldMapper 映射到标准列
// - 行内容不做校验（引擎容忍坏单元格），逐行追加
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, ExcelParser, FileParser};
use crate::repository::record_store::{RecordStore, RecordTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 导入结果摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// 追加成功的行数
    pub appended: usize,
    /// 因映射后全空而跳过的行数
    pub skipped: usize,
}

/// 记录导入器
pub struct RecordImporter {
    store: Arc<dyn RecordStore>,
}

impl RecordImporter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 导入一个文件到指定表
    ///
    /// # 参数
    /// - table: 目标表（production / downtime）
    /// - file_path: 文件路径（.csv/.xlsx/.xls）
    ///
    /// # 返回
    /// - Ok(ImportSummary): 追加/跳过行数
    /// - Err(ImportError): 文件或存储错误（单行追加失败即中断）
    pub fn import_file(&self, table: RecordTable, file_path: &Path) -> ImportResult<ImportSummary> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let rows = match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_rows(file_path)?,
            // Excel 工作表名与表名一致（旧表格的 "oee"/"downtime" 工作表）
            "xlsx" | "xls" => {
                let worksheet = match table {
                    RecordTable::Production => "oee",
                    RecordTable::Downtime => "downtime",
                };
                ExcelParser::new(worksheet).parse_to_raw_rows(file_path)?
            }
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        };

        let mut appended = 0usize;
        let mut skipped = 0usize;
        for row in &rows {
            let mapped = FieldMapper::map_row(table, row);
            if mapped.values().all(|v| v.is_empty()) {
                skipped += 1;
                continue;
            }
            self.store.append_row(table, &mapped)?;
            appended += 1;
        }

        tracing::info!(
            table = table.name(),
            file = %file_path.display(),
            appended,
            skipped,
            "文件导入完成"
        );

        Ok(ImportSummary { appended, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sheet_store::SqliteSheetStore;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;

    fn in_memory_store() -> Arc<SqliteSheetStore> {
        let conn = Connection::open_in_memory().unwrap();
        Arc::new(SqliteSheetStore::from_connection(Arc::new(Mutex::new(conn))).unwrap())
    }

    #[test]
    fn test_import_csv_into_production() {
        let store = in_memory_store();
        let importer = RecordImporter::new(store.clone());

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Date,Line,Shift,SKU,Loading Time,Output Maximum,Good Output,Defect Count,Entered By").unwrap();
        writeln!(file, "2025-03-01,1,1,SKU-A,480,1000,900,50,admin").unwrap();
        writeln!(file, "2025-03-02,2,1,SKU-B,460,900,700,30,admin").unwrap();
        file.flush().unwrap();

        let summary = importer
            .import_file(RecordTable::Production, file.path())
            .unwrap();
        assert_eq!(summary.appended, 2);
        assert_eq!(summary.skipped, 0);

        let rows = store.read_table(RecordTable::Production).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["loading_time"], "480");
        assert_eq!(rows[1]["sku"], "SKU-B");
    }

    #[test]
    fn test_import_skips_unmappable_rows() {
        let store = in_memory_store();
        let importer = RecordImporter::new(store.clone());

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "foo,bar").unwrap();
        writeln!(file, "x,y").unwrap();
        file.flush().unwrap();

        let summary = importer
            .import_file(RecordTable::Production, file.path())
            .unwrap();
        assert_eq!(summary.appended, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_import_unknown_extension() {
        let importer = RecordImporter::new(in_memory_store());
        let err = importer
            .import_file(RecordTable::Production, Path::new("records.txt"))
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
