// ==========================================
// OEE 生产监控系统 - 字段映射器
// ==========================================
// 职责: 源列名 → 记录存储标准列名
// 旧电子表格的列名并不统一（英文变体 / 印尼语遗留列名），
// 导入时统一映射到 RecordTable::columns() 的标准列
// ==========================================

use crate::engine::normalize::normalize_key;
use crate::repository::record_store::{RawRow, RecordTable};

pub struct FieldMapper;

impl FieldMapper {
    /// 规整后的源列名 → 标准列名（不认识的列返回 None，导入时丢弃）
    fn canonical_column(table: RecordTable, normalized: &str) -> Option<&'static str> {
        let common = match normalized {
            "date" | "tanggal" => Some("date"),
            "line" => Some("line"),
            "shift" => Some("shift"),
            "sku" | "sku/produk" | "product" | "produk" => Some("sku"),
            "entered_by" | "user" => Some("entered_by"),
            _ => None,
        };
        if common.is_some() {
            return common;
        }

        match table {
            RecordTable::Production => match normalized {
                "loading_time" | "loading_time_(menit)" => Some("loading_time"),
                "output_maximum" | "output_maksimal" => Some("output_maximum"),
                "good_output" | "good_product_output" => Some("good_output"),
                "defect_count" | "hold_&_all_defect" => Some("defect_count"),
                _ => None,
            },
            RecordTable::Downtime => match normalized {
                "start_time" | "start" => Some("start_time"),
                "finish_time" | "finish" => Some("finish_time"),
                "description" | "downtime" => Some("description"),
                "category" | "kategori" => Some("category"),
                "work_center" | "workcenter" => Some("work_center"),
                "process" | "proses" => Some("process"),
                "equipment" => Some("equipment"),
                _ => None,
            },
        }
    }

    /// 整行映射：列名规整 + 别名映射；未识别的列丢弃
    pub fn map_row(table: RecordTable, row: &RawRow) -> RawRow {
        let mut mapped = RawRow::new();
        for (key, value) in row {
            let normalized = normalize_key(key);
            if let Some(canonical) = Self::canonical_column(table, &normalized) {
                mapped.insert(canonical.to_string(), value.trim().to_string());
            }
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_production_english_variants() {
        let mut row = RawRow::new();
        row.insert("Date".to_string(), "2025-03-01".to_string());
        row.insert("Loading Time".to_string(), "480".to_string());
        row.insert("Good Product Output".to_string(), "900".to_string());
        row.insert("unrelated".to_string(), "x".to_string());

        let mapped = FieldMapper::map_row(RecordTable::Production, &row);
        assert_eq!(mapped["date"], "2025-03-01");
        assert_eq!(mapped["loading_time"], "480");
        assert_eq!(mapped["good_output"], "900");
        assert!(!mapped.contains_key("unrelated"));
    }

    #[test]
    fn test_map_downtime_legacy_headers() {
        let mut row = RawRow::new();
        row.insert("tanggal".to_string(), "2025-03-01".to_string());
        row.insert("kategori".to_string(), "Breakdown".to_string());
        row.insert("Start".to_string(), "08:00".to_string());
        row.insert("Finish".to_string(), "09:00".to_string());
        row.insert("proses".to_string(), "Mixing".to_string());

        let mapped = FieldMapper::map_row(RecordTable::Downtime, &row);
        assert_eq!(mapped["date"], "2025-03-01");
        assert_eq!(mapped["category"], "Breakdown");
        assert_eq!(mapped["start_time"], "08:00");
        assert_eq!(mapped["finish_time"], "09:00");
        assert_eq!(mapped["process"], "Mixing");
    }
}
