// ==========================================
// OEE 生产监控系统 - 记录规整
// ==========================================
// 职责: 原始行 → 领域记录（指标引擎第 1 步）
// - 列名统一：去空白 + 小写 + 空格转下划线
// - 数值/日期/时刻尽力解析，失败即 None，绝不中断整体计算
// ==========================================

use crate::domain::record::{DowntimeRecord, ProductionRecord};
use crate::repository::record_store::RawRow;
use chrono::{NaiveDate, NaiveTime};

/// 支持的日期格式（按尝试顺序）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// 支持的时刻格式（按尝试顺序）
const CLOCK_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// 列名规整：去空白、小写、内部空白转下划线
///
/// "Loading Time" / " loading_time " → "loading_time"
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 行规整：列名规整 + 单元格去空白
pub fn normalize_row(row: &RawRow) -> RawRow {
    row.iter()
        .map(|(k, v)| (normalize_key(k), v.trim().to_string()))
        .collect()
}

/// 取单元格文本（行须已规整；缺列返回空串）
fn cell<'a>(row: &'a RawRow, key: &str) -> &'a str {
    row.get(key).map(|v| v.as_str()).unwrap_or("")
}

/// 数值尽力解析：非数值 → None
///
/// 容忍千分位逗号（"1,000" → 1000）。
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }
    trimmed.replace(',', "").parse::<f64>().ok()
}

/// 日期尽力解析：失败 → None
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// 时刻（HH:MM）尽力解析：失败 → None
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
}

/// 原始行 → 生产记录
pub fn production_from_row(raw: &RawRow) -> ProductionRecord {
    let row = normalize_row(raw);
    ProductionRecord {
        date: parse_date(cell(&row, "date")),
        line: cell(&row, "line").to_string(),
        shift: cell(&row, "shift").to_string(),
        sku: cell(&row, "sku").to_string(),
        loading_time: parse_number(cell(&row, "loading_time")),
        output_maximum: parse_number(cell(&row, "output_maximum")),
        good_output: parse_number(cell(&row, "good_output")),
        defect_count: parse_number(cell(&row, "defect_count")),
        entered_by: cell(&row, "entered_by").to_string(),
    }
}

/// 原始行 → 停机记录
pub fn downtime_from_row(raw: &RawRow) -> DowntimeRecord {
    let row = normalize_row(raw);
    DowntimeRecord {
        date: parse_date(cell(&row, "date")),
        line: cell(&row, "line").to_string(),
        shift: cell(&row, "shift").to_string(),
        sku: cell(&row, "sku").to_string(),
        start_time: parse_clock(cell(&row, "start_time")),
        finish_time: parse_clock(cell(&row, "finish_time")),
        description: cell(&row, "description").to_string(),
        category: cell(&row, "category").to_string(),
        work_center: cell(&row, "work_center").to_string(),
        process: cell(&row, "process").to_string(),
        equipment: cell(&row, "equipment").to_string(),
        entered_by: cell(&row, "entered_by").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Loading Time "), "loading_time");
        assert_eq!(normalize_key("OUTPUT_MAXIMUM"), "output_maximum");
        assert_eq!(normalize_key("date"), "date");
    }

    #[test]
    fn test_parse_number_best_effort() {
        assert_eq!(parse_number("480"), Some(480.0));
        assert_eq!(parse_number(" 480.5 "), Some(480.5));
        assert_eq!(parse_number("1,000"), Some(1000.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(parse_date("2025-03-01"), Some(expected));
        assert_eq!(parse_date("01/03/2025"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:30"), NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(parse_clock("23:59:59"), NaiveTime::from_hms_opt(23, 59, 59));
        assert_eq!(parse_clock("25:00"), None);
    }

    #[test]
    fn test_production_from_row_tolerates_bad_cells() {
        let mut raw = RawRow::new();
        raw.insert("Date".to_string(), "2025-03-01".to_string());
        raw.insert("Line".to_string(), " 1 ".to_string());
        raw.insert("loading_time".to_string(), "480".to_string());
        raw.insert("output_maximum".to_string(), "n/a".to_string());

        let rec = production_from_row(&raw);
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(rec.line, "1");
        assert_eq!(rec.loading_time, Some(480.0));
        // 坏单元格只影响该格，不影响整行
        assert_eq!(rec.output_maximum, None);
        // 缺失列落为空/None
        assert_eq!(rec.good_output, None);
        assert_eq!(rec.entered_by, "");
    }
}
