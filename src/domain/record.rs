// ==========================================
// OEE 生产监控系统 - 生产/停机记录实体
// ==========================================
// 记录无行级标识：重复行允许存在，不做去重
// 记录一经写入不可修改（只追加）
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 一天的分钟数（停机跨零点修正用）
pub const MINUTES_PER_DAY: f64 = 1440.0;

// ==========================================
// 生产记录 (Production Record)
// ==========================================

/// 生产记录
///
/// 数值字段为尽力解析结果：源单元格非数值时为 None。
/// 日期解析失败的记录保留在明细表中，但不参与按日/按月聚合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// 生产日期（解析失败为 None）
    pub date: Option<NaiveDate>,
    /// 产线标识（统一为文本）
    pub line: String,
    /// 班次
    pub shift: String,
    /// 产品 SKU
    pub sku: String,
    /// 负荷时间（分钟）
    pub loading_time: Option<f64>,
    /// 最大产出（件）
    pub output_maximum: Option<f64>,
    /// 良品产出（件）
    pub good_output: Option<f64>,
    /// 不良品数（件）
    pub defect_count: Option<f64>,
    /// 录入人
    pub entered_by: String,
}

// ==========================================
// 停机记录 (Downtime Record)
// ==========================================

/// 停机记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeRecord {
    /// 停机日期（解析失败为 None）
    pub date: Option<NaiveDate>,
    /// 产线标识
    pub line: String,
    /// 班次
    pub shift: String,
    /// 产品 SKU
    pub sku: String,
    /// 开始时刻（HH:MM，解析失败为 None）
    pub start_time: Option<NaiveTime>,
    /// 结束时刻（HH:MM，解析失败为 None）
    pub finish_time: Option<NaiveTime>,
    /// 停机描述
    pub description: String,
    /// 停机类别（Pareto 分组键）
    pub category: String,
    /// 工作中心
    pub work_center: String,
    /// 工序
    pub process: String,
    /// 设备
    pub equipment: String,
    /// 录入人
    pub entered_by: String,
}

impl DowntimeRecord {
    /// 停机时长（分钟）
    ///
    /// 跨零点规则：结束时刻早于开始时刻时先加 24 小时再相减，
    /// 修正后时长恒为非负。任一时刻缺失时返回 None。
    pub fn duration_minutes(&self) -> Option<f64> {
        let start = self.start_time?;
        let finish = self.finish_time?;

        let mut minutes = (finish - start).num_minutes() as f64;
        if minutes < 0.0 {
            minutes += MINUTES_PER_DAY;
        }
        Some(minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downtime(start: Option<NaiveTime>, finish: Option<NaiveTime>) -> DowntimeRecord {
        DowntimeRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            line: "1".to_string(),
            shift: "1".to_string(),
            sku: "SKU-A".to_string(),
            start_time: start,
            finish_time: finish,
            description: "换模".to_string(),
            category: "计划停机".to_string(),
            work_center: "WC1".to_string(),
            process: "成型".to_string(),
            equipment: "E1".to_string(),
            entered_by: "admin".to_string(),
        }
    }

    #[test]
    fn test_duration_same_day() {
        let rec = downtime(
            NaiveTime::from_hms_opt(8, 0, 0),
            NaiveTime::from_hms_opt(9, 30, 0),
        );
        assert_eq!(rec.duration_minutes(), Some(90.0));
    }

    #[test]
    fn test_duration_crosses_midnight() {
        // 23:30 → 00:45 跨零点：75 分钟
        let rec = downtime(
            NaiveTime::from_hms_opt(23, 30, 0),
            NaiveTime::from_hms_opt(0, 45, 0),
        );
        assert_eq!(rec.duration_minutes(), Some(75.0));
    }

    #[test]
    fn test_duration_never_negative() {
        let rec = downtime(
            NaiveTime::from_hms_opt(22, 0, 0),
            NaiveTime::from_hms_opt(6, 0, 0),
        );
        let d = rec.duration_minutes().unwrap();
        assert!(d >= 0.0);
        assert_eq!(d, 480.0);
    }

    #[test]
    fn test_duration_missing_time() {
        let rec = downtime(NaiveTime::from_hms_opt(8, 0, 0), None);
        assert_eq!(rec.duration_minutes(), None);
    }
}
