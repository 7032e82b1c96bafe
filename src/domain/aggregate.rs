// ==========================================
// OEE 生产监控系统 - 聚合结果类型
// ==========================================
// 聚合结果不落库，每次看板请求从原始记录全量重算
// ==========================================

use crate::domain::metrics::{MetricCounters, OeeMetrics};
use crate::domain::record::{DowntimeRecord, ProductionRecord};
use crate::domain::types::MonthKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 明细行：生产记录 + 当日同线停机合计 + 行级指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduction {
    pub record: ProductionRecord,
    /// 同 (产线, 日期) 的停机合计（无停机记录时为 0）
    pub downtime_minutes: f64,
    pub metrics: OeeMetrics,
}

/// 按 (日期, 产线) 的日聚合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub line: String,
    pub counters: MetricCounters,
    pub metrics: OeeMetrics,
}

/// 按月聚合（全部产线合计）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub counters: MetricCounters,
    pub metrics: OeeMetrics,
}

/// Pareto 基表行：按 (月份, 产线, 类别) 的停机合计
///
/// 同一 (月份, 产线) 组内按时长降序排列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeParetoRow {
    pub month: MonthKey,
    pub line: String,
    pub category: String,
    pub duration_minutes: f64,
}

/// 指标引擎的完整输出
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsOutput {
    /// 明细表（含无法聚合的坏行）
    pub records: Vec<EnrichedProduction>,
    /// 停机明细（含派生时长）
    pub downtime: Vec<DowntimeRecord>,
    /// 按 (日期, 产线) 日聚合
    pub daily: Vec<DailyAggregate>,
    /// 按月聚合
    pub monthly: Vec<MonthlyAggregate>,
    /// 停机 Pareto 基表
    pub pareto: Vec<DowntimeParetoRow>,
}

impl MetricsOutput {
    /// 输出中出现过的产线（排序去重，供看板产线选择器使用）
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .records
            .iter()
            .map(|r| r.record.line.clone())
            .filter(|l| !l.is_empty())
            .collect();
        lines.sort();
        lines.dedup();
        lines
    }

    /// 输出中出现过的月份（排序去重，供看板月份选择器使用）
    pub fn months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = self.monthly.iter().map(|m| m.month).collect();
        months.sort();
        months.dedup();
        months
    }
}
