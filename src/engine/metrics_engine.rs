// ==========================================
// OEE 生产监控系统 - 指标引擎
// ==========================================
// 职责: 生产/停机原始行 → 明细指标 + 日/月聚合 + 停机 Pareto
// 纯函数式：不读库、不写库、无缓存、无增量
// ==========================================
// 算法步骤:
// 1. 规整列名/类型（normalize）
// 2. 逐行派生停机时长（跨零点修正）
// 3. 停机合计按 (产线, 日期) 左连接到生产记录，缺失按 0
// 4. 逐行套用四项指标公式（零分母守护）
// 5. 按 (日期, 产线) 汇总计数后重算指标（非逐行百分比取平均）
// 6. 按月重复同样汇总
// 7. 按 (月份, 产线, 类别) 汇总停机时长，组内按时长降序
// ==========================================

use crate::domain::aggregate::{
    DailyAggregate, DowntimeParetoRow, EnrichedProduction, MetricsOutput, MonthlyAggregate,
};
use crate::domain::metrics::{MetricCounters, OeeMetrics};
use crate::domain::record::{DowntimeRecord, ProductionRecord};
use crate::domain::types::MonthKey;
use crate::engine::normalize::{downtime_from_row, production_from_row};
use crate::repository::record_store::RawRow;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// 指标引擎
///
/// 每次看板请求全量重算：输入两组有序原始行，输出四张结果表。
/// 缺列/坏单元格只局部降级为 None，绝不中断计算。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// 解析生产原始行（引擎第 1 步，供看板筛选复用）
    pub fn parse_production(&self, rows: &[RawRow]) -> Vec<ProductionRecord> {
        rows.iter().map(production_from_row).collect()
    }

    /// 解析停机原始行
    pub fn parse_downtime(&self, rows: &[RawRow]) -> Vec<DowntimeRecord> {
        rows.iter().map(downtime_from_row).collect()
    }

    /// 完整计算：明细 + 日聚合 + 月聚合 + Pareto 基表
    pub fn calculate(&self, production: &[RawRow], downtime: &[RawRow]) -> MetricsOutput {
        let production = self.parse_production(production);
        let downtime = self.parse_downtime(downtime);
        self.calculate_from_records(production, downtime)
    }

    /// 在已解析记录上计算（看板按周期筛选后走这里）
    pub fn calculate_from_records(
        &self,
        production: Vec<ProductionRecord>,
        downtime: Vec<DowntimeRecord>,
    ) -> MetricsOutput {
        let records = self.enrich(&production, &downtime);
        let daily = self.daily_aggregates(&production, &downtime);
        let monthly = self.monthly_aggregates(&production, &downtime);
        let pareto = self.downtime_pareto(&downtime);

        tracing::debug!(
            production = production.len(),
            downtime = downtime.len(),
            daily = daily.len(),
            monthly = monthly.len(),
            pareto = pareto.len(),
            "指标计算完成"
        );

        MetricsOutput {
            records,
            downtime,
            daily,
            monthly,
            pareto,
        }
    }

    /// 停机合计按 (产线, 日期) 分组
    ///
    /// 产线为空或日期缺失的停机行无法参与连接，跳过。
    pub fn downtime_by_line_date(
        &self,
        downtime: &[DowntimeRecord],
    ) -> HashMap<(String, NaiveDate), f64> {
        let mut sums: HashMap<(String, NaiveDate), f64> = HashMap::new();
        for rec in downtime {
            let (Some(date), Some(duration)) = (rec.date, rec.duration_minutes()) else {
                continue;
            };
            if rec.line.is_empty() {
                continue;
            }
            *sums.entry((rec.line.clone(), date)).or_insert(0.0) += duration;
        }
        sums
    }

    /// 明细表：每条生产记录 + 当日同线停机合计 + 行级指标（步骤 3-4）
    pub fn enrich(
        &self,
        production: &[ProductionRecord],
        downtime: &[DowntimeRecord],
    ) -> Vec<EnrichedProduction> {
        let downtime_sums = self.downtime_by_line_date(downtime);

        production
            .iter()
            .map(|rec| {
                // 左连接：无匹配停机记录按 0 处理
                let downtime_minutes = rec
                    .date
                    .and_then(|date| downtime_sums.get(&(rec.line.clone(), date)))
                    .copied()
                    .unwrap_or(0.0);

                let metrics = OeeMetrics::compute(
                    rec.loading_time,
                    rec.output_maximum,
                    rec.good_output,
                    rec.defect_count,
                    downtime_minutes,
                );

                EnrichedProduction {
                    record: rec.clone(),
                    downtime_minutes,
                    metrics,
                }
            })
            .collect()
    }

    /// 日聚合：按 (日期, 产线) 汇总计数后重算指标（步骤 5）
    ///
    /// 日期缺失或产线为空的记录不参与聚合。
    pub fn daily_aggregates(
        &self,
        production: &[ProductionRecord],
        downtime: &[DowntimeRecord],
    ) -> Vec<DailyAggregate> {
        let downtime_sums = self.downtime_by_line_date(downtime);

        let mut groups: BTreeMap<(NaiveDate, String), MetricCounters> = BTreeMap::new();
        for rec in production {
            let Some(date) = rec.date else { continue };
            if rec.line.is_empty() {
                continue;
            }
            groups
                .entry((date, rec.line.clone()))
                .or_default()
                .add_production(rec);
        }

        groups
            .into_iter()
            .map(|((date, line), mut counters)| {
                // 停机合计左连接到生产分组，缺失按 0
                if let Some(minutes) = downtime_sums.get(&(line.clone(), date)) {
                    counters.add_downtime(*minutes);
                }
                let metrics = counters.metrics();
                DailyAggregate {
                    date,
                    line,
                    counters,
                    metrics,
                }
            })
            .collect()
    }

    /// 月聚合：按月份汇总全部产线计数后重算指标（步骤 6）
    pub fn monthly_aggregates(
        &self,
        production: &[ProductionRecord],
        downtime: &[DowntimeRecord],
    ) -> Vec<MonthlyAggregate> {
        let mut downtime_by_month: HashMap<MonthKey, f64> = HashMap::new();
        for rec in downtime {
            let (Some(date), Some(duration)) = (rec.date, rec.duration_minutes()) else {
                continue;
            };
            *downtime_by_month
                .entry(MonthKey::from_date(date))
                .or_insert(0.0) += duration;
        }

        let mut groups: BTreeMap<MonthKey, MetricCounters> = BTreeMap::new();
        for rec in production {
            let Some(date) = rec.date else { continue };
            groups
                .entry(MonthKey::from_date(date))
                .or_default()
                .add_production(rec);
        }

        groups
            .into_iter()
            .map(|(month, mut counters)| {
                if let Some(minutes) = downtime_by_month.get(&month) {
                    counters.add_downtime(*minutes);
                }
                let metrics = counters.metrics();
                MonthlyAggregate {
                    month,
                    counters,
                    metrics,
                }
            })
            .collect()
    }

    /// 停机 Pareto 基表：按 (月份, 产线, 类别) 汇总时长（步骤 7）
    ///
    /// 输出按 (月份升序, 产线升序)，组内按时长降序。
    pub fn downtime_pareto(&self, downtime: &[DowntimeRecord]) -> Vec<DowntimeParetoRow> {
        let mut groups: BTreeMap<(MonthKey, String), HashMap<String, f64>> = BTreeMap::new();
        for rec in downtime {
            let (Some(date), Some(duration)) = (rec.date, rec.duration_minutes()) else {
                continue;
            };
            if rec.line.is_empty() {
                continue;
            }
            let month = MonthKey::from_date(date);
            *groups
                .entry((month, rec.line.clone()))
                .or_default()
                .entry(rec.category.clone())
                .or_insert(0.0) += duration;
        }

        let mut rows = Vec::new();
        for ((month, line), categories) in groups {
            let mut entries: Vec<(String, f64)> = categories.into_iter().collect();
            // 组内按时长降序；时长相同按类别名稳定排序
            entries.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            for (category, duration_minutes) in entries {
                rows.push(DowntimeParetoRow {
                    month,
                    line: line.clone(),
                    category,
                    duration_minutes,
                });
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production_row(date: &str, line: &str, loading: &str, out_max: &str, good: &str, defect: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("date".to_string(), date.to_string());
        row.insert("line".to_string(), line.to_string());
        row.insert("shift".to_string(), "1".to_string());
        row.insert("sku".to_string(), "SKU-A".to_string());
        row.insert("loading_time".to_string(), loading.to_string());
        row.insert("output_maximum".to_string(), out_max.to_string());
        row.insert("good_output".to_string(), good.to_string());
        row.insert("defect_count".to_string(), defect.to_string());
        row.insert("entered_by".to_string(), "admin".to_string());
        row
    }

    fn downtime_row(date: &str, line: &str, start: &str, finish: &str, category: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("date".to_string(), date.to_string());
        row.insert("line".to_string(), line.to_string());
        row.insert("start_time".to_string(), start.to_string());
        row.insert("finish_time".to_string(), finish.to_string());
        row.insert("category".to_string(), category.to_string());
        row
    }

    #[test]
    fn test_end_to_end_scenario() {
        // 典型班次: loading=480, out_max=1000, good=900, defect=50, 当日停机 60
        let engine = MetricsEngine::new();
        let production = vec![production_row("2025-03-01", "1", "480", "1000", "900", "50")];
        let downtime = vec![downtime_row("2025-03-01", "1", "08:00", "09:00", "故障")];

        let out = engine.calculate(&production, &downtime);
        assert_eq!(out.records.len(), 1);

        let m = &out.records[0].metrics;
        assert_eq!(out.records[0].downtime_minutes, 60.0);
        assert_eq!(m.availability, Some(87.5));
        assert_eq!(m.performance, Some(95.0));
        assert!((m.quality.unwrap() - 94.4444).abs() < 0.001);
        assert!((m.oee.unwrap() - 78.5).abs() < 0.05);
    }

    #[test]
    fn test_missing_downtime_joins_as_zero() {
        let engine = MetricsEngine::new();
        let production = vec![production_row("2025-03-01", "1", "480", "1000", "900", "50")];
        let out = engine.calculate(&production, &[]);

        assert_eq!(out.records[0].downtime_minutes, 0.0);
        assert_eq!(out.records[0].metrics.availability, Some(100.0));
    }

    #[test]
    fn test_daily_aggregate_from_summed_counters() {
        // 同 (日期, 产线) 两条记录：聚合 performance 必须由总计数得出
        let engine = MetricsEngine::new();
        let production = vec![
            production_row("2025-03-01", "1", "240", "1000", "900", "0"),
            production_row("2025-03-01", "1", "240", "500", "100", "0"),
        ];
        let out = engine.calculate(&production, &[]);

        assert_eq!(out.daily.len(), 1);
        let day = &out.daily[0];
        let perf = day.metrics.performance.unwrap();
        assert!((perf - 1000.0 / 1500.0 * 100.0).abs() < 1e-9);
        // 均值将是 (90 + 20) / 2 = 55，必须不相等
        assert!((perf - 55.0).abs() > 5.0);
        assert_eq!(day.counters.loading_time, 480.0);
    }

    #[test]
    fn test_daily_aggregate_per_line() {
        let engine = MetricsEngine::new();
        let production = vec![
            production_row("2025-03-01", "1", "480", "1000", "900", "50"),
            production_row("2025-03-01", "2", "480", "1000", "800", "40"),
        ];
        let downtime = vec![downtime_row("2025-03-01", "1", "08:00", "09:00", "故障")];
        let out = engine.calculate(&production, &downtime);

        assert_eq!(out.daily.len(), 2);
        let line1 = out.daily.iter().find(|d| d.line == "1").unwrap();
        let line2 = out.daily.iter().find(|d| d.line == "2").unwrap();
        // 停机只连接到产线 1
        assert_eq!(line1.counters.downtime_minutes, 60.0);
        assert_eq!(line2.counters.downtime_minutes, 0.0);
    }

    #[test]
    fn test_monthly_aggregate_spans_lines() {
        let engine = MetricsEngine::new();
        let production = vec![
            production_row("2025-03-01", "1", "480", "1000", "900", "50"),
            production_row("2025-03-15", "2", "480", "1000", "800", "40"),
            production_row("2025-04-01", "1", "480", "1000", "850", "30"),
        ];
        let out = engine.calculate(&production, &[]);

        assert_eq!(out.monthly.len(), 2);
        assert_eq!(out.monthly[0].month.to_string(), "2025-03");
        assert_eq!(out.monthly[0].counters.loading_time, 960.0);
        assert_eq!(out.monthly[1].month.to_string(), "2025-04");
    }

    #[test]
    fn test_pareto_sorted_descending_within_group() {
        let engine = MetricsEngine::new();
        let downtime = vec![
            downtime_row("2025-03-01", "1", "08:00", "08:10", "小停"),
            downtime_row("2025-03-02", "1", "08:00", "10:00", "故障"),
            downtime_row("2025-03-03", "1", "08:00", "08:30", "换模"),
            downtime_row("2025-03-04", "1", "08:00", "09:00", "故障"),
        ];
        let rows = engine.downtime_pareto(&engine.parse_downtime(&downtime));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, "故障");
        assert_eq!(rows[0].duration_minutes, 180.0);
        assert_eq!(rows[1].category, "换模");
        assert_eq!(rows[2].category, "小停");
        // 组内降序
        assert!(rows[0].duration_minutes >= rows[1].duration_minutes);
        assert!(rows[1].duration_minutes >= rows[2].duration_minutes);
    }

    #[test]
    fn test_midnight_rollover_in_join() {
        let engine = MetricsEngine::new();
        let production = vec![production_row("2025-03-01", "1", "480", "1000", "900", "0")];
        // 23:30 → 00:30 跨零点 = 60 分钟
        let downtime = vec![downtime_row("2025-03-01", "1", "23:30", "00:30", "故障")];
        let out = engine.calculate(&production, &downtime);

        assert_eq!(out.records[0].downtime_minutes, 60.0);
    }

    #[test]
    fn test_bad_rows_degrade_locally() {
        let engine = MetricsEngine::new();
        let production = vec![
            production_row("not-a-date", "1", "480", "1000", "900", "50"),
            production_row("2025-03-01", "", "480", "1000", "900", "50"),
            production_row("2025-03-01", "1", "abc", "1000", "900", "50"),
        ];
        let out = engine.calculate(&production, &[]);

        // 明细表保留全部行
        assert_eq!(out.records.len(), 3);
        // 坏日期/空产线不参与日聚合；第三行 loading 坏但键完整，仍聚合
        assert_eq!(out.daily.len(), 1);
        // loading_time 坏单元格按 0 累加，availability 零分母守护 → None
        assert_eq!(out.daily[0].metrics.availability, None);
        // 月聚合：坏日期行被排除
        assert_eq!(out.monthly.len(), 1);
    }

    #[test]
    fn test_empty_inputs_give_empty_outputs() {
        let engine = MetricsEngine::new();
        let out = engine.calculate(&[], &[]);
        assert!(out.records.is_empty());
        assert!(out.daily.is_empty());
        assert!(out.monthly.is_empty());
        assert!(out.pareto.is_empty());
    }
}
