// ==========================================
// OEE 生产监控系统 - 看板 API
// ==========================================
// 职责: 聚合呈现映射（Aggregation Presentation Mapper）
// - 按所选周期/产线筛选原始记录，复用引擎公式在筛选粒度重算
// - 输出 KPI 卡片、趋势点、Pareto 柱 + 累计百分比、停机明细
// - 趋势点/Pareto 柱的钻取只收窄停机明细列表；reset 即不带子筛选
// ==========================================
// 每次请求整表重读 + 全量重算：无缓存、无增量、无失效逻辑
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::record::{DowntimeRecord, ProductionRecord};
use crate::domain::types::{KpiColor, MonthKey, PeriodFilter};
use crate::engine::metrics_engine::MetricsEngine;
use crate::repository::record_store::{RecordStore, RecordTable};

// ==========================================
// 查询与视图 DTO
// ==========================================

/// 停机明细子筛选：趋势点选中日期 / Pareto 柱选中类别
///
/// None 即 reset：恢复整个所选周期。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DetailFilter {
    #[default]
    None,
    Date(NaiveDate),
    Category(String),
}

/// 看板查询
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// 周期选择：单月 / 整年 / 全部
    pub period: PeriodFilter,
    /// 产线筛选（None 表示全部产线，逐线输出）
    pub line: Option<String>,
    /// 停机明细子筛选
    #[serde(default)]
    pub detail: DetailFilter,
}

/// KPI 卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub title: String,
    /// 指标值（%），分母为零时 None
    pub value: Option<f64>,
    /// 渲染文本（"87.5" 或占位符 "—"）
    pub display: String,
    /// 颜色分级（值缺失时 None）
    pub color: Option<KpiColor>,
}

impl KpiCard {
    fn new(title: &str, value: Option<f64>) -> Self {
        Self {
            title: title.to_string(),
            value,
            display: match value {
                Some(v) => format!("{:.1}", v),
                None => "—".to_string(),
            },
            color: value.map(KpiColor::classify),
        }
    }
}

/// 趋势点（月内视图按日，整年/全部视图按月）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// 横轴标签（"YYYY-MM-DD" 或 "YYYY-MM"）
    pub label: String,
    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub quality: Option<f64>,
    pub oee: Option<f64>,
}

/// Pareto 柱 + 累计百分比曲线上的一个点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoBar {
    pub category: String,
    pub duration_minutes: f64,
    /// 累计百分比，最后一根恒为 100（± 舍入）
    pub cumulative_pct: f64,
}

/// 停机明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeDetailRow {
    pub record: DowntimeRecord,
    pub duration_minutes: Option<f64>,
}

/// 单条产线的看板区块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDashboard {
    pub line: String,
    /// 四张 KPI 卡（Availability / Performance / Quality / OEE）
    pub kpis: Vec<KpiCard>,
    pub trend: Vec<TrendPoint>,
    pub pareto: Vec<ParetoBar>,
    pub details: Vec<DowntimeDetailRow>,
}

/// 看板视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    /// 所选周期的展示标签
    pub period_label: String,
    /// 趋势图目标线（%）
    pub target_oee_pct: f64,
    /// 可选月份（选择器数据源）
    pub available_months: Vec<MonthKey>,
    /// 可选产线（选择器数据源）
    pub available_lines: Vec<String>,
    /// 逐线区块（无数据时为空，前端渲染空态提示）
    pub lines: Vec<LineDashboard>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================

/// 看板API
///
/// 职责：
/// 1. 整表读取原始记录（每次筛选变化都重读重算）
/// 2. 按周期/产线筛选后复用引擎公式重算
/// 3. 组装 KPI / 趋势 / Pareto / 明细视图
pub struct DashboardApi {
    store: Arc<dyn RecordStore>,
    engine: MetricsEngine,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            engine: MetricsEngine::new(),
            config,
        }
    }

    /// 可选月份列表（按月聚合中出现过的月份，升序）
    pub fn list_months(&self) -> ApiResult<Vec<MonthKey>> {
        let production = self.store.read_table(RecordTable::Production)?;
        let records = self.engine.parse_production(&production);

        let mut months: Vec<MonthKey> = records
            .iter()
            .filter_map(|r| r.date.map(MonthKey::from_date))
            .collect();
        months.sort();
        months.dedup();
        Ok(months)
    }

    /// 看板主查询
    ///
    /// # 参数
    /// - query: 周期 + 产线 + 明细子筛选
    ///
    /// # 返回
    /// - Ok(DashboardView): 完整看板视图（无数据时 lines 为空）
    /// - Err(ApiError): 存储读取失败
    pub fn get_dashboard(&self, query: &DashboardQuery) -> ApiResult<DashboardView> {
        let production_rows = self.store.read_table(RecordTable::Production)?;
        let downtime_rows = self.store.read_table(RecordTable::Downtime)?;

        let production = self.engine.parse_production(&production_rows);
        let downtime = self.engine.parse_downtime(&downtime_rows);

        // 选择器数据源来自全量记录（不受当前筛选影响）
        let mut available_months: Vec<MonthKey> = production
            .iter()
            .filter_map(|r| r.date.map(MonthKey::from_date))
            .collect();
        available_months.sort();
        available_months.dedup();

        let mut available_lines: Vec<String> = production
            .iter()
            .map(|r| r.line.clone())
            .filter(|l| !l.is_empty())
            .collect();
        available_lines.sort();
        available_lines.dedup();

        // 周期筛选：日期缺失的行不进入看板
        let in_period = |date: Option<NaiveDate>| date.is_some_and(|d| query.period.contains(d));
        let production: Vec<ProductionRecord> = production
            .into_iter()
            .filter(|r| in_period(r.date))
            .collect();
        let downtime: Vec<DowntimeRecord> =
            downtime.into_iter().filter(|r| in_period(r.date)).collect();

        // 渲染产线集合
        let render_lines: Vec<String> = match &query.line {
            Some(line) => vec![line.clone()],
            None => {
                let mut lines: Vec<String> = production
                    .iter()
                    .map(|r| r.line.clone())
                    .filter(|l| !l.is_empty())
                    .collect();
                lines.sort();
                lines.dedup();
                lines
            }
        };

        let mut line_sections = Vec::new();
        for line in render_lines {
            let line_production: Vec<ProductionRecord> = production
                .iter()
                .filter(|r| r.line == line)
                .cloned()
                .collect();
            if line_production.is_empty() {
                continue;
            }
            let line_downtime: Vec<DowntimeRecord> = downtime
                .iter()
                .filter(|r| r.line == line)
                .cloned()
                .collect();

            line_sections.push(self.build_line_section(
                line,
                &line_production,
                &line_downtime,
                &query.period,
                &query.detail,
            ));
        }

        tracing::debug!(
            period = %query.period.label(),
            lines = line_sections.len(),
            "看板视图组装完成"
        );

        Ok(DashboardView {
            period_label: query.period.label(),
            target_oee_pct: self.config.target_oee_pct(),
            available_months,
            available_lines,
            lines: line_sections,
        })
    }

    /// 看板视图的 JSON 形式（供前端/外部集成直接消费）
    pub fn get_dashboard_json(&self, query: &DashboardQuery) -> ApiResult<String> {
        let view = self.get_dashboard(query)?;
        serde_json::to_string(&view)
            .map_err(|e| ApiError::InternalError(format!("看板视图序列化失败: {}", e)))
    }

    /// 组装一条产线的看板区块
    fn build_line_section(
        &self,
        line: String,
        production: &[ProductionRecord],
        downtime: &[DowntimeRecord],
        period: &PeriodFilter,
        detail: &DetailFilter,
    ) -> LineDashboard {
        // KPI：整个所选范围的总计数重算（不取趋势点均值）
        let kpis = self.build_kpis(production, downtime);

        // 趋势：月内视图按日，整年/全部视图按月
        let trend = match period {
            PeriodFilter::Month(_) => self
                .engine
                .daily_aggregates(production, downtime)
                .into_iter()
                .map(|d| TrendPoint {
                    label: d.date.to_string(),
                    availability: d.metrics.availability,
                    performance: d.metrics.performance,
                    quality: d.metrics.quality,
                    oee: d.metrics.oee,
                })
                .collect(),
            PeriodFilter::Year(_) | PeriodFilter::All => self
                .engine
                .monthly_aggregates(production, downtime)
                .into_iter()
                .map(|m| TrendPoint {
                    label: m.month.to_string(),
                    availability: m.metrics.availability,
                    performance: m.metrics.performance,
                    quality: m.metrics.quality,
                    oee: m.metrics.oee,
                })
                .collect(),
        };

        let pareto = Self::build_pareto(downtime);
        let details = Self::build_details(downtime, detail);

        LineDashboard {
            line,
            kpis,
            trend,
            pareto,
            details,
        }
    }

    /// 四张 KPI 卡：所选范围总计数 → 公式
    fn build_kpis(
        &self,
        production: &[ProductionRecord],
        downtime: &[DowntimeRecord],
    ) -> Vec<KpiCard> {
        let mut counters = crate::domain::metrics::MetricCounters::default();
        for rec in production {
            counters.add_production(rec);
        }
        for rec in downtime {
            if let Some(minutes) = rec.duration_minutes() {
                counters.add_downtime(minutes);
            }
        }
        let metrics = counters.metrics();

        vec![
            KpiCard::new("Availability", metrics.availability),
            KpiCard::new("Performance", metrics.performance),
            KpiCard::new("Quality", metrics.quality),
            KpiCard::new("OEE", metrics.oee),
        ]
    }

    /// Pareto 柱：所选范围内按类别汇总，降序 + 累计百分比
    fn build_pareto(downtime: &[DowntimeRecord]) -> Vec<ParetoBar> {
        let mut by_category: std::collections::HashMap<String, f64> =
            std::collections::HashMap::new();
        for rec in downtime {
            let Some(minutes) = rec.duration_minutes() else {
                continue;
            };
            *by_category.entry(rec.category.clone()).or_insert(0.0) += minutes;
        }

        let mut entries: Vec<(String, f64)> = by_category.into_iter().collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let total: f64 = entries.iter().map(|(_, d)| d).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut running = 0.0;
        entries
            .into_iter()
            .map(|(category, duration_minutes)| {
                running += duration_minutes;
                ParetoBar {
                    category,
                    duration_minutes,
                    cumulative_pct: running / total * 100.0,
                }
            })
            .collect()
    }

    /// 停机明细：子筛选只收窄列表，DetailFilter::None 即 reset
    fn build_details(downtime: &[DowntimeRecord], detail: &DetailFilter) -> Vec<DowntimeDetailRow> {
        downtime
            .iter()
            .filter(|rec| match detail {
                DetailFilter::None => true,
                DetailFilter::Date(date) => rec.date == Some(*date),
                DetailFilter::Category(category) => &rec.category == category,
            })
            .map(|rec| DowntimeDetailRow {
                record: rec.clone(),
                duration_minutes: rec.duration_minutes(),
            })
            .collect()
    }
}
