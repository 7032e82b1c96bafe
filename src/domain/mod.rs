// ==========================================
// OEE 生产监控系统 - 领域层
// ==========================================

pub mod aggregate;
pub mod metrics;
pub mod record;
pub mod types;

pub use aggregate::{
    DailyAggregate, DowntimeParetoRow, EnrichedProduction, MetricsOutput, MonthlyAggregate,
};
pub use metrics::{MetricCounters, OeeMetrics};
pub use record::{DowntimeRecord, ProductionRecord};
pub use types::{KpiColor, MonthKey, PeriodFilter};
