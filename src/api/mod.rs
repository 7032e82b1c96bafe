// ==========================================
// OEE 生产监控系统 - API层
// ==========================================
// 看板查询与数据录入的业务接口
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod input_api;

pub use dashboard_api::{
    DashboardApi, DashboardQuery, DashboardView, DetailFilter, DowntimeDetailRow, KpiCard,
    LineDashboard, ParetoBar, TrendPoint,
};
pub use error::{ApiError, ApiResult};
pub use input_api::{
    DowntimeDraft, DowntimeDraftSet, InputApi, ProductionEntry, SubmitOutcome,
};
