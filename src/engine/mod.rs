// ==========================================
// OEE 生产监控系统 - 引擎层
// ==========================================

pub mod metrics_engine;
pub mod normalize;

pub use metrics_engine::MetricsEngine;
