// ==========================================
// OEE 生产监控系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 生产 OEE 指标计算与看板数据服务
// ==========================================

use oee_monitoring::api::{DashboardQuery, DetailFilter};
use oee_monitoring::app::{get_default_db_path, AppState};
use oee_monitoring::domain::types::PeriodFilter;

fn main() {
    // 初始化日志系统
    oee_monitoring::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", oee_monitoring::APP_NAME);
    tracing::info!("系统版本: {}", oee_monitoring::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    // 启动自检：输出最近一个月的看板摘要
    if let Err(e) = print_latest_month_summary(&app_state) {
        tracing::error!("看板查询失败: {}", e);
        std::process::exit(1);
    }
}

fn print_latest_month_summary(
    app_state: &AppState,
) -> Result<(), oee_monitoring::api::ApiError> {
    let months = app_state.dashboard_api.list_months()?;
    let Some(latest) = months.last().copied() else {
        tracing::info!("暂无生产记录");
        return Ok(());
    };

    let view = app_state.dashboard_api.get_dashboard(&DashboardQuery {
        period: PeriodFilter::Month(latest),
        line: None,
        detail: DetailFilter::None,
    })?;

    tracing::info!(
        period = %view.period_label,
        target = view.target_oee_pct,
        lines = view.lines.len(),
        "看板摘要"
    );
    for section in &view.lines {
        for kpi in &section.kpis {
            tracing::info!(line = %section.line, kpi = %kpi.title, value = %kpi.display);
        }
    }
    Ok(())
}
