// ==========================================
// OEE 生产监控系统 - 应用层
// ==========================================
// 会话、登录与应用状态装配
// ==========================================

pub mod session;
pub mod state;

pub use session::{AuthApi, SessionStore, UserDirectory};
pub use state::{get_default_db_path, AppState};
