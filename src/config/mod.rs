// ==========================================
// OEE 生产监控系统 - 配置层
// ==========================================

pub mod config_manager;

pub use config_manager::ConfigManager;
