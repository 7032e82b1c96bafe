// ==========================================
// OEE 生产监控系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{DashboardApi, InputApi};
use crate::app::session::{AuthApi, SessionStore, UserDirectory};
use crate::config::config_manager::ConfigManager;
use crate::importer::RecordImporter;
use crate::repository::record_store::RecordStore;
use crate::repository::sheet_store::SqliteSheetStore;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 记录存储（生产表 + 停机表）
    pub store: Arc<SqliteSheetStore>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 会话状态
    pub session: Arc<SessionStore>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 数据录入API
    pub input_api: Arc<InputApi>,

    /// 登录API
    pub auth_api: Arc<AuthApi>,

    /// 记录导入器
    pub importer: Arc<RecordImporter>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并确保记录表 / 配置表存在
    /// 2. 按配置设置界面语言
    /// 3. 创建所有API实例（共享同一连接）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let store = Arc::new(
            SqliteSheetStore::new(&db_path)
                .map_err(|e| format!("无法打开记录存储: {}", e))?,
        );

        // 配置表与记录表共用同一连接
        let config_manager = Arc::new(
            ConfigManager::from_connection(store.connection())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        crate::i18n::set_locale(&config_manager.default_locale());

        let session = Arc::new(SessionStore::new());

        let record_store: Arc<dyn RecordStore> = store.clone();
        let dashboard_api = Arc::new(DashboardApi::new(
            record_store.clone(),
            config_manager.clone(),
        ));
        let input_api = Arc::new(InputApi::new(record_store.clone(), session.clone()));
        let auth_api = Arc::new(AuthApi::new(UserDirectory::new(), session.clone()));
        let importer = Arc::new(RecordImporter::new(record_store));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            store,
            config_manager,
            session,
            dashboard_api,
            input_api,
            auth_api,
            importer,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/oee-monitoring-dev/oee_monitoring.db
/// - 生产环境: 用户数据目录/oee-monitoring/oee_monitoring.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("OEE_MONITORING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./oee_monitoring.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("oee-monitoring-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("oee-monitoring");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("oee_monitoring.db");
    }

    path.to_string_lossy().to_string()
}
