// ==========================================
// OEE 生产监控系统 - 会话与登录
// ==========================================
// 职责: 显式会话状态 + 静态用户目录校验
// - 当前用户保存在 SessionStore（单一可变状态），
//   不从表单控件或隐藏字段反推登录状态
// - 明文用户目录与原系统一致，仅作访问门禁
// ==========================================

use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::error::{ApiError, ApiResult};
use crate::i18n::t;

/// 会话状态（显式、进程内）
#[derive(Debug, Default)]
pub struct SessionStore {
    user: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前登录用户（未登录时 None）
    pub fn current_user(&self) -> Option<String> {
        match self.user.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_user(&self, username: &str) {
        match self.user.lock() {
            Ok(mut guard) => *guard = Some(username.to_string()),
            Err(poisoned) => *poisoned.into_inner() = Some(username.to_string()),
        }
    }

    pub fn clear(&self) {
        match self.user.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }
}

/// 静态用户目录
pub struct UserDirectory {
    users: HashMap<String, String>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        let mut users = HashMap::new();
        users.insert("admin".to_string(), "admin123".to_string());
        users.insert("user1".to_string(), "password1".to_string());
        users.insert("heri".to_string(), "heri2024".to_string());
        users.insert("dayat".to_string(), "dayat2024".to_string());
        users.insert("latif".to_string(), "latif2024".to_string());
        users.insert("bowo".to_string(), "bowo2024".to_string());
        Self { users }
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用户名 + 密码核对（明文等值比较）
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}

// ==========================================
// AuthApi - 登录 API
// ==========================================

/// 登录API
pub struct AuthApi {
    directory: UserDirectory,
    session: std::sync::Arc<SessionStore>,
}

impl AuthApi {
    pub fn new(directory: UserDirectory, session: std::sync::Arc<SessionStore>) -> Self {
        Self { directory, session }
    }

    /// 登录
    ///
    /// # 返回
    /// - Ok(String): 成功消息
    /// - Err(ApiError): 凭据为空或不匹配（不区分"用户不存在"与"密码错误"）
    pub fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::AuthenticationFailed(t(
                "login.missing_credentials",
            )));
        }
        if !self.directory.verify(username, password) {
            tracing::warn!(user = username, "登录失败");
            return Err(ApiError::AuthenticationFailed(t(
                "login.invalid_credentials",
            )));
        }

        self.session.set_user(username);
        tracing::info!(user = username, "登录成功");
        Ok(t("login.success"))
    }

    /// 退出登录（清空会话）
    pub fn logout(&self) {
        if let Some(user) = self.session.current_user() {
            tracing::info!(user = %user, "退出登录");
        }
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn auth_with_session() -> (AuthApi, Arc<SessionStore>) {
        let session = Arc::new(SessionStore::new());
        (
            AuthApi::new(UserDirectory::new(), session.clone()),
            session,
        )
    }

    #[test]
    fn test_login_success_sets_session() {
        let (auth, session) = auth_with_session();
        assert!(!session.is_logged_in());
        auth.login("admin", "admin123").unwrap();
        assert_eq!(session.current_user().as_deref(), Some("admin"));
    }

    #[test]
    fn test_login_rejects_bad_password() {
        let (auth, session) = auth_with_session();
        let err = auth.login("admin", "wrong").unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationFailed(_)));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_login_rejects_empty_credentials() {
        let (auth, _) = auth_with_session();
        let err = auth.login("", "").unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_logout_clears_session() {
        let (auth, session) = auth_with_session();
        auth.login("heri", "heri2024").unwrap();
        auth.logout();
        assert!(!session.is_logged_in());
    }
}
