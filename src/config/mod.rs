use std::env;
use std::time::Duration;

const MIN_TIMEOUT_SECS: u64 = 1;

/// 缺少必填环境变量
#[derive(Debug, thiserror::Error)]
#[error("missing required environment variable {0}")]
pub struct ConfigError(pub &'static str);

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub auth: AuthBackendConfig,
    pub workflow: WorkflowConfig,
    pub routes: RouteConfig,
    pub cookies: CookieConfig,
    pub auto_create_profile: bool,
}

/// 认证后端 (GoTrue) 连接信息
#[derive(Debug, Clone)]
pub struct AuthBackendConfig {
    pub url: String,
    pub anon_key: String,
    pub site_url: String,
    pub timeout_secs: u64,
}

impl AuthBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 工作流 webhook 配置，url 或 key 为空时视为未配置
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl WorkflowConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 路由分类与跳转目标
#[derive(Debug, Clone)]
pub struct RouteConfig {
    pub protected: Vec<String>,
    pub auth_only: Vec<String>,
    pub login_path: String,
    pub after_login: String,
    pub after_signup: String,
    pub after_logout: String,
    pub after_password_reset: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protected: vec!["/profile".into(), "/settings".into(), "/api/me".into()],
            auth_only: vec![
                "/auth/login".into(),
                "/auth/signup".into(),
                "/auth/forgot-password".into(),
            ],
            login_path: "/auth/login".into(),
            after_login: "/".into(),
            after_signup: "/auth/verify-email".into(),
            after_logout: "/auth/login".into(),
            after_password_reset: "/auth/login".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub refresh_max_age_secs: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            refresh_max_age_secs: 60 * 60 * 24 * 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构造配置，空字符串等同于未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError(key));
        let list = |key: &str, default: Vec<String>| {
            get(key)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(default)
        };
        // 超时至少 1 秒
        let timeout_secs = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
                .max(MIN_TIMEOUT_SECS)
        };
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(default)
        };

        let route_defaults = RouteConfig::default();
        let cookie_defaults = CookieConfig::default();

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "::".into()),
            server_port: get("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: required("DATABASE_URL")?,
            redis_url: get("REDIS_URL"),
            cache_ttl_secs: get("CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            auth: AuthBackendConfig {
                url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
                anon_key: required("SUPABASE_ANON_KEY")?,
                site_url: required("SITE_URL")?.trim_end_matches('/').to_string(),
                timeout_secs: timeout_secs("AUTH_TIMEOUT_SECS", 5),
            },
            workflow: WorkflowConfig {
                base_url: get("N8N_BACKEND_URL")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or_default(),
                api_key: get("N8N_API_KEY").unwrap_or_default(),
                timeout_secs: timeout_secs("WORKFLOW_TIMEOUT_SECS", 10),
            },
            routes: RouteConfig {
                protected: list("PROTECTED_ROUTES", route_defaults.protected),
                auth_only: list("AUTH_ROUTES", route_defaults.auth_only),
                login_path: get("LOGIN_PATH").unwrap_or(route_defaults.login_path),
                after_login: get("REDIRECT_AFTER_LOGIN").unwrap_or(route_defaults.after_login),
                after_signup: get("REDIRECT_AFTER_SIGNUP").unwrap_or(route_defaults.after_signup),
                after_logout: get("REDIRECT_AFTER_LOGOUT").unwrap_or(route_defaults.after_logout),
                after_password_reset: get("REDIRECT_AFTER_PASSWORD_RESET")
                    .unwrap_or(route_defaults.after_password_reset),
            },
            cookies: CookieConfig {
                secure: flag("COOKIE_SECURE", cookie_defaults.secure),
                refresh_max_age_secs: get("REFRESH_COOKIE_MAX_AGE_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(cookie_defaults.refresh_max_age_secs),
            },
            auto_create_profile: flag("AUTO_CREATE_PROFILE", true),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
