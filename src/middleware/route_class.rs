/// 路由分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// 需要登录
    Protected,
    /// 仅限未登录访客 (登录、注册等)
    AuthOnly,
    Unrestricted,
}

/// 前缀匹配，按声明顺序先匹配者胜出，受保护列表优先
pub fn classify<S: AsRef<str>>(path: &str, protected: &[S], auth_only: &[S]) -> RouteClass {
    if protected.iter().any(|prefix| path.starts_with(prefix.as_ref())) {
        RouteClass::Protected
    } else if auth_only.iter().any(|prefix| path.starts_with(prefix.as_ref())) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Unrestricted
    }
}

const STATIC_PREFIXES: [&str; 3] = ["/static/", "/assets/", "/favicon.ico"];
const STATIC_EXTENSIONS: [&str; 6] = [".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// 静态资源不经过会话中间件
pub fn is_static_asset(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    STATIC_PREFIXES.iter().any(|p| lower.starts_with(p))
        || STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
