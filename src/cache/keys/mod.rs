/// 页面缓存键前缀
const PAGE_PREFIX: &str = "page:";

/// 首页 (文章列表)
pub const HOME_PATH: &str = "/";

/// 生成读路径缓存键
pub fn page_key(path: &str) -> String {
    format!("{}{}", PAGE_PREFIX, path)
}

/// 文章详情的读路径
pub fn post_path(post_id: &uuid::Uuid) -> String {
    format!("/blog/{}", post_id)
}
