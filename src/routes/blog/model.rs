use serde::Deserialize;

// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}
