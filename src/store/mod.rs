//! 行存储。表结构由托管数据库持有，这里只定义记录和按属主过滤的读写契约。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod postgres;

pub use postgres::PgBlogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(StoreError::Decode(format!("unknown post status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub status: PostStatus,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// 姓名为空时退回邮箱
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            UNKNOWN_AUTHOR.to_string()
        }
    }
}

pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: Option<String>,
    pub role: String,
}

/// 列表查询，offset/limit 由调用方按页计算
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// 所有写操作的过滤条件都带上调用者 id，返回受影响行数
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn insert_post(&self, author_id: Uuid, post: &NewPost) -> Result<Post, StoreError>;

    async fn update_post(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        changes: &PostChanges,
    ) -> Result<u64, StoreError>;

    async fn delete_post(&self, author_id: Uuid, post_id: Uuid) -> Result<u64, StoreError>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError>;

    /// 返回当前页和总数
    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), StoreError>;

    async fn insert_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, StoreError>;

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    /// 删除成功时返回评论所属文章 id
    async fn delete_comment(
        &self,
        author_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError>;

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile, StoreError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn find_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError>;
}
