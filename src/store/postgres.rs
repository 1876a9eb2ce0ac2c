use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::{
    BlogStore, Comment, NewPost, NewProfile, Post, PostChanges, PostQuery, Profile, StoreError,
};

const POST_COLUMNS: &str =
    "id, title, content, author_id, status, cover_image_url, created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for Post {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Post {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            author_id: row.try_get("author_id")?,
            status: status.parse().map_err(|e: StoreError| sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: e.to_string().into(),
            })?,
            cover_image_url: row.try_get("cover_image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// 托管 Postgres 上的 posts / comments / profiles
#[derive(Clone)]
pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// ILIKE 通配符转义
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn insert_post(&self, author_id: Uuid, post: &NewPost) -> Result<Post, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO posts (title, content, author_id, status, cover_image_url)
            VALUES ($1, $2, $3, 'draft', $4)
            RETURNING {POST_COLUMNS}
            "#
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(author_id)
            .bind(&post.cover_image_url)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted post {} for {}", post.id, author_id);
        Ok(post)
    }

    async fn update_post(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        changes: &PostChanges,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = now()
            WHERE id = $3 AND author_id = $4
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_post(&self, author_id: Uuid, post_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), StoreError> {
        // $1 为空时不过滤
        let pattern = query.search.as_deref().map(like_pattern);

        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE $1::text IS NULL OR title ILIKE $1 OR content ILIKE $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(&pattern)
            .bind(query.offset)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE $1::text IS NULL OR title ILIKE $1 OR content ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((posts, total))
    }

    async fn insert_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn delete_comment(
        &self,
        author_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let post_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM comments WHERE id = $1 AND author_id = $2 RETURNING post_id",
        )
        .bind(comment_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post_id)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, email, first_name, last_name, mobile, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, email, first_name, last_name, mobile, role, created_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.mobile)
        .bind(&profile.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, email, first_name, last_name, mobile, role, created_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, email, first_name, last_name, mobile, role, created_at
            FROM profiles
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
