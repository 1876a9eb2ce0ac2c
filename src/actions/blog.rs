use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::side_effect_warning;
use crate::AppState;
use crate::auth::AuthUser;
use crate::cache::keys::{HOME_PATH, post_path};
use crate::cache::{read_through, revalidate_paths};
use crate::error::AppError;
use crate::store::{Comment, NewPost, Post, PostChanges, PostQuery, UNKNOWN_AUTHOR};
use crate::utils::validation::validate_blog_form;
use crate::workflow::Envelope;
use crate::workflow::types::{
    ActivityAction, ActivityTarget, AnalyzeContentRequest, AnalyzeContentResponse,
    ProcessMediaRequest, ProcessMediaResponse, PublishContentRequest, PublishContentResponse,
    TrackActivityRequest,
};

/// 每页文章数
pub const PAGE_SIZE: i64 = 9;

/// 页码上限，超出按最后可表示的一页处理
pub const MAX_PAGE: i64 = 100_000;

const MEDIA_SIZES: [&str; 3] = ["thumbnail", "medium", "large"];

fn default_publish() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default = "default_publish")]
    pub publish: bool,
    #[serde(default)]
    pub notify_subscribers: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreatePostOutcome {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishContentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<ProcessMediaResponse>,
    pub warnings: Vec<String>,
}

/// 带作者名的文章
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

fn check_form(input: &PostInput) -> Result<(), AppError> {
    let errors = validate_blog_form(&input.title, &input.content);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    input: PostInput,
) -> Result<CreatePostOutcome, AppError> {
    check_form(&input)?;

    let cover_image_url = non_blank(input.cover_image_url.as_deref());
    let new_post = NewPost {
        title: input.title.trim().to_string(),
        content: input.content.clone(),
        cover_image_url: cover_image_url.clone(),
    };
    // 先落库为草稿，发布状态由发布工作流负责
    let post = state.store.insert_post(user.id, &new_post).await?;
    tracing::info!("User {} created post {}", user.id, post.id);

    let mut warnings = Vec::new();

    let publish = if input.publish {
        let envelope = state
            .workflow
            .publish_content(&PublishContentRequest {
                blog_id: post.id,
                title: post.title.clone(),
                content: post.content.clone(),
                author_id: user.id,
                publish_immediately: Some(true),
                notify_subscribers: input.notify_subscribers,
                social_share: None,
            })
            .await;
        side_effect_warning("Publish workflow", envelope, &mut warnings)
    } else {
        None
    };

    let media = match &cover_image_url {
        Some(image_url) => {
            let envelope = state
                .workflow
                .process_media(&ProcessMediaRequest {
                    image_url: image_url.clone(),
                    blog_id: post.id,
                    sizes: Some(MEDIA_SIZES.iter().map(|s| s.to_string()).collect()),
                    optimize: Some(true),
                    convert_to_webp: Some(true),
                })
                .await;
            side_effect_warning("Media workflow", envelope, &mut warnings)
        }
        None => None,
    };

    revalidate_paths(state.cache.as_ref(), &[HOME_PATH.to_string()]).await;

    Ok(CreatePostOutcome {
        post,
        publish,
        media,
        warnings,
    })
}

pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    post_id: Uuid,
    input: PostInput,
) -> Result<(), AppError> {
    check_form(&input)?;

    let changes = PostChanges {
        title: input.title.trim().to_string(),
        content: input.content,
    };
    let affected = state.store.update_post(user.id, post_id, &changes).await?;
    if affected == 0 {
        return Err(AppError::NotFound(
            "Post not found or you are not the author".into(),
        ));
    }

    revalidate_paths(
        state.cache.as_ref(),
        &[post_path(&post_id), HOME_PATH.to_string()],
    )
    .await;
    Ok(())
}

pub async fn delete_post(state: &AppState, user: &AuthUser, post_id: Uuid) -> Result<(), AppError> {
    let affected = state.store.delete_post(user.id, post_id).await?;
    if affected == 0 {
        return Err(AppError::NotFound(
            "Post not found or you are not the author".into(),
        ));
    }
    tracing::info!("User {} deleted post {}", user.id, post_id);

    revalidate_paths(
        state.cache.as_ref(),
        &[post_path(&post_id), HOME_PATH.to_string()],
    )
    .await;
    Ok(())
}

/// 按作者 id 批量取显示名
async fn author_names(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>, AppError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = state.store.find_profiles(&ids).await?;
    Ok(profiles
        .into_iter()
        .map(|p| (p.user_id, p.display_name()))
        .collect())
}

fn name_of(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).clamp(1, MAX_PAGE)
}

fn total_pages(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

async fn load_posts(
    state: &AppState,
    search: Option<String>,
    page: i64,
) -> Result<PostPage, AppError> {
    let query = PostQuery {
        search,
        offset: (page - 1) * PAGE_SIZE,
        limit: PAGE_SIZE,
    };
    let (posts, total) = state.store.list_posts(&query).await?;
    let names = author_names(state, posts.iter().map(|p| p.author_id)).await?;

    let posts = posts
        .into_iter()
        .map(|post| PostView {
            author_name: name_of(&names, &post.author_id),
            post,
        })
        .collect();

    Ok(PostPage {
        posts,
        total,
        page,
        total_pages: total_pages(total),
    })
}

pub async fn list_posts(
    state: &AppState,
    search: Option<String>,
    page: Option<i64>,
) -> Result<PostPage, AppError> {
    let search = non_blank(search.as_deref());
    let page = clamp_page(page);
    let variant = format!("search={}&page={}", search.as_deref().unwrap_or_default(), page);

    read_through(
        state.cache.as_ref(),
        HOME_PATH,
        &variant,
        load_posts(state, search.clone(), page),
    )
    .await
}

async fn load_post(state: &AppState, post_id: Uuid) -> Result<PostDetail, AppError> {
    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    let comments = state.store.list_comments(post_id).await?;

    let names = author_names(
        state,
        std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id)),
    )
    .await?;

    let comments = comments
        .into_iter()
        .map(|comment| CommentView {
            author_name: name_of(&names, &comment.author_id),
            comment,
        })
        .collect();

    Ok(PostDetail {
        post: PostView {
            author_name: name_of(&names, &post.author_id),
            post,
        },
        comments,
    })
}

pub async fn get_post(
    state: &AppState,
    post_id: Uuid,
    viewer: Option<&AuthUser>,
) -> Result<PostDetail, AppError> {
    let detail = read_through(
        state.cache.as_ref(),
        &post_path(&post_id),
        "",
        load_post(state, post_id),
    )
    .await?;

    if let Some(viewer) = viewer {
        record_view(state, viewer, post_id).await;
    }
    Ok(detail)
}

/// 记录浏览行为，失败只记日志
pub async fn record_view(state: &AppState, viewer: &AuthUser, post_id: Uuid) {
    let envelope = state
        .workflow
        .track_activity(&TrackActivityRequest {
            user_id: viewer.id,
            action: ActivityAction::View,
            target_type: ActivityTarget::Blog,
            target_id: post_id,
            metadata: None,
        })
        .await;
    if let Some(err) = envelope.error() {
        tracing::warn!("Activity tracking failed for post {}: {}", post_id, err);
    }
}

/// 内容分析结果原样返回给调用方
pub async fn analyze_post(
    state: &AppState,
    input: &PostInput,
) -> Result<Envelope<AnalyzeContentResponse>, AppError> {
    check_form(input)?;

    Ok(state
        .workflow
        .analyze_content(&AnalyzeContentRequest {
            title: input.title.trim().to_string(),
            content: input.content.clone(),
            language: None,
            analysis_type: None,
        })
        .await)
}
