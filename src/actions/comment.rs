use serde::Serialize;
use uuid::Uuid;

use super::side_effect_warning;
use crate::AppState;
use crate::auth::AuthUser;
use crate::cache::keys::post_path;
use crate::cache::revalidate_paths;
use crate::error::AppError;
use crate::store::Comment;
use crate::utils::validation::validate_comment;
use crate::workflow::types::{
    EmailNotificationRequest, EmailNotificationType, RealtimeNotificationRequest,
    RealtimeNotificationType,
};

#[derive(Debug, Serialize)]
pub struct AddCommentOutcome {
    pub comment: Comment,
    pub warnings: Vec<String>,
}

pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    post_id: Uuid,
    content: &str,
) -> Result<AddCommentOutcome, AppError> {
    if let Some(msg) = validate_comment(content) {
        return Err(AppError::Validation(msg.into()));
    }

    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let comment = state
        .store
        .insert_comment(user.id, post_id, content.trim())
        .await?;
    tracing::info!("User {} commented on post {}", user.id, post_id);

    let mut warnings = Vec::new();

    // 自己评论自己的文章不通知
    if post.author_id != user.id {
        let commenter = user.display_name();
        let link = post_path(&post_id);

        let realtime = state
            .workflow
            .send_realtime_notification(&RealtimeNotificationRequest {
                user_id: post.author_id,
                kind: RealtimeNotificationType::Comment,
                message: format!("{} commented on \"{}\"", commenter, post.title),
                link: link.clone(),
                icon: None,
                read: Some(false),
            })
            .await;
        side_effect_warning("Realtime notification", realtime, &mut warnings);

        let mut template_data = serde_json::Map::new();
        template_data.insert("post_title".into(), post.title.clone().into());
        template_data.insert("commenter_name".into(), commenter.into());
        template_data.insert("comment".into(), comment.content.clone().into());
        template_data.insert("link".into(), link.into());

        let email = state
            .workflow
            .send_email_notification(&EmailNotificationRequest {
                kind: EmailNotificationType::Comment,
                recipient_ids: vec![post.author_id],
                template_data,
                priority: None,
                schedule_at: None,
            })
            .await;
        side_effect_warning("Email notification", email, &mut warnings);
    }

    revalidate_paths(state.cache.as_ref(), &[post_path(&post_id)]).await;

    Ok(AddCommentOutcome { comment, warnings })
}

pub async fn delete_comment(
    state: &AppState,
    user: &AuthUser,
    comment_id: Uuid,
) -> Result<(), AppError> {
    let Some(post_id) = state.store.delete_comment(user.id, comment_id).await? else {
        return Err(AppError::NotFound(
            "Comment not found or you are not the author".into(),
        ));
    };
    tracing::info!("User {} deleted comment {}", user.id, comment_id);

    revalidate_paths(state.cache.as_ref(), &[post_path(&post_id)]).await;
    Ok(())
}
