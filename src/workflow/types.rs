//! 各工作流端点的请求/响应结构

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---- 发布 ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialShare {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishContentRequest {
    pub blog_id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_immediately: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_subscribers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_share: Option<SocialShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishNotifications {
    pub email_sent: u32,
    pub email_failed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSeo {
    pub score: f64,
    pub meta_generated: bool,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSocial {
    #[serde(default)]
    pub twitter_posted: Option<bool>,
    #[serde(default)]
    pub twitter_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishContentResponse {
    pub blog_id: Uuid,
    pub published_at: String,
    pub notifications: PublishNotifications,
    pub seo: PublishSeo,
    #[serde(default)]
    pub social: Option<PublishSocial>,
    pub images_processed: u32,
}

// ---- 内容分析 ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeContentRequest {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Readability {
    pub score: f64,
    pub grade_level: String,
    pub avg_sentence_length: f64,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoAnalysis {
    pub score: f64,
    pub keyword_density: f64,
    pub meta_description_ok: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: u32,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    pub errors: Vec<GrammarError>,
    pub warnings: Vec<GrammarWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: f64,
    pub tone: String,
    pub emotion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSuggestions {
    pub suggested: Vec<String>,
    pub confidence: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub suggested: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeContentResponse {
    pub readability: Readability,
    pub seo: SeoAnalysis,
    pub grammar: Grammar,
    pub sentiment: Sentiment,
    pub tags: TagSuggestions,
    pub category: CategorySuggestion,
}

// ---- 媒体处理 ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMediaRequest {
    pub image_url: String,
    pub blog_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert_to_webp: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size_kb: f64,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size_kb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub exif_removed: bool,
    pub color_space: String,
    pub compression_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMediaResponse {
    pub original: OriginalImage,
    pub processed: HashMap<String, ProcessedImage>,
    pub metadata: MediaMetadata,
}

// ---- 通知 ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailNotificationType {
    NewPost,
    Comment,
    Mention,
    Newsletter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotificationRequest {
    #[serde(rename = "type")]
    pub kind: EmailNotificationType,
    pub recipient_ids: Vec<Uuid>,
    pub template_data: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NotificationPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDeliveryDetail {
    pub recipient_id: String,
    pub email: String,
    pub status: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotificationResponse {
    pub queued: u32,
    pub sent: u32,
    pub failed: u32,
    pub queue_id: String,
    pub estimated_delivery: String,
    pub details: Vec<EmailDeliveryDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeNotificationType {
    Comment,
    Like,
    Follow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeNotificationRequest {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: RealtimeNotificationType,
    pub message: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeNotificationResponse {
    pub notification_id: String,
    pub delivered: bool,
    pub user_online: bool,
    pub stored_in_db: bool,
    pub timestamp: String,
}

// ---- 用户 ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupSource {
    Google,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardUserRequest {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub signup_source: SignupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedBlog {
    pub id: String,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub step: String,
    pub completed: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardUserResponse {
    pub welcome_email_sent: bool,
    pub profile_initialized: bool,
    pub recommended_blogs: Vec<RecommendedBlog>,
    pub crm_synced: bool,
    pub analytics_tracked: bool,
    pub onboarding_steps: Vec<OnboardingStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    View,
    Like,
    Comment,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityTarget {
    Blog,
    Comment,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackActivityRequest {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub target_type: ActivityTarget,
    pub target_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementProfile {
    pub interests: Vec<String>,
    pub engagement_score: f64,
    pub churn_risk: ChurnRisk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecommendation {
    pub blog_id: String,
    pub title: String,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackActivityResponse {
    pub activity_recorded: bool,
    pub analytics_sent: bool,
    pub recommendations_updated: bool,
    pub user_profile: EngagementProfile,
    pub recommendations: Vec<ActivityRecommendation>,
}
