//! 工作流 webhook 客户端。
//!
//! 每次调用只发一个 POST，不重试。所有结果 (成功、远端错误、网络错误、
//! 未配置、响应格式错误) 都折叠成 [`Envelope`]，调用方自行决定是否致命。

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::WorkflowConfig;

mod envelope;
pub mod types;

pub use envelope::{
    Envelope, MALFORMED_RESPONSE, NETWORK_ERROR, NOT_CONFIGURED, UNKNOWN_ERROR, WorkflowError,
    WorkflowMetadata,
};
use types::*;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct WorkflowClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WorkflowClient {
    /// 超时由配置决定，慢的可选集成不能拖住用户请求
    pub fn new(config: &WorkflowConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &WorkflowConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub async fn call<P, T>(&self, endpoint: &str, payload: &P) -> Envelope<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !self.is_configured() {
            tracing::warn!("Workflow backend is not configured, skipping {}", endpoint);
            return Envelope::Failure(WorkflowError::not_configured());
        }

        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let response = match self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Workflow call {} failed: {}", endpoint, e);
                return Envelope::Failure(WorkflowError::network(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to read workflow response for {}: {}", endpoint, e);
                return Envelope::Failure(WorkflowError::network(e.to_string()));
            }
        };

        if status.is_success() {
            let envelope = Envelope::from_wire(&body);
            if let Some(err) = envelope.error() {
                tracing::warn!("Workflow {} reported failure: {}", endpoint, err);
            }
            envelope
        } else {
            tracing::warn!("Workflow {} returned status {}", endpoint, status);
            Envelope::from_error_body(&body)
        }
    }

    pub async fn publish_content(
        &self,
        req: &PublishContentRequest,
    ) -> Envelope<PublishContentResponse> {
        self.call("blog/publish/v1", req).await
    }

    pub async fn analyze_content(
        &self,
        req: &AnalyzeContentRequest,
    ) -> Envelope<AnalyzeContentResponse> {
        self.call("blog/analyze/v1", req).await
    }

    pub async fn process_media(&self, req: &ProcessMediaRequest) -> Envelope<ProcessMediaResponse> {
        self.call("media/process/v1", req).await
    }

    pub async fn send_email_notification(
        &self,
        req: &EmailNotificationRequest,
    ) -> Envelope<EmailNotificationResponse> {
        self.call("notification/email/v1", req).await
    }

    pub async fn send_realtime_notification(
        &self,
        req: &RealtimeNotificationRequest,
    ) -> Envelope<RealtimeNotificationResponse> {
        self.call("notification/realtime/v1", req).await
    }

    pub async fn onboard_user(&self, req: &OnboardUserRequest) -> Envelope<OnboardUserResponse> {
        self.call("user/onboarding/v1", req).await
    }

    pub async fn track_activity(
        &self,
        req: &TrackActivityRequest,
    ) -> Envelope<TrackActivityResponse> {
        self.call("user/activity/v1", req).await
    }
}
