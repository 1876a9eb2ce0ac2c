#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use simple_blog::{
    AppState, build_router,
    auth::{AuthBackend, AuthBackendError, AuthSession, AuthUser, SignUpMetadata, SignUpOutcome},
    cache::{CacheError, PathCache},
    config::Config,
    store::{
        BlogStore, Comment, NewPost, NewProfile, Post, PostChanges, PostQuery, PostStatus,
        Profile, StoreError,
    },
    workflow::WorkflowClient,
};

// ---- 认证后端 ----

struct Account {
    password: String,
    user: AuthUser,
}

/// 内存认证后端，令牌为随机字符串
#[derive(Default)]
pub struct FakeAuthBackend {
    accounts: Mutex<HashMap<String, Account>>,
    access: Mutex<HashMap<String, AuthUser>>,
    refresh: Mutex<HashMap<String, AuthUser>>,
    calls: Mutex<Vec<String>>,
}

impl FakeAuthBackend {
    pub fn add_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.into()),
            user_metadata: Value::Null,
        };
        self.accounts.lock().unwrap().insert(
            email.into(),
            Account {
                password: password.into(),
                user: user.clone(),
            },
        );
        user
    }

    /// 为用户签发一对新令牌
    pub fn issue(&self, user: &AuthUser) -> AuthSession {
        let session = AuthSession {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
            expires_in: 3600,
            expires_at: None,
            user: user.clone(),
        };
        self.access
            .lock()
            .unwrap()
            .insert(session.access_token.clone(), user.clone());
        self.refresh
            .lock()
            .unwrap()
            .insert(session.refresh_token.clone(), user.clone());
        session
    }

    /// 让访问令牌过期，刷新令牌保持有效
    pub fn expire(&self, access_token: &str) {
        self.access.lock().unwrap().remove(access_token);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthBackendError> {
        self.record("get_user");
        self.access
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthBackendError::Unauthorized("invalid JWT".into()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthBackendError> {
        self.record("refresh");
        let user = self
            .refresh
            .lock()
            .unwrap()
            .remove(refresh_token)
            .ok_or_else(|| AuthBackendError::Unauthorized("Invalid Refresh Token".into()))?;
        Ok(self.issue(&user))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthBackendError> {
        self.record("sign_in_with_password");
        let user = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => {
                    return Err(AuthBackendError::Rejected(
                        "Invalid login credentials".into(),
                    ));
                }
            }
        };
        Ok(self.issue(&user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
        _email_redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthBackendError> {
        self.record("sign_up");
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(AuthBackendError::Rejected("User already registered".into()));
        }
        let mut user = self.add_user(email, password);
        user.user_metadata = serde_json::json!({
            "first_name": metadata.first_name,
            "last_name": metadata.last_name,
        });
        // 需要邮箱确认，不返回会话
        Ok(SignUpOutcome {
            user: Some(user),
            session: None,
        })
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        _redirect_to: &str,
    ) -> Result<(), AuthBackendError> {
        self.record("reset_password_for_email");
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), AuthBackendError> {
        self.record("update_password");
        let user = self
            .access
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthBackendError::Unauthorized("invalid JWT".into()))?;
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(email) = &user.email {
            if let Some(account) = accounts.get_mut(email) {
                account.password = password.into();
            }
        }
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthBackendError> {
        self.record("sign_out");
        self.access.lock().unwrap().remove(access_token);
        Ok(())
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str, scopes: &str) -> String {
        format!(
            "https://auth.test/authorize?provider={}&redirect_to={}&scopes={}",
            provider,
            urlencoding::encode(redirect_to),
            urlencoding::encode(scopes)
        )
    }
}

// ---- 行存储 ----

#[derive(Default)]
pub struct InMemoryStore {
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    profiles: Mutex<Vec<Profile>>,
}

impl InMemoryStore {
    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn post(&self, id: Uuid) -> Option<Post> {
        self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.lock().unwrap().clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.lock().unwrap().clone()
    }

    /// 直接写入一篇已发布文章，created_at 依次递增
    pub fn seed_post(&self, author_id: Uuid, title: &str, age_minutes: i64) -> Post {
        let created_at = Utc::now() - Duration::minutes(age_minutes);
        let post = Post {
            id: Uuid::new_v4(),
            title: title.into(),
            content: format!("{} body text", title),
            author_id,
            status: PostStatus::Published,
            cover_image_url: None,
            created_at,
            updated_at: created_at,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn seed_comment(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.into(),
            created_at: Utc::now(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        comment
    }

    pub fn seed_profile(&self, user_id: Uuid, first: &str, last: &str) {
        self.profiles.lock().unwrap().push(Profile {
            user_id,
            email: format!("{}@example.com", first.to_lowercase()),
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            mobile: None,
            role: "user".into(),
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl BlogStore for InMemoryStore {
    async fn insert_post(&self, author_id: Uuid, post: &NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title.clone(),
            content: post.content.clone(),
            author_id,
            status: PostStatus::Draft,
            cover_image_url: post.cover_image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        changes: &PostChanges,
    ) -> Result<u64, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let mut affected = 0;
        for post in posts
            .iter_mut()
            .filter(|p| p.id == post_id && p.author_id == author_id)
        {
            post.title = changes.title.clone();
            post.content = changes.content.clone();
            post.updated_at = Utc::now();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_post(&self, author_id: Uuid, post_id: Uuid) -> Result<u64, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == post_id && p.author_id == author_id));
        let affected = (before - posts.len()) as u64;
        if affected > 0 {
            self.comments.lock().unwrap().retain(|c| c.post_id != post_id);
        }
        Ok(affected)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.post(post_id))
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), StoreError> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        let mut matched: Vec<Post> = self
            .posts()
            .into_iter()
            .filter(|p| match &needle {
                Some(n) => {
                    p.title.to_lowercase().contains(n) || p.content.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.into(),
            created_at: Utc::now(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let mut comments: Vec<Comment> = self
            .comments()
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn delete_comment(
        &self,
        author_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut comments = self.comments.lock().unwrap();
        let Some(idx) = comments
            .iter()
            .position(|c| c.id == comment_id && c.author_id == author_id)
        else {
            return Ok(None);
        };
        Ok(Some(comments.remove(idx).post_id))
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile, StoreError> {
        let profile = Profile {
            user_id: profile.user_id,
            email: profile.email.clone(),
            first_name: Some(profile.first_name.clone()),
            last_name: Some(profile.last_name.clone()),
            mobile: profile.mobile.clone(),
            role: profile.role.clone(),
            created_at: Utc::now(),
        };
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles()
            .into_iter()
            .find(|p| p.user_id == user_id))
    }

    async fn find_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .profiles()
            .into_iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .collect())
    }
}

// ---- 读路径缓存 ----

/// 记录失效路径的内存缓存
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<(String, String), String>>,
    invalidated: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }

    pub fn has(&self, path: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .any(|(p, _)| p == path)
    }
}

#[async_trait]
impl PathCache for RecordingCache {
    async fn get(&self, path: &str, variant: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(path.to_string(), variant.to_string()))
            .cloned())
    }

    async fn put(&self, path: &str, variant: &str, body: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert((path.to_string(), variant.to_string()), body.to_string());
        Ok(())
    }

    async fn invalidate(&self, path: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap().retain(|(p, _), _| p != path);
        self.invalidated.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

// ---- 应用 ----

pub const API_KEY: &str = "test-workflow-key";

pub fn test_config(workflow_url: Option<&str>) -> Config {
    let mut env: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://unused".to_string()),
        ("SUPABASE_URL", "https://auth.test".to_string()),
        ("SUPABASE_ANON_KEY", "anon".to_string()),
        ("SITE_URL", "https://blog.test".to_string()),
        ("WORKFLOW_TIMEOUT_SECS", "2".to_string()),
    ]);
    if let Some(url) = workflow_url {
        env.insert("N8N_BACKEND_URL", url.to_string());
        env.insert("N8N_API_KEY", API_KEY.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<FakeAuthBackend>,
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<RecordingCache>,
}

impl TestApp {
    /// workflow_url 为 None 时工作流视为未配置
    pub fn new(workflow_url: Option<&str>) -> Self {
        let config = test_config(workflow_url);
        let auth = Arc::new(FakeAuthBackend::default());
        let store = Arc::new(InMemoryStore::default());
        let cache = Arc::new(RecordingCache::default());
        let workflow = WorkflowClient::new(&config.workflow).expect("workflow client");

        let state = AppState::new(config, auth.clone(), store.clone(), cache.clone(), workflow);
        Self {
            router: build_router(state),
            auth,
            store,
            cache,
        }
    }

    /// 注册并登录一个用户，返回可直接放进 Cookie 头的字符串
    pub fn login_as(&self, email: &str) -> (AuthUser, String) {
        let user = self.auth.add_user(email, "secret-password");
        let session = self.auth.issue(&user);
        let cookie = format!(
            "access_token={}; refresh_token={}",
            session.access_token, session.refresh_token
        );
        (user, cookie)
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router is infallible")
    }
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
}

/// 工作流成功响应体
pub fn envelope_ok(data: Value) -> Value {
    serde_json::json!({
        "success": true,
        "data": data,
        "metadata": {
            "timestamp": "2024-01-01T00:00:00Z",
            "workflow_id": "wf-test",
            "execution_time_ms": 12
        }
    })
}
