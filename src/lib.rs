use std::sync::Arc;

use auth::AuthBackend;
use cache::PathCache;
use config::Config;
use session::SessionResolver;
use store::BlogStore;
use workflow::WorkflowClient;

pub mod actions;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod store;
pub mod utils;
pub mod workflow;

pub use routes::build_router;

/// 请求间共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthBackend>,
    pub store: Arc<dyn BlogStore>,
    pub cache: Arc<dyn PathCache>,
    pub workflow: WorkflowClient,
    pub sessions: SessionResolver,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: Arc<dyn AuthBackend>,
        store: Arc<dyn BlogStore>,
        cache: Arc<dyn PathCache>,
        workflow: WorkflowClient,
    ) -> Self {
        let sessions = SessionResolver::new(auth.clone(), config.cookies.clone());
        Self {
            config: Arc::new(config),
            auth,
            store,
            cache,
            workflow,
            sessions,
        }
    }
}
