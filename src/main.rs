use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use simple_blog::{
    AppState, build_router,
    auth::{AuthBackend, GoTrueClient},
    cache::{NoopPathCache, PathCache, RedisPathCache},
    config::Config,
    store::{BlogStore, PgBlogStore},
    workflow::WorkflowClient,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'simple_blog';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");
    let store: Arc<dyn BlogStore> = Arc::new(PgBlogStore::new(pool));

    // 读路径缓存，未配置 Redis 时不缓存
    let cache: Arc<dyn PathCache> = match &config.redis_url {
        Some(url) => {
            let redis_client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            Arc::new(RedisPathCache::new(Arc::new(redis_client), config.cache_ttl()))
        }
        None => {
            tracing::info!("REDIS_URL not set, read-path cache disabled");
            Arc::new(NoopPathCache)
        }
    };

    // 认证后端
    let auth: Arc<dyn AuthBackend> = Arc::new(
        GoTrueClient::from_config(&config.auth).expect("Failed to build auth client"),
    );

    // 工作流客户端
    let workflow = WorkflowClient::new(&config.workflow).expect("Failed to build workflow client");
    if !config.workflow.is_configured() {
        tracing::warn!("N8N_BACKEND_URL or N8N_API_KEY missing, workflow calls will be skipped");
    }

    // 设置应用状态
    let state = AppState::new(config, auth, store, cache, workflow);
    let router = build_router(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
