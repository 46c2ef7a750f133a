//! HTTP 应用与路由

pub mod products;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::HttpConfig;
use crate::core::{middleware::request_logging_middleware, response::HealthResponse};
use products::handler::{self, AppState};

/// 创建路由，未匹配的路径交给静态页面目录
pub fn create_router(state: AppState, config: &HttpConfig) -> Router {
    Router::new()
        .route("/api/produtos", get(handler::list_products))
        .route(
            "/api/cadastrar-produto",
            post(handler::create_product)
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(middleware::from_fn(request_logging_middleware)),
        )
        .with_state(state)
}

/// 健康检查
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
