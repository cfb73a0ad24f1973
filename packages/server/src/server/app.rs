//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use signalr::{SignalROptions, SignalRService};

use crate::config::Config;
use crate::domains::questions::data::PgQuestionStore;
use crate::domains::questions::rate_limit::RateLimiter;
use crate::domains::questions::QuestionEngine;
use crate::kernel::{ContentSafetyClient, OpenAIClient, ServerDeps, SignalRAdapter};
use crate::server::routes::{
    create_question, get_my_questions, get_questions, health_handler, hide_question, negotiate,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub engine: Arc<QuestionEngine>,
    pub signalr: Arc<SignalRService>,
}

/// Build the Axum application router.
///
/// Returns (Router, Arc<ServerDeps>) - deps are needed for scheduled tasks.
pub fn build_app(pool: PgPool, config: &Config) -> (Router, Arc<ServerDeps>) {
    // SignalR client (shared by the broadcaster and the negotiate route)
    let signalr = Arc::new(SignalRService::new(SignalROptions {
        endpoint: config.signalr_endpoint.clone(),
        access_key: config.signalr_access_key.clone(),
        hub: config.signalr_hub.clone(),
    }));

    let deps = Arc::new(ServerDeps::new(
        Arc::new(PgQuestionStore::new(pool.clone())),
        Arc::new(OpenAIClient::new(
            &config.openai_api_key,
            config.model_name.clone(),
        )),
        Arc::new(ContentSafetyClient::new(
            config.content_safety_endpoint.clone(),
            config.content_safety_key.clone(),
        )),
        Arc::new(SignalRAdapter::new(signalr.clone())),
        Arc::new(RateLimiter::new(Duration::from_secs(
            config.rate_limit_seconds,
        ))),
        Duration::from_secs(config.completion_timeout_seconds),
    ));

    let engine = Arc::new(QuestionEngine::new(deps.clone()));

    let app_state = AxumAppState {
        db_pool: pool,
        deps: deps.clone(),
        engine,
        signalr,
    };

    // CORS - the wall and ask pages are served from a separate origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let app = Router::new()
        .route("/api/questions", post(create_question).get(get_questions))
        .route("/api/questions/:id/hide", post(hide_question))
        .route("/api/my/:author_token", get(get_my_questions))
        .route("/api/negotiate", get(negotiate).post(negotiate))
        .route("/health", get(health_handler))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (app, deps)
}
