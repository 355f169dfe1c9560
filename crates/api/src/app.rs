use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use domain::services::{GroupService, ScheduleService};
use domain::store::DocumentStore;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, StoreBackend};
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{groups, health, schedule};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub backend: StoreBackend,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub group_service: GroupService,
    pub schedule_service: ScheduleService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Result<Self, JwtError> {
        let jwt = Arc::new(config.jwt.verifier()?);
        let group_service = GroupService::new(store.clone(), config.groups.policy());
        let schedule_service = ScheduleService::new(store.clone());

        Ok(Self {
            backend: config.store.backend,
            store,
            config: Arc::new(config),
            jwt,
            group_service,
            schedule_service,
        })
    }
}

pub fn create_app(config: Config, store: Arc<dyn DocumentStore>) -> Result<Router, JwtError> {
    Ok(router(AppState::new(config, store)?))
}

pub fn router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // Callable operations: every handler resolves the caller from the bearer
    // token itself and reports missing identities in its own error order.
    let api_routes = Router::new()
        .route("/api/v1/groups", post(groups::create_group))
        .route("/api/v1/groups/join", post(groups::join_group))
        .route("/api/v1/groups/:group_id", patch(groups::update_group))
        .route("/api/v1/groups/:group_id/leave", post(groups::leave_group))
        .route("/api/v1/groups/:group_id/events", post(schedule::add_event))
        .route(
            "/api/v1/groups/:group_id/events/:event_id",
            delete(schedule::delete_event),
        )
        .route(
            "/api/v1/groups/:group_id/schedule/next",
            get(schedule::next_event),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
