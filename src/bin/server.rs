//! Scopegate REST API Server
//!
//! Run with: cargo run --features server --bin scopegate-server
//!
//! Endpoints:
//!   GET  /health              - Liveness
//!   POST /resolve             - Resolve a user's scope for a permission
//!   POST /filter              - Translate a resolved scope into a storage filter
//!   POST /permissions/valid   - Keep the candidate permissions a user may list
//!   GET  /defaults            - List PBAC role defaults
//!   PUT  /defaults/:role      - Store PBAC defaults for a role

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use scopegate::{
    is_known_role, parse_value, Config, DefaultPermission, DefaultsStore, Filter, FilterRequest, PermissionSet,
    Resource, RoleDefaults, ScopeEntry, ScopeError, ScopeResolver, User,
};

// ============================================================================
// State
// ============================================================================

struct AppState {
    store: DefaultsStore,
    resolver: ScopeResolver<DefaultsStore>,
    permissions: PermissionSet,
}

type Shared = Arc<AppState>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct ResolveReq {
    user: Option<User>,
    permission: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterReq {
    user: User,
    permission: String,
    resource: String,
    extra: Option<Filter>,
    data_commons: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ValidReq {
    user: Option<User>,
    permissions: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct DefaultsReq {
    permissions: Vec<DefaultPermission>,
}

#[derive(Serialize)]
struct HealthRes {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn fail<T>(e: ScopeError) -> Reply<T> {
    let status = match e {
        ScopeError::InvalidPermission { .. } => StatusCode::FORBIDDEN,
        ScopeError::InvalidUserScope { .. }
        | ScopeError::InvalidPermissionString(_)
        | ScopeError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        ScopeError::Storage(_) | ScopeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::err(e.to_string())))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthRes> {
    Json(HealthRes { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn post_resolve(State(s): State<Shared>, Json(req): Json<ResolveReq>) -> Reply<Vec<ScopeEntry>> {
    ok(s.resolver.resolve(req.user.as_ref(), &req.permission).await)
}

async fn post_filter(State(s): State<Shared>, Json(req): Json<FilterReq>) -> Reply<serde_json::Value> {
    let Some(resource) = Resource::by_name(&req.resource) else {
        return (StatusCode::NOT_FOUND, Json(ApiResponse::err(format!("unknown resource {}", req.resource))));
    };
    let scope = s.resolver.user_scope(Some(&req.user), &req.permission).await;
    let mut request = FilterRequest::new(req.extra.unwrap_or(Filter::Everything));
    if let Some(dcs) = req.data_commons {
        request = request.with_data_commons(dcs);
    }
    match resource.translate(&scope, &req.user, request) {
        Ok(f) => ok(f.to_document()),
        Err(e) => fail(e),
    }
}

async fn post_valid(State(s): State<Shared>, Json(req): Json<ValidReq>) -> Reply<Vec<String>> {
    let mut candidates = Vec::with_capacity(req.permissions.len());
    for v in &req.permissions {
        if let Err(e) = parse_value(v) {
            return fail(e);
        }
        if let Some(token) = v.as_str() {
            candidates.push(token.to_string());
        }
    }
    ok(s.resolver.filter_valid(req.user.as_ref(), &candidates, &s.permissions).await)
}

async fn get_defaults(State(s): State<Shared>) -> Reply<Vec<RoleDefaults>> {
    let store = s.store.clone();
    match tokio::task::spawn_blocking(move || store.list_roles()).await {
        Ok(Ok(r)) => ok(r),
        Ok(Err(e)) => fail(e),
        Err(e) => fail(scopegate::error::err(e)),
    }
}

async fn put_defaults(
    State(s): State<Shared>,
    Path(role): Path<String>,
    Json(req): Json<DefaultsReq>,
) -> Reply<String> {
    if !is_known_role(&role) {
        return fail(ScopeError::UnknownRole(role));
    }
    let store = s.store.clone();
    let defaults = RoleDefaults::new(role.clone(), req.permissions);
    match tokio::task::spawn_blocking(move || store.put_defaults(&defaults)).await {
        Ok(Ok(_)) => ok(role),
        Ok(Err(e)) => fail(e),
        Err(e) => fail(scopegate::error::err(e)),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    tracing::info!(path = %config.db_path.display(), "initializing defaults store");
    let store = DefaultsStore::open(&config.db_path)?;
    let seed = config.load_defaults()?;
    if !seed.is_empty() {
        store.seed(&seed)?;
    }

    let state = Arc::new(AppState {
        resolver: ScopeResolver::new(store.clone()),
        store,
        permissions: config.permission_set(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/resolve", post(post_resolve))
        .route("/filter", post(post_filter))
        .route("/permissions/valid", post(post_valid))
        .route("/defaults", get(get_defaults))
        .route("/defaults/:role", put(put_defaults))
        .layer(cors)
        .with_state(state);

    tracing::info!(addr = %config.bind_addr, "scopegate server listening");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
