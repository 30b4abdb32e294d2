use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use kosh_lib::{
    AppState, Config, KoshCategory, KoshContent, KoshError, KoshListing, KoshSubCategory,
    NewKoshContent, Pagination, Scope,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_BYTES: usize = 64 * 1024;

// === Request/Response types ===

#[derive(Deserialize)]
struct ListingQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    contents: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: KoshError) -> ApiError {
    let status = match e {
        KoshError::NotFound(_) => StatusCode::NOT_FOUND,
        KoshError::InvalidQuery(_) | KoshError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("{}", e);
    }
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let contents = state.store.content_count().unwrap_or(0);
    Json(HealthResponse {
        status: "ok".to_string(),
        contents,
    })
}

async fn get_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<KoshCategory>>, ApiError> {
    state.store.list_categories().map(Json).map_err(error_response)
}

async fn get_subcategories(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<KoshSubCategory>>, ApiError> {
    state
        .store
        .list_subcategories(category_id)
        .map(Json)
        .map_err(error_response)
}

/// Sorting a scope is CPU-bound, so it runs on the blocking pool
async fn list_scope(
    state: Arc<AppState>,
    scope: Scope,
    page: Option<usize>,
    limit: Option<usize>,
) -> Result<Json<KoshListing>, ApiError> {
    let pagination = Pagination::new(page, limit, &state.defaults);

    tokio::task::spawn_blocking(move || state.listing.list(&scope, pagination))
        .await
        .map_err(|e| error_response(KoshError::Other(format!("Task join error: {}", e))))?
        .map(Json)
        .map_err(error_response)
}

async fn list_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<KoshListing>, ApiError> {
    list_scope(state, Scope::Category(category_id), params.page, params.limit).await
}

async fn list_by_subcategory(
    State(state): State<Arc<AppState>>,
    Path(subcategory_id): Path<i64>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<KoshListing>, ApiError> {
    list_scope(state, Scope::SubCategory(subcategory_id), params.page, params.limit).await
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<KoshListing>, ApiError> {
    list_scope(state, Scope::Search(params.q), params.page, params.limit).await
}

async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<KoshContent>, ApiError> {
    state
        .store
        .get_content(id)
        .and_then(|c| c.ok_or_else(|| KoshError::NotFound(format!("content {}", id))))
        .map(Json)
        .map_err(error_response)
}

async fn create_content(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewKoshContent>,
) -> Result<(StatusCode, Json<KoshContent>), ApiError> {
    let content = state.store.create_content(&new).map_err(error_response)?;
    tracing::info!("Created content {} in category {}", content.id, content.category_id);
    Ok((StatusCode::CREATED, Json(content)))
}

async fn update_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<NewKoshContent>,
) -> Result<Json<KoshContent>, ApiError> {
    let content = state.store.update_content(id, &update).map_err(error_response)?;
    tracing::info!("Updated content {}", content.id);
    Ok(Json(content))
}

async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_content(id).map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/categories", get(get_categories))
        .route("/categories/:id/subcategories", get(get_subcategories))
        .route("/kosh/category/:id", get(list_by_category))
        .route("/kosh/subcategory/:id", get(list_by_subcategory))
        .route("/kosh/search", get(search))
        .route("/kosh/content", post(create_content))
        .route(
            "/kosh/content/:id",
            get(get_content).put(update_content).delete(delete_content),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!("Using database {:?}", config.db_path);

    let state = Arc::new(AppState::new(&config)?);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
