//! HTTP API over the expert directory.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error};

use crate::error::DishbrainError;
use crate::loader::DEFAULT_PAGE_SIZE;
use crate::lookup::Lookups;
use crate::search;
use crate::storage::ExpertRepository;
use crate::types::{Expert, FilterState};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<ExpertRepository>,
    pub lookups: Lookups,
}

impl AppState {
    pub fn new(repository: Arc<ExpertRepository>, lookups: Lookups) -> Self {
        Self { repository, lookups }
    }
}

pub struct ApiError(DishbrainError);

impl From<DishbrainError> for ApiError {
    fn from(error: DishbrainError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DishbrainError::InvalidArgument(_) | DishbrainError::SearchInputInvalid(_) => StatusCode::BAD_REQUEST,
            DishbrainError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// Extractor rejections answer in the same `{error}` shape as handler errors.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DishbrainError::InvalidArgument(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DishbrainError::SearchInputInvalid(rejection.body_text()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ChunkParams {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResponse {
    pub items: Vec<Expert>,
    pub has_more: bool,
    pub total: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub filters: FilterState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Expert>,
    pub count: usize,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/experts", get(list_handler))
        .route("/api/experts/chunk", get(chunk_handler))
        .route("/api/experts/search", post(search_handler))
        .route("/api/experts/:id", get(expert_handler))
        .route("/api/experts/:id/news", get(news_handler))
        .route("/api/experts/:id/photo", get(photo_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metadata = state.repository.metadata().await;
    Json(json!({
        "status": if metadata.degraded { "degraded" } else { "ok" },
        "experts": metadata.total_experts,
        "source": metadata.source,
    }))
}

async fn list_handler(State(state): State<AppState>) -> Json<Vec<Expert>> {
    Json(state.repository.get_all().await.as_ref().clone())
}

async fn chunk_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<ChunkParams>, QueryRejection>,
) -> ApiResult<Json<ChunkResponse>> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let items = state.repository.get_chunk(params.offset, limit).await?;
    let total = state.repository.len().await;
    let has_more = params.offset.saturating_add(items.len()) < total;

    Ok(Json(ChunkResponse { items, has_more, total }))
}

async fn expert_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Expert>> {
    let expert = find_expert(&state, &id).await?;
    Ok(Json(expert))
}

async fn search_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = request?;
    let corpus = state.repository.get_all().await;
    let results: Vec<Expert> = search::search(&request.query, &request.filters, &corpus)
        .into_iter()
        .cloned()
        .collect();
    debug!(query = %request.query, count = results.len(), "API search");

    let count = results.len();
    Ok(Json(SearchResponse { results, count }))
}

async fn news_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let expert = find_expert(&state, &id).await?;
    Ok(Json(state.lookups.news_for(&expert).await))
}

async fn photo_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let expert = find_expert(&state, &id).await?;
    Ok(Json(state.lookups.photo_for(&expert).await))
}

async fn find_expert(state: &AppState, id: &str) -> Result<Expert, DishbrainError> {
    state
        .repository
        .get(id)
        .await
        .ok_or_else(|| DishbrainError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{HttpNewsLookup, HttpPhotoLookup};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_state(base_url: &str) -> AppState {
        let repository = Arc::new(ExpertRepository::from_experts(vec![
            Expert::new("1", "Ada", "MIT").with_primary_expertise(vec!["ML".to_string()]),
            Expert::new("2", "Bo", "ETH").with_primary_expertise(vec!["NLP".to_string()]),
            Expert::new("3", "Cy", "Universität Hamburg").with_primary_expertise(vec!["ML".to_string()]),
        ]));
        let lookups = Lookups::new(
            Arc::new(HttpNewsLookup::new(base_url, Duration::from_secs(2)).unwrap()),
            Arc::new(HttpPhotoLookup::new(base_url, Duration::from_secs(2)).unwrap()),
        );
        AppState::new(repository, lookups)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_experts() {
        let app = router(create_state("http://127.0.0.1:9"));
        let (status, body) = send(app, get_request("/api/experts")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["personalInfo"]["fullName"], "Ada");
    }

    #[tokio::test]
    async fn test_chunk_endpoint() {
        let app = router(create_state("http://127.0.0.1:9"));

        let (status, body) = send(app.clone(), get_request("/api/experts/chunk?offset=1&limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["id"], "2");
        assert_eq!(body["hasMore"], true);
        assert_eq!(body["total"], 3);

        let (_, body) = send(app, get_request("/api/experts/chunk?offset=2&limit=5")).await;
        assert_eq!(body["hasMore"], false);
    }

    #[tokio::test]
    async fn test_chunk_zero_limit_is_bad_request() {
        let app = router(create_state("http://127.0.0.1:9"));
        let (status, body) = send(app, get_request("/api/experts/chunk?limit=0")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn test_malformed_chunk_query_is_json_bad_request() {
        let app = router(create_state("http://127.0.0.1:9"));

        for uri in ["/api/experts/chunk?offset=-1", "/api/experts/chunk?limit=ten"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(body["error"].as_str().unwrap().starts_with("Invalid argument"));
        }
    }

    #[tokio::test]
    async fn test_invalid_search_body_is_json_bad_request() {
        let app = router(create_state("http://127.0.0.1:9"));
        let search_request = |body: String| {
            Request::builder()
                .method("POST")
                .uri("/api/experts/search")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let (status, body) = send(
            app.clone(),
            search_request(json!({ "filters": { "availability": "someday" } }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid search input"));

        let (status, body) = send(app, search_request("{not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_expert_by_id() {
        let app = router(create_state("http://127.0.0.1:9"));

        let (status, body) = send(app.clone(), get_request("/api/experts/3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["institution"]["name"], "Universität Hamburg");

        let (status, body) = send(app, get_request("/api/experts/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Expert not found: missing");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let app = router(create_state("http://127.0.0.1:9"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/experts/search")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "query": "", "filters": { "expertise": ["ML"], "location": "hamburg" } }).to_string(),
            ))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["id"], "3");
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(create_state("http://127.0.0.1:9"));
        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["experts"], 3);
    }

    #[tokio::test]
    async fn test_news_and_photo_routes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news-scraper"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "title": "Ada at MIT", "link": "https://example.com/ada" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/profile-photo-finder"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let app = router(create_state(&server.uri()));

        let (status, body) = send(app.clone(), get_request("/api/experts/1/news")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Ada at MIT");

        // Failed photo lookup degrades to the placeholder
        let (status, body) = send(app, get_request("/api/experts/1/photo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imageUrl"], "/default-avatar.png");
    }
}
