//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::Departures;
use crate::service::{DepartureError, ErrorKind};

use super::dto::*;
use super::state::AppState;

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Upper bound on search results.
const MAX_SEARCH_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health))
        .route("/v1/departures/stations/:key", get(departures))
        .route("/v1/stations/search", get(search_stations))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departures for the stop best matching `key`.
async fn departures(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Departures>, AppError> {
    let ctx = state.request_context();
    let departures = state.service.resolve_and_fetch(&key, &ctx).await?;

    info!(query = %key, departures = departures.len(), "served departures");
    Ok(Json(departures))
}

/// Search stop names.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);

    let stations = state
        .service
        .resolver()
        .candidates(&req.q, limit)
        .into_iter()
        .map(|c| StationSearchResult {
            name: c.name.to_string(),
            id: c.id,
        })
        .collect();

    Json(StationSearchResponse { stations })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Departure(DepartureError),
}

impl From<DepartureError> for AppError {
    fn from(e: DepartureError) -> Self {
        AppError::Departure(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Departure(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::IdentifierNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::UpstreamUnavailable | ErrorKind::MalformedDocument => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let AppError::Departure(e) = &self;
        let stage = e.stage().as_str();

        if status.is_server_error() {
            error!(%status, stage, error = %e, "departure request failed");
        } else {
            warn!(%status, stage, error = %e, "departure request failed");
        }

        let body = Json(ErrorResponse {
            error: e.to_string(),
            stage,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::board::{BoardParser, MockBoardSource, RawDocument};
    use crate::domain::StopId;
    use crate::service::DepartureService;
    use crate::stops::{NameResolver, ResolverConfig, StopDirectory};

    fn state_with(source: MockBoardSource) -> AppState {
        let directory = Arc::new(StopDirectory::bundled().unwrap());
        let resolver = NameResolver::new(directory, ResolverConfig::new());
        let service = DepartureService::new(resolver, Arc::new(source), BoardParser::kvb().unwrap());
        AppState::new(service, Duration::from_secs(5), CancellationToken::new())
    }

    fn app() -> Router {
        create_router(state_with(MockBoardSource::new("data/mock_boards").unwrap()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn departures_json_shape() {
        let (status, json) = get_json(app(), "/v1/departures/stations/Appellhofplat").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({
                "departures": [
                    { "line": "5", "destination": "Sparkasse Am Butzweilerhof", "arrivalInMinutes": 0 },
                    { "line": "3", "destination": "Mengenich Ulemannstr.", "arrivalInMinutes": 12 },
                    { "line": "4", "destination": "Bocklemünd", "arrivalInMinutes": -1 },
                ]
            })
        );
    }

    #[tokio::test]
    async fn percent_encoded_key_is_decoded() {
        let (status, json) = get_json(app(), "/v1/departures/stations/Appellhofpl%61tz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["departures"][0]["destination"], "Sparkasse Am Butzweilerhof");
    }

    #[tokio::test]
    async fn unknown_stop_is_404() {
        let (status, json) = get_json(app(), "/v1/departures/stations/zzzzzzzz").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["stage"], "resolve");
    }

    #[tokio::test]
    async fn unmapped_stop_is_500() {
        let (status, json) = get_json(app(), "/v1/departures/stations/Heumarkt").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["stage"], "resolve");
        assert!(json["error"].as_str().unwrap().contains("Heumarkt"));
    }

    #[tokio::test]
    async fn upstream_failure_is_502() {
        // No page for Neumarkt (2).
        let source = MockBoardSource::from_documents([(
            StopId::new(7),
            RawDocument::new("<html></html>", None),
        )]);
        let app = create_router(state_with(source));

        let (status, json) = get_json(app, "/v1/departures/stations/Neumarkt").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["stage"], "fetch");
    }

    #[tokio::test]
    async fn malformed_page_is_502() {
        let source = MockBoardSource::from_documents([(
            StopId::new(2),
            RawDocument::new("<html><body>Wartung</body></html>", None),
        )]);
        let app = create_router(state_with(source));

        let (status, json) = get_json(app, "/v1/departures/stations/Neumarkt").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["stage"], "parse");
    }

    #[tokio::test]
    async fn shutdown_cancels_requests() {
        let source = MockBoardSource::new("data/mock_boards")
            .unwrap()
            .with_delay(Duration::from_secs(30));
        let state = state_with(source);
        state.shutdown.cancel();

        let (status, json) = get_json(create_router(state), "/v1/departures/stations/Neumarkt").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["stage"], "fetch");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upstream_is_502_with_body() {
        // Board deadline 5 s, inbound limit 15 s.
        let source = MockBoardSource::new("data/mock_boards")
            .unwrap()
            .with_delay(Duration::from_secs(30));
        let app = create_router(state_with(source));

        let (status, json) = get_json(app, "/v1/departures/stations/Neumarkt").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["stage"], "fetch");
        assert!(json["error"].as_str().unwrap().contains("deadline"));
    }

    #[tokio::test]
    async fn search_ranks_and_limits() {
        let (status, json) = get_json(app(), "/v1/stations/search?q=neumarkt&limit=3").await;

        assert_eq!(status, StatusCode::OK);
        let stations = json["stations"].as_array().unwrap();
        assert!(!stations.is_empty() && stations.len() <= 3);
        assert_eq!(stations[0]["name"], "Neumarkt");
        assert_eq!(stations[0]["id"], 2);
    }

    #[tokio::test]
    async fn search_limit_is_capped() {
        let (_, json) = get_json(app(), "/v1/stations/search?q=a&limit=500").await;
        assert_eq!(json["stations"].as_array().unwrap().len(), MAX_SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn empty_search_is_empty() {
        let (status, json) = get_json(app(), "/v1/stations/search").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stations"], serde_json::json!([]));
    }
}
