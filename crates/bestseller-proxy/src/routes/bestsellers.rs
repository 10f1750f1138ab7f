use axum::extract::State;
use axum::http::header;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/bestsellers
///
/// The cache-proxy endpoint: returns the upstream bestseller overview JSON,
/// served from the persisted snapshot while it is fresh. The body is passed
/// through verbatim, so the response is built from the raw string rather
/// than re-serialized.
pub async fn get_bestsellers(State(state): State<AppState>) -> Result<Response, AppError> {
    let content = state.proxy.handle().await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(content.into())
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nyt::{BestsellerSource, UpstreamError};
    use crate::proxy::CacheProxy;
    use crate::store::{Snapshot, SnapshotStore, StoreError};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct FixedStore {
        snapshot: Mutex<Option<Snapshot>>,
    }

    #[async_trait]
    impl SnapshotStore for FixedStore {
        async fn latest(&self) -> Result<Option<Snapshot>, StoreError> {
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn insert(&self, content: &str) -> Result<Snapshot, StoreError> {
            let snapshot = Snapshot {
                content: content.to_string(),
                fetched_at: Utc::now(),
            };
            *self.snapshot.lock().unwrap() = Some(snapshot.clone());
            Ok(snapshot)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl BestsellerSource for FailingSource {
        async fn fetch_overview(&self) -> Result<String, UpstreamError> {
            Err(UpstreamError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }

    fn router(snapshot: Option<Snapshot>) -> Router {
        let store = Arc::new(FixedStore {
            snapshot: Mutex::new(snapshot),
        });
        let proxy = Arc::new(CacheProxy::new(
            store,
            Arc::new(FailingSource),
            Duration::hours(24),
        ));
        Router::new()
            .route("/api/bestsellers", get(get_bestsellers))
            .route("/health", get(crate::routes::health::health))
            .with_state(AppState { proxy })
    }

    const OVERVIEW: &str = r#"{"results":{"lists":[]}}"#;

    #[tokio::test]
    async fn test_fresh_snapshot_served_verbatim() {
        let app = router(Some(Snapshot {
            content: OVERVIEW.to_string(),
            fetched_at: Utc::now(),
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bestsellers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], OVERVIEW.as_bytes());
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_error_json() {
        let app = router(None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bestsellers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
