//! Web routes.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use chrono::Utc;
use drumbeat_scheduler::Scheduler;
use drumbeat_store::NewPost;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::WebError;

/// Shared state for the web server.
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
}

/// Create the web router.
pub fn create_router(scheduler: Arc<Scheduler>) -> Router {
    let state = Arc::new(AppState { scheduler });

    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/posts", post(create_post).get(list_posts))
        .route("/api/posts/{id}", get(post_detail))
        .route("/api/history", get(history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Read-only probe: disk health surfaces through tick errors instead
    Json(json!({
        "status": "ok",
        "scheduler_running": state.scheduler.is_running(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.scheduler.status().await)
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPost>,
) -> Result<impl IntoResponse, WebError> {
    let id = state.scheduler.enqueue(new).await?;
    Ok(Json(json!({ "id": id })))
}

async fn list_posts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut posts = state.scheduler.store().active().await;
    posts.sort_by_key(|p| p.scheduled_time);
    Json(json!({
        "posts": posts,
        "as_of": Utc::now()
    }))
}

async fn post_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, WebError> {
    match state.scheduler.get_post(&id).await {
        Some(post) => Ok(Json(post)),
        None => Err(WebError::NotFound(id)),
    }
}

async fn history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "history": state.scheduler.store().history().await }))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::Duration;
    use drumbeat_scheduler::SchedulerConfig;
    use drumbeat_store::PostStore;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn test_router(dir: &tempfile::TempDir) -> Router {
        let store = PostStore::open(dir.path().join("posts.json"), Duration::minutes(5)).unwrap();
        let publisher: drumbeat_publish::Publisher =
            Arc::new(|_req| Box::pin(async { Ok(()) }));
        let scheduler = Arc::new(Scheduler::new(
            Arc::new(store),
            publisher,
            SchedulerConfig::default(),
        ));
        create_router(scheduler)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_ok_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scheduler_running"], false);

        // Health polls are read-only: no snapshot gets written
        assert!(!dir.path().join("posts.json").exists());
    }

    #[tokio::test]
    async fn test_create_and_fetch_post() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let scheduled = Utc::now() + Duration::hours(1);
        let response = router
            .clone()
            .oneshot(post_json(
                "/api/posts",
                json!({
                    "platform": "linkedin",
                    "content": "hello from the API",
                    "target_ref": "profile-1",
                    "scheduled_time": scheduled,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let id = body["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::get(format!("/api/posts/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let post = body_json(response).await;
        assert_eq!(post["platform"], "linkedin");
        assert_eq!(post["status"], "pending");
        assert_eq!(post["retry_count"], 0);
    }

    #[tokio::test]
    async fn test_invalid_post_rejected_with_400() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(post_json(
                "/api/posts",
                json!({
                    "platform": "linkedin",
                    "content": "   ",
                    "target_ref": "profile-1",
                    "scheduled_time": Utc::now(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("content"));
    }

    #[tokio::test]
    async fn test_unknown_post_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(
                Request::get("/api/posts/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_lists_next_due() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let soon = Utc::now() + Duration::minutes(10);
        router
            .clone()
            .oneshot(post_json(
                "/api/posts",
                json!({
                    "platform": "twitter",
                    "content": "first",
                    "target_ref": "profile-1",
                    "scheduled_time": soon,
                }),
            ))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["running"], false);
        assert_eq!(body["counts"]["pending"], 1);
        assert_eq!(body["next_due"]["platform"], "twitter");
    }

    #[tokio::test]
    async fn test_list_posts_sorted_by_scheduled_time() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let now = Utc::now();
        for offset in [3, 1, 2] {
            router
                .clone()
                .oneshot(post_json(
                    "/api/posts",
                    json!({
                        "platform": "twitter",
                        "content": format!("post {offset}"),
                        "target_ref": "profile-1",
                        "scheduled_time": now + Duration::hours(offset),
                    }),
                ))
                .await
                .unwrap();
        }

        let response = router
            .oneshot(Request::get("/api/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;

        let contents: Vec<&str> = body["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["post 1", "post 2", "post 3"]);
    }

    #[tokio::test]
    async fn test_history_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(Request::get("/api/history").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["history"], json!([]));
    }
}
