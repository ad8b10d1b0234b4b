pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::portfolio::handlers as portfolio;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session API
        .route("/api/v1/auth/signup", post(session::handle_signup))
        .route("/api/v1/auth/login", post(session::handle_login))
        .route("/api/v1/auth/guest", post(session::handle_guest_login))
        .route("/api/v1/auth/logout", post(session::handle_logout))
        .route("/api/v1/auth/session", get(session::handle_session))
        // Portfolio API. Input size is not limited locally; oversized input
        // fails at the generation service instead.
        .route(
            "/api/v1/posts/parse",
            post(portfolio::handle_parse_posts).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/v1/resume/upload",
            post(portfolio::handle_upload_resume).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/v1/portfolio/generate",
            post(portfolio::handle_generate).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/v1/portfolio/latest", get(portfolio::handle_latest))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::llm_client::testing::ScriptedService;
    use crate::llm_client::GenerationService;
    use crate::portfolio::orchestrator::fixtures::{PORTFOLIO_JSON, TIMELINE_JSON};
    use crate::portfolio::request_builder::{SIMPLE_PORTFOLIO_TEMPERATURE, TIMELINE_TEMPERATURE};
    use crate::portfolio::submission::SubmissionTracker;
    use crate::session::client::CLIENT_ID_HEADER;
    use crate::session::store::InMemoryKvStore;

    fn app(generator: Arc<dyn GenerationService>) -> Router {
        build_router(AppState {
            generator,
            kv: Arc::new(InMemoryKvStore::new()),
            submissions: Arc::new(SubmissionTracker::new()),
        })
    }

    fn scripted() -> Arc<dyn GenerationService> {
        Arc::new(
            ScriptedService::new()
                .reply(TIMELINE_TEMPERATURE, Ok(TIMELINE_JSON))
                .reply(SIMPLE_PORTFOLIO_TEMPERATURE, Ok(PORTFOLIO_JSON)),
        )
    }

    fn post_json(uri: &str, client: Uuid, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(CLIENT_ID_HEADER, client.to_string())
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_client(uri: &str, client: Uuid) -> Request<Body> {
        Request::get(uri)
            .header(CLIENT_ID_HEADER, client.to_string())
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(scripted())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_requires_session() {
        let response = app(scripted())
            .oneshot(post_json(
                "/api/v1/portfolio/generate",
                Uuid::new_v4(),
                json!({ "resume_text": "cv", "posts_text": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_missing_client_header_is_rejected() {
        let response = app(scripted())
            .oneshot(Request::get("/api/v1/auth/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_guest_can_generate_and_read_latest() {
        let app = app(scripted());
        let client = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["is_guest"], true);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/portfolio/generate",
                client,
                json!({ "resume_text": "Ada Lovelace", "posts_text": "2024-07-26: Launched project X" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["request_id"], 1);
        assert_eq!(body["timeline"]["timeline"][0]["type"], "Project");
        assert_eq!(body["simple_portfolio"]["name"], "Ada Lovelace");
        assert_eq!(body["messages"], json!([]));

        let response = app
            .clone()
            .oneshot(get_with_client("/api/v1/portfolio/latest", client))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["request_id"], 1);
        assert_eq!(body["in_flight"], false);
        assert_eq!(body["simple_portfolio"]["title"], "Staff Engineer");
    }

    #[tokio::test]
    async fn test_empty_submission_is_a_validation_error() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                "/api/v1/portfolio/generate",
                client,
                json!({ "resume_text": "", "posts_text": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Please upload a resume or paste some posts to generate a timeline."
        );
    }

    #[tokio::test]
    async fn test_duplicate_signup_returns_conflict() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        let creds = json!({ "email": "ada@example.com", "password": "engine" });

        let first = app
            .clone()
            .oneshot(post_json("/api/v1/auth/signup", client, creds.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(post_json("/api/v1/auth/signup", client, creds))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(second).await["error"]["message"],
            "User with this email already exists."
        );
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/auth/logout", client, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_with_client("/api/v1/auth/session", client))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_text_file() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n%PDF-1.4\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/v1/resume/upload")
            .header(CLIENT_ID_HEADER, client.to_string())
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_accepts_plain_text_file() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nAda Lovelace\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/v1/resume/upload")
            .header(CLIENT_ID_HEADER, client.to_string())
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["file_name"], "resume.txt");
        assert_eq!(body["resume_text"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_parse_posts_preview() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                "/api/v1/posts/parse",
                client,
                json!({ "posts_text": "2024-06-15: Got certified\n\nShipped a feature" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([
                { "date": "2024-06-15", "text": "Got certified" },
                { "date": "unknown", "text": "Shipped a feature" }
            ])
        );
    }

    #[tokio::test]
    async fn test_generate_accepts_input_above_default_body_limit() {
        let service = Arc::new(
            ScriptedService::new()
                .reply(TIMELINE_TEMPERATURE, Ok(TIMELINE_JSON))
                .reply(SIMPLE_PORTFOLIO_TEMPERATURE, Ok(PORTFOLIO_JSON)),
        );
        let app = app(service.clone());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                "/api/v1/portfolio/generate",
                client,
                json!({ "resume_text": "x".repeat(3_000_000), "posts_text": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_logout_drops_latest_result() {
        let app = app(scripted());
        let client = Uuid::new_v4();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/portfolio/generate",
                client,
                json!({ "resume_text": "Ada Lovelace", "posts_text": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        app.clone()
            .oneshot(post_json("/api/v1/auth/logout", client, json!({})))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json("/api/v1/auth/guest", client, json!({})))
            .await
            .unwrap();

        let response = app
            .oneshot(get_with_client("/api/v1/portfolio/latest", client))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
