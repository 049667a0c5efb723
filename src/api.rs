//! HTTP surface: server-rendered form, JSON API and OpenAPI docs.

use crate::analyzer::{self, Analysis, AnalyzeError};
use crate::inference::Artifacts;
use crate::presentation::{LabelPolicy, RuleDescription};
use crate::render::{render_page, Outcome};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub struct AppState {
    pub artifacts: Artifacts,
    pub policy: LabelPolicy,
    /// Request body cap; `None` accepts input of any length
    pub max_input_bytes: Option<usize>,
}

#[derive(OpenApi)]
#[openapi(
    paths(analyze_text, get_policy, health),
    components(
        schemas(
            AnalyzeRequest,
            ErrorResponse,
            PolicyResponse,
            HealthResponse,
            crate::analyzer::Analysis,
            crate::presentation::DisplayResult,
            crate::presentation::Advisory,
            crate::presentation::AdvisoryTone,
            crate::presentation::LabelPolicy,
            crate::presentation::RuleDescription
        )
    ),
    tags(
        (name = "analyzer", description = "Sentiment / mental health category analysis")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolicyResponse {
    pub policy: LabelPolicy,
    /// Evaluated top to bottom; the first match wins
    pub rules: Vec<RuleDescription>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub policy: LabelPolicy,
    pub features: usize,
    pub classes: Vec<String>,
}

/// Request-path failure mapped to an HTTP response.
pub struct AppError(AnalyzeError);

impl From<AnalyzeError> for AppError {
    fn from(e: AnalyzeError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalyzeError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyzeError::Inference(e) => {
                error!("❌ Inference failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(state.policy, "", None))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnalyzeForm>,
) -> (StatusCode, Html<String>) {
    match analyzer::analyze(&state.artifacts, state.policy, &form.text) {
        Ok(analysis) => (
            StatusCode::OK,
            Html(render_page(state.policy, &form.text, Some(Outcome::Result(&analysis)))),
        ),
        Err(AnalyzeError::EmptyInput) => (
            StatusCode::OK,
            Html(render_page(
                state.policy,
                &form.text,
                Some(Outcome::Warning(analyzer::EMPTY_INPUT_MESSAGE)),
            )),
        ),
        Err(AnalyzeError::Inference(e)) => {
            error!("❌ Inference failed: {}", e);
            let message = format!("Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(state.policy, &form.text, Some(Outcome::Failure(&message)))),
            )
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Classification result", body = Analysis),
        (status = 422, description = "Empty or whitespace-only text", body = ErrorResponse),
        (status = 500, description = "Artifacts failed during inference", body = ErrorResponse)
    ),
    tag = "analyzer"
)]
pub async fn analyze_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Analysis>, AppError> {
    let analysis = analyzer::analyze(&state.artifacts, state.policy, &req.text)?;
    Ok(Json(analysis))
}

#[utoipa::path(
    get,
    path = "/api/policy",
    responses(
        (status = 200, description = "Active label policy and its ordered rules", body = PolicyResponse)
    ),
    tag = "analyzer"
)]
pub async fn get_policy(State(state): State<Arc<AppState>>) -> Json<PolicyResponse> {
    Json(PolicyResponse {
        policy: state.policy,
        rules: state.policy.describe(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "analyzer"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        policy: state.policy,
        features: state.artifacts.vectorizer().dim(),
        classes: state
            .artifacts
            .classifier()
            .classes()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let body_limit = match state.max_input_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index).post(submit))
        .route("/api/analyze", post(analyze_text))
        .route("/api/policy", get(get_policy))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::doubles::{fixed, CountingVectorizer, FixedClassifier};
    use crate::inference::{InferenceError, InferenceResult, PredictedLabel, Scaler, SparseVector};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn app(label: PredictedLabel, policy: LabelPolicy) -> (Router, Arc<AtomicUsize>) {
        app_with_limit(label, policy, None)
    }

    fn app_with_limit(
        label: PredictedLabel,
        policy: LabelPolicy,
        max_input_bytes: Option<usize>,
    ) -> (Router, Arc<AtomicUsize>) {
        let (artifacts, calls) = fixed(label);
        let state = Arc::new(AppState {
            artifacts,
            policy,
            max_input_bytes,
        });
        (router(state, Path::new("static")), calls)
    }

    struct BrokenScaler;

    impl Scaler for BrokenScaler {
        fn transform(&self, features: SparseVector) -> InferenceResult<SparseVector> {
            Err(InferenceError::DimensionMismatch {
                stage: "scaler",
                expected: 7,
                actual: features.dim(),
            })
        }
    }

    fn long_text_body(bytes: usize) -> String {
        serde_json::json!({ "text": "a".repeat(bytes) }).to_string()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_analyze_returns_display_result() {
        let (app, _) = app(PredictedLabel::Text("Negative".into()), LabelPolicy::Sentiment);
        let resp = app
            .oneshot(json_request("/api/analyze", r#"{"text":"I feel AWFUL!!! 2 days now"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["cleaned_text"], "i feel awful  days now");
        assert_eq!(body["predicted_label"], "Negative");
        assert_eq!(body["policy"], "sentiment");
        assert_eq!(body["result"]["color"], "#E74C3C");
        assert_eq!(body["result"]["advisory"]["tone"], "info");
    }

    #[tokio::test]
    async fn test_api_rejects_blank_text() {
        let (app, calls) = app(PredictedLabel::Text("positive".into()), LabelPolicy::Sentiment);
        let resp = app.oneshot(json_request("/api/analyze", r#"{"text":"   "}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body.error, analyzer::EMPTY_INPUT_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_form_submit_renders_result() {
        let (app, _) = app(PredictedLabel::Index(2), LabelPolicy::CategoryIndex);
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=nothing+matters+anymore"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_string(resp).await;
        assert!(html.contains("<h2 style='color:#fab1a0;'>Predicted Category: 🚨 Suicidal Ideation</h2>"));
        assert!(html.contains("nothing matters anymore</textarea>"));
    }

    #[tokio::test]
    async fn test_form_submit_blank_shows_warning() {
        let (app, calls) = app(PredictedLabel::Text("positive".into()), LabelPolicy::Sentiment);
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=++"))
            .unwrap();
        let html = body_string(app.oneshot(req).await.unwrap()).await;
        assert!(html.contains(analyzer::EMPTY_INPUT_MESSAGE));
        assert!(!html.contains("<h2"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let (app, _) = app(PredictedLabel::Text("normal".into()), LabelPolicy::CategoryText);
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_string(resp).await.contains("Analyze Sentiment"));

        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["policy"], "category-text");
        assert_eq!(body["features"], 1);
        assert_eq!(body["classes"][0], "normal");
    }

    #[tokio::test]
    async fn test_policy_endpoint_lists_rules_in_order() {
        let (app, _) = app(PredictedLabel::Text("x".into()), LabelPolicy::Sentiment);
        let resp = app
            .oneshot(Request::builder().uri("/api/policy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        let rules = body["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0]["result"]["bucket"], "positive");
        assert_eq!(rules[2]["condition"], "anything else");
    }

    #[tokio::test]
    async fn test_long_input_is_accepted_by_default() {
        let (app, calls) = app(PredictedLabel::Text("positive".into()), LabelPolicy::Sentiment);
        let resp = app
            .oneshot(json_request("/api/analyze", &long_text_body(3 * 1024 * 1024)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_configured_limit_rejects_large_body() {
        let (app, calls) = app_with_limit(
            PredictedLabel::Text("positive".into()),
            LabelPolicy::Sentiment,
            Some(1024),
        );
        let resp = app
            .clone()
            .oneshot(json_request("/api/analyze", &long_text_body(4096)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let resp = app
            .oneshot(json_request("/api/analyze", &long_text_body(100)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_inference_failure_renders_page() {
        let artifacts = Artifacts::new(
            Box::new(CountingVectorizer {
                calls: Default::default(),
            }),
            Box::new(BrokenScaler),
            Box::new(FixedClassifier(PredictedLabel::Text("positive".into()))),
        );
        let state = Arc::new(AppState {
            artifacts,
            policy: LabelPolicy::Sentiment,
            max_input_bytes: None,
        });
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=hello+there"))
            .unwrap();
        let resp = router(state, Path::new("static")).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html")));
        let html = body_string(resp).await;
        assert!(html.contains("Analysis failed: dimension mismatch in scaler"));
        assert!(html.contains("hello there</textarea>"));
        assert!(!html.contains("<h2"));
    }

    #[test]
    fn test_openapi_lists_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/api/analyze"].is_object());
        assert!(doc["paths"]["/health"].is_object());
    }
}
