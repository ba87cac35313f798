//! Base64.ai OCR adapter - normalizes vendor OCR output behind an HTTP API.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64_ocr_adapter::config::{ProviderSettings, ServerConfig};
use base64_ocr_adapter::ocr::base64_ai::{Base64AiProvider, PROVIDER_NAME};
use base64_ocr_adapter::ocr::transport::HttpTransport;
use base64_ocr_adapter::{DocumentFile, OcrProvider, ProviderError};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    provider: Arc<dyn OcrProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "base64_ocr_adapter=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env();
    let settings = ProviderSettings::load(&server.settings_dir, PROVIDER_NAME)?;
    info!("Provider '{}' configured: {:?}", PROVIDER_NAME, settings);

    let transport = Arc::new(HttpTransport::new(reqwest::Client::new()));
    let state = AppState {
        provider: Arc::new(Base64AiProvider::new(settings, transport)),
    };
    info!("OCR provider '{}' ready", state.provider.name());

    let app = router(state).layer(DefaultBodyLimit::max(server.body_limit));

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;
    info!("Server listening on http://{}", server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ocr/ocr", post(ocr_text))
        .route("/ocr/invoice_parser", post(invoice_parser))
        .route("/ocr/receipt_parser", post(receipt_parser))
        .route("/ocr/identity_parser", post(identity_parser))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `{"error": message}`.
struct ApiError(StatusCode, String);

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        let status = match &e {
            ProviderError::ProviderFailure(_) => StatusCode::BAD_GATEWAY,
            ProviderError::DeprecatedFeature(_) => StatusCode::GONE,
            ProviderError::Io(_) => StatusCode::BAD_REQUEST,
        };
        Self(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(serde::Deserialize)]
struct LanguageQuery {
    language: Option<String>,
}

/// Plain text OCR. Always rejected by this provider.
async fn ocr_text(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = read_upload(multipart).await?;
    let result = state
        .provider
        .ocr(&file, query.language.as_deref())
        .await
        .map_err(|e| log_failure("ocr", &file, e))?;
    Ok(Json(result))
}

async fn invoice_parser(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let file = read_upload(multipart).await?;
    let result = state
        .provider
        .invoice_parser(&file, query.language.as_deref())
        .await
        .map_err(|e| log_failure("invoice_parser", &file, e))?;
    Ok(Json(result).into_response())
}

async fn receipt_parser(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let file = read_upload(multipart).await?;
    let result = state
        .provider
        .receipt_parser(&file, query.language.as_deref())
        .await
        .map_err(|e| log_failure("receipt_parser", &file, e))?;
    Ok(Json(result).into_response())
}

async fn identity_parser(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let file = read_upload(multipart).await?;
    let result = state
        .provider
        .identity_parser(&file, Some(file.filename.as_str()))
        .await
        .map_err(|e| log_failure("identity_parser", &file, e))?;
    Ok(Json(result).into_response())
}

// ============================================================================
// Helper functions
// ============================================================================

/// Read the `file` field of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<DocumentFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
    })? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("document").to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiError(StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
            })?;
            if data.is_empty() {
                break;
            }
            info!("Received file: {} ({} bytes)", filename, data.len());
            return Ok(DocumentFile::new(filename, data.to_vec()));
        }
    }

    Err(ApiError(StatusCode::BAD_REQUEST, "No file uploaded".to_string()))
}

fn log_failure(feature: &str, file: &DocumentFile, e: ProviderError) -> ApiError {
    error!("{} failed for {}: {}", feature, file.filename, e);
    e.into()
}
