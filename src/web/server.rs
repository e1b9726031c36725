use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::audio::{AudioPresentation, AudioResolver};
use crate::browser::GenreBrowser;
use crate::catalog::loader::{CatalogCache, CatalogLoader};
use crate::catalog::schema;
use crate::cli::ServeArgs;
use crate::core::catalog::Catalog;
use crate::core::config::{AppConfig, DEFAULT_BROWSE_LIMIT};
use crate::core::types::IssueKind;
use crate::model::artifacts::{ArtifactStatus, ModelCache};
use crate::model::batch::predict_batch;
use crate::model::{GenrePredictor, ModelError};
use crate::parsing::csv::{read_csv_bytes, ParseError};
use crate::utils::text::clean;
use crate::utils::validation::{validate_upload, ValidationError};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_TEXT_FIELD_SIZE: usize = 1024 * 1024; // 1MB

/// Upper bound for the `limit` of a listing requested over HTTP
pub const MAX_BROWSE_LIMIT: usize = 500;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub loader: CatalogLoader,
    pub catalog: CatalogCache,
    pub model: ModelCache,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            loader: CatalogLoader::from_config(&config),
            catalog: CatalogCache::new(),
            model: ModelCache::new(),
            config,
        }
    }

    /// State with an already-loaded predictor
    #[must_use]
    pub fn with_model(config: AppConfig, model: Arc<dyn GenrePredictor>) -> Self {
        Self {
            model: ModelCache::with_model(model),
            ..Self::new(config)
        }
    }

    fn current_catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.current(&self.loader)
    }

    /// Audio resolver for a catalog; uploaded catalogs may only reference
    /// files under the data directory
    fn resolver(&self, uploaded: bool) -> AudioResolver {
        let resolver = AudioResolver::from_config(&self.config);
        if uploaded {
            resolver.confined_to(&self.config.data_dir)
        } else {
            resolver
        }
    }

    fn is_upload(&self, catalog: Option<&Arc<Catalog>>) -> bool {
        catalog.is_some_and(|c| self.catalog.is_upload(c))
    }

    fn browser(&self, limit: usize, uploaded: bool) -> GenreBrowser {
        GenreBrowser::new(self.resolver(uploaded)).with_limit(limit)
    }
}

/// An uploaded file that passed validation
#[derive(Debug)]
struct Upload {
    filename: Option<String>,
    content: Vec<u8>,
}

/// Fields extracted from a multipart form
#[derive(Debug, Default)]
struct FormData {
    text: Option<String>,
    text_column: Option<String>,
    limit: Option<usize>,
    file: Option<Upload>,
    fields_received: usize,
    had_parse_error: bool,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

#[derive(Deserialize)]
struct BrowseParams {
    genre: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct AudioParams {
    row: usize,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    (
        status,
        Json(create_safe_error_response(
            error_type,
            user_message,
            internal_error,
        )),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, config).await })
}

/// Application routes without the middleware stack.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/batch", post(batch_handler))
        .route("/api/browse", get(browse_handler))
        .route("/api/catalog", post(catalog_handler))
        .route("/api/audio", get(audio_handler))
        .with_state(state)
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter cannot be configured.
pub fn create_router(config: AppConfig) -> anyhow::Result<Router> {
    let status = ArtifactStatus::check(&config);
    if !status.model_present {
        tracing::warn!(
            "Missing model artifact {}; predictions will fail until it exists",
            status.model_path.display()
        );
    }
    let state = Arc::new(AppState::new(config));

    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    // Build router with comprehensive security layers
    let app = routes(state).layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            // IP-based rate limiting to prevent abuse
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // Request timeout to prevent slow client attacks
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(30),
            ))
            // Limit concurrent requests to prevent DOS
            .layer(ConcurrencyLimitLayer::new(100))
            // Limit request body size (accommodate largest file + multipart overhead)
            .layer(DefaultBodyLimit::max(20 * 1024 * 1024)), // 20MB limit
    );

    Ok(app)
}

async fn run_server(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    let app = create_router(config)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting lyrics-genre web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// Artifact presence and training metadata
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut status = ArtifactStatus::check(&state.config).to_json();
    status["catalog_override"] = serde_json::json!(state.catalog.has_upload());
    Json(status)
}

/// Predict the genre of pasted lyrics and list songs of that genre
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let form = match extract_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some(text) = form.text.as_deref().filter(|t| !t.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            "Please paste some lyrics. Blank input is refused rather than classified as an empty song.",
            None,
        );
    };

    let model = match state.model.get_or_load(&state.config.model_path()) {
        Ok(model) => model,
        Err(e) => return model_error_response(&e),
    };

    let genre = model.predict_one(&clean(text));

    let upload = match form.file.as_ref().map(parse_upload).transpose() {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let catalog = state.current_catalog();
    let needs_upload = catalog.as_ref().map_or(true, |c| c.is_empty());
    let uploaded = state.is_upload(catalog.as_ref()) || (needs_upload && upload.is_some());
    let outcome = state
        .browser(clamp_limit(form.limit), uploaded)
        .browse(&genre, catalog.as_deref(), upload.as_ref());

    // An upload only stands in when nothing else is loaded; keep it so
    // /api/audio can serve its rows
    if needs_upload {
        if let Some(upload) = upload {
            state.catalog.set_upload(upload);
        }
    }

    Json(serde_json::json!({
        "genre": genre,
        "browse": outcome.to_json(),
    }))
    .into_response()
}

/// Predict a genre for every row of an uploaded CSV
async fn batch_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let form = match extract_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some(file) = form.file.as_ref() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            "Please upload a CSV file.",
            None,
        );
    };
    let table = match parse_upload(file) {
        Ok(table) => table,
        Err(response) => return response,
    };

    let model = match state.model.get_or_load(&state.config.model_path()) {
        Ok(model) => model,
        Err(e) => return model_error_response(&e),
    };

    let text_column = form.text_column.as_deref().filter(|c| !c.trim().is_empty());
    let predictions = match predict_batch(model.as_ref(), table, text_column) {
        Ok(predictions) => predictions,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, "batch_failed", &e.to_string(), None)
        }
    };

    let csv = match predictions.to_csv() {
        Ok(csv) => csv,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Failed to render predictions",
                Some(&e.to_string()),
            )
        }
    };

    let preview = predictions.preview();
    Json(serde_json::json!({
        "rows": predictions.table.len(),
        "text_column": predictions.text_column,
        "genres": predictions.genres,
        "preview": {
            "columns": preview.columns(),
            "rows": preview.rows().map(|row| row.values().to_vec()).collect::<Vec<_>>(),
        },
        "csv": csv,
    }))
    .into_response()
}

/// List catalog songs of a genre
async fn browse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BrowseParams>,
) -> Json<serde_json::Value> {
    let catalog = state.current_catalog();
    let outcome = state
        .browser(clamp_limit(params.limit), state.is_upload(catalog.as_ref()))
        .browse(&params.genre, catalog.as_deref(), None);
    Json(outcome.to_json())
}

/// Install an uploaded catalog as the override
async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let form = match extract_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some(file) = form.file.as_ref() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            "Please upload a CSV file.",
            None,
        );
    };
    let catalog = match parse_upload(file) {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };

    let roles = schema::resolve(&catalog);
    tracing::info!(
        "Installed uploaded catalog {} ({} rows)",
        file.filename.as_deref().unwrap_or("<unnamed>"),
        catalog.len()
    );
    let catalog = state.catalog.set_upload(catalog);

    Json(serde_json::json!({
        "rows": catalog.len(),
        "columns": catalog.columns(),
        "roles": roles,
    }))
    .into_response()
}

/// Serve the local audio file of a catalog row
async fn audio_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AudioParams>,
) -> Response {
    let not_found = || {
        error_response(
            StatusCode::NOT_FOUND,
            IssueKind::ResourceUnavailable.code(),
            "No local audio for this row",
            None,
        )
    };

    let Some(catalog) = state.current_catalog() else {
        return not_found();
    };
    let Some(row) = catalog.row(params.row) else {
        return not_found();
    };

    let roles = schema::resolve(&catalog);
    match state
        .resolver(state.is_upload(Some(&catalog)))
        .resolve(row, &roles)
        .presentation
    {
        AudioPresentation::InlineBytes { data, path } => {
            ([(header::CONTENT_TYPE, audio_mime_type(&path))], data).into_response()
        }
        _ => not_found(),
    }
}

/// MIME type for a local audio file, from its extension
fn audio_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_BROWSE_LIMIT).clamp(1, MAX_BROWSE_LIMIT)
}

fn model_error_response(error: &ModelError) -> Response {
    match error {
        ModelError::Missing(_) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            IssueKind::MissingArtifact.code(),
            &error.to_string(),
            None,
        ),
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "model_unavailable",
            "The model artifact could not be loaded",
            Some(&error.to_string()),
        ),
    }
}

/// Parse a validated upload as CSV
fn parse_upload(upload: &Upload) -> Result<Catalog, Response> {
    read_csv_bytes(&upload.content).map_err(|e| match e {
        ParseError::TooManyRows(_) => error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "too_many_rows",
            &e.to_string(),
            None,
        ),
        _ => error_response(
            StatusCode::BAD_REQUEST,
            IssueKind::MalformedSource.code(),
            "Unable to read the uploaded CSV. Please check the file format and try again.",
            Some(&e.to_string()),
        ),
    })
}

fn validation_error_response(error: &ValidationError) -> Response {
    match error {
        ValidationError::FilenameTooLong => error_response(
            StatusCode::BAD_REQUEST,
            "filename_too_long",
            "Filename exceeds maximum length limit",
            Some("Filename validation failed due to length constraints"),
        ),
        ValidationError::InvalidFilename => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_filename",
            "Filename contains invalid or dangerous characters",
            Some("Filename validation failed due to invalid characters"),
        ),
        ValidationError::FormatValidationFailed => error_response(
            StatusCode::BAD_REQUEST,
            "format_mismatch",
            "File content does not match the expected format based on filename",
            Some("Format validation failed"),
        ),
        ValidationError::InvalidFileContent => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_content",
            "File content appears malformed or corrupted",
            None,
        ),
        ValidationError::EmptyFilename => error_response(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            "File validation failed",
            None,
        ),
    }
}

/// Read every multipart field, enforcing field count and size limits
async fn extract_form(multipart: &mut Multipart) -> Result<FormData, Response> {
    let mut form = FormData::default();

    loop {
        // Check field count limit before processing
        if form.fields_received >= MAX_MULTIPART_FIELDS {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "field_limit_exceeded",
                "Too many form fields",
                None,
            ));
        }

        match multipart.next_field().await {
            Ok(Some(field)) => {
                form.fields_received += 1;
                let name = field.name().unwrap_or_default().to_string();

                match name.as_str() {
                    "file" => {
                        let filename = field
                            .file_name()
                            .map(std::string::ToString::to_string)
                            .filter(|n| !n.is_empty());

                        match field.bytes().await {
                            Ok(bytes) if bytes.is_empty() => {}
                            Ok(bytes) => {
                                if bytes.len() > MAX_FILE_FIELD_SIZE {
                                    return Err(error_response(
                                        StatusCode::PAYLOAD_TOO_LARGE,
                                        "file_too_large",
                                        "File size exceeds limit",
                                        None,
                                    ));
                                }

                                let filename = validate_upload(filename.as_deref(), &bytes)
                                    .map_err(|e| validation_error_response(&e))?;
                                form.file = Some(Upload {
                                    filename,
                                    content: bytes.to_vec(),
                                });
                            }
                            Err(_) => form.had_parse_error = true,
                        }
                    }
                    "text" | "text_column" | "limit" => match field.text().await {
                        Ok(text) => {
                            if text.len() > MAX_TEXT_FIELD_SIZE {
                                return Err(error_response(
                                    StatusCode::PAYLOAD_TOO_LARGE,
                                    "text_too_large",
                                    "Text field size exceeds limit",
                                    None,
                                ));
                            }

                            match name.as_str() {
                                "text" => form.text = Some(text),
                                "text_column" => form.text_column = Some(text),
                                _ => form.limit = text.trim().parse().ok(),
                            }
                        }
                        Err(_) => form.had_parse_error = true,
                    },
                    _ => {} // Ignore unknown fields
                }
            }
            Ok(None) => break, // No more fields
            Err(_) => {
                form.had_parse_error = true;
                break;
            }
        }
    }

    if form.had_parse_error && form.text.is_none() && form.file.is_none() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            "Failed to parse upload. Please check the file format.",
            None,
        ));
    }

    Ok(form)
}
