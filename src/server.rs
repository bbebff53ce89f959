use crate::config::ServeConfig;
use crate::error::EnhanceError;
use crate::model::Enhancer;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub enhancer: Arc<Mutex<Enhancer>>,
    pub config: Arc<ServeConfig>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub model_path: String,
    pub target_size: [u32; 2],
    pub low_res_size: [u32; 2],
    pub supported_formats: Vec<String>,
    pub max_file_size_bytes: usize,
}

const SUPPORTED_FORMATS: [&str; 2] = ["image/jpeg", "image/png"];

/// Room for multipart boundaries and part headers on top of the file limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Image Enhancement</title></head>
<body>
<h1>Image Enhancement</h1>
<form id="upload">
  <input type="file" name="file" accept="image/png,image/jpeg" required>
  <button type="submit">Enhance</button>
</form>
<p id="status"></p>
<img id="result" alt="">
<script>
document.getElementById('upload').addEventListener('submit', async (e) => {
  e.preventDefault();
  const status = document.getElementById('status');
  status.textContent = 'Processing...';
  const res = await fetch('/enhance', { method: 'POST', body: new FormData(e.target) });
  if (!res.ok) {
    status.textContent = (await res.json()).error;
    return;
  }
  document.getElementById('result').src = URL.createObjectURL(await res.blob());
  status.textContent = 'Done in ' + res.headers.get('x-processing-time-ms') + 'ms';
});
</script>
</body>
</html>
"#;

/// Build the router around an already loaded model
pub fn router(enhancer: Enhancer, config: ServeConfig) -> Router {
    let max_file_size = config.max_file_size;
    let state = AppState {
        enhancer: Arc::new(Mutex::new(enhancer)),
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(handle_index))
        .route("/enhance", post(handle_enhance))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size + MULTIPART_OVERHEAD))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: ServeConfig) -> anyhow::Result<()> {
    let enhancer = Enhancer::load(&config.model_path, config.dataset)?;
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(enhancer, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handle upload-and-enhance requests
async fn handle_enhance(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, EnhanceError> {
    let start = Instant::now();
    let max = state.config.max_file_size;
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let mut file_data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", content_length, max))?
    {
        if field.name() == Some("file") {
            if let Some(mime) = field.content_type() {
                if !SUPPORTED_FORMATS.iter().any(|f| *f == mime) {
                    tracing::warn!("Received file with content type: {}", mime);
                }
            }
            file_data = Some(field.bytes().await.map_err(|e| {
                multipart_error(e, "Failed to read file data", content_length, max)
            })?);
        }
    }

    let data = file_data.ok_or(EnhanceError::MissingFile)?;

    if data.len() > max {
        return Err(EnhanceError::ImageTooLarge { size: data.len(), max });
    }

    let image = decode_upload(&data)?;

    let enhancer = state.enhancer.clone();
    let output = tokio::task::spawn_blocking(move || {
        let enhancer = enhancer
            .lock()
            .map_err(|_| EnhanceError::Internal("model lock poisoned".to_string()))?;
        enhancer.enhance(&image)
    })
    .await
    .map_err(|e| EnhanceError::Internal(format!("Inference task failed: {}", e)))??;

    let png = encode_png(&output)?;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Enhanced {} byte upload in {}ms",
        data.len(),
        processing_time_ms
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::HeaderName::from_static("x-processing-time-ms"),
                processing_time_ms.to_string(),
            ),
        ],
        png,
    )
        .into_response())
}

/// A body that hit the request limit is reported as an oversized upload
fn multipart_error(
    err: MultipartError,
    context: &str,
    content_length: Option<usize>,
    max: usize,
) -> EnhanceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        EnhanceError::ImageTooLarge {
            size: content_length.unwrap_or(max + MULTIPART_OVERHEAD + 1),
            max,
        }
    } else {
        EnhanceError::InvalidRequest(format!("{}: {}", context, err))
    }
}

fn decode_upload(data: &[u8]) -> Result<DynamicImage, EnhanceError> {
    image::load_from_memory(data)
        .map_err(|e| EnhanceError::InvalidImage(format!("Failed to decode upload: {}", e)))
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, EnhanceError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| EnhanceError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = state.config.dataset;
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_path: state.config.model_path.display().to_string(),
        target_size: [dataset.target_size.0, dataset.target_size.1],
        low_res_size: [dataset.low_res_size.0, dataset.low_res_size.1],
        supported_formats: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
        max_file_size_bytes: state.config.max_file_size,
    })
}
