//! Browser front end: one page plus the `/analyze` endpoint it posts to.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::analysis::{parse_selection, AnalysisRequestKey, AnalysisType, ImageIdentity};
use crate::error::AnalyzerError;
use crate::page::INDEX_HTML;
use crate::render::{AnnotationLabel, AnnotationRenderer};
use crate::session::SessionState;
use crate::vision::VisionService;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState<S> {
    pub vision: S,
    pub renderer: AnnotationRenderer,
    pub session: Mutex<SessionState>,
}

impl<S> AppState<S> {
    pub fn new(vision: S, renderer: AnnotationRenderer) -> Self {
        Self {
            vision,
            renderer,
            session: Mutex::new(SessionState::new()),
        }
    }
}

#[derive(Serialize)]
struct AnalyzeResponse {
    analysis_type: AnalysisType,
    title: &'static str,
    cached: bool,
    celebrate: bool,
    caption: &'static str,
    annotated_image: String,
    labels: Vec<AnnotationLabel>,
    options: Vec<String>,
    summary: Vec<String>,
    full_text: Option<String>,
    processing_time_ms: u128,
}

struct AnalyzeForm {
    file_name: String,
    image: Vec<u8>,
    analysis_type: AnalysisType,
    selection: Vec<usize>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AnalyzerError> {
        let mut upload = None;
        let mut analysis_type = None;
        let mut selection = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AnalyzerError::InvalidRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AnalyzerError::InvalidRequest(e.to_string()))?;
                    upload = Some((file_name, data.to_vec()));
                }
                "analysis_type" | "selection" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AnalyzerError::InvalidRequest(e.to_string()))?;
                    if name == "analysis_type" {
                        analysis_type = Some(text.parse::<AnalysisType>()?);
                    } else {
                        selection = parse_selection(&text)?;
                    }
                }
                other => log::debug!("Ignoring form field '{}'", other),
            }
        }

        let (file_name, image) = upload
            .ok_or_else(|| AnalyzerError::InvalidRequest("no image uploaded".to_string()))?;
        let analysis_type = analysis_type
            .ok_or_else(|| AnalyzerError::InvalidRequest("no analysis type chosen".to_string()))?;

        Ok(Self {
            file_name,
            image,
            analysis_type,
            selection,
        })
    }
}

async fn analyze<S>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AnalyzerError>
where
    S: VisionService + Send + Sync + 'static,
{
    let start = std::time::Instant::now();
    let form = AnalyzeForm::read(multipart).await?;

    let source = image::load_from_memory(&form.image)?.to_rgb8();
    let key = AnalysisRequestKey::new(
        ImageIdentity::from_upload(&form.file_name, &form.image),
        form.analysis_type,
    );

    let mut session = state.session.lock().await;
    let resolution = session.resolve(&state.vision, key, &form.image).await?;
    let rendered = state
        .renderer
        .render(&source, resolution.result, &form.selection)?;
    let annotated_image = png_data_url(&rendered.image)?;

    let cached = resolution.cached;
    let options = resolution.result.options();
    let summary = resolution.result.summary();
    let full_text = resolution.result.full_text().map(str::to_string);

    // Only a response that reaches the page consumes the one-shot signal.
    let celebrate = session.take_celebration();

    Ok(Json(AnalyzeResponse {
        analysis_type: form.analysis_type,
        title: form.analysis_type.title(),
        cached,
        celebrate,
        caption: rendered.caption,
        annotated_image,
        labels: rendered.labels,
        options,
        summary,
        full_text,
        processing_time_ms: start.elapsed().as_millis(),
    }))
}

fn png_data_url(image: &RgbImage) -> Result<String, AnalyzerError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(&png)
    ))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

pub fn router<S>(state: Arc<AppState<S>>) -> Router
where
    S: VisionService + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/analyze", post(analyze::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, DetectedFace, Vertex};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const BOUNDARY: &str = "analyzer-test-boundary";

    #[derive(Default)]
    struct OneFace {
        calls: AtomicUsize,
    }

    impl VisionService for OneFace {
        fn analyze(
            &self,
            _image: &[u8],
            _analysis_type: AnalysisType,
        ) -> impl Future<Output = Result<AnalysisResult, AnalyzerError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(AnalysisResult::Faces(vec![DetectedFace {
                    confidence: 0.9,
                    polygon: vec![
                        Vertex::new(0.25, 0.25),
                        Vertex::new(0.75, 0.25),
                        Vertex::new(0.75, 0.75),
                        Vertex::new(0.25, 0.75),
                    ],
                }]))
            }
        }
    }

    fn png_upload() -> Vec<u8> {
        let image = RgbImage::from_pixel(40, 20, image::Rgb([250, 250, 250]));
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    fn form(analysis_type: &str, selection: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"people.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&png_upload());
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"analysis_type\"\r\n\r\n{analysis_type}\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"selection\"\r\n\r\n{selection}\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );
        body
    }

    async fn post_form(app: Router, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app() -> (Arc<AppState<OneFace>>, Router) {
        let state = Arc::new(AppState::new(OneFace::default(), AnnotationRenderer::default()));
        (state.clone(), router(state))
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let (_, app) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Smart Image Analyzer"));
    }

    #[tokio::test]
    async fn test_analyze_then_reuse() {
        let (state, app) = app();

        let (status, first) = post_form(app.clone(), form("face_detection", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["cached"], false);
        assert_eq!(first["celebrate"], true);
        assert_eq!(first["caption"], "Select faces to highlight.");
        assert_eq!(first["options"][0], "Face 1 (Confidence: 0.90)");
        assert!(first["annotated_image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));

        let (status, second) = post_form(app, form("face_detection", "0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);
        assert_eq!(second["celebrate"], false);
        assert_eq!(second["labels"][0]["text"], "Face 1 · Confidence: 0.90");
        assert_eq!(second["labels"][0]["color"], "red");
        assert_eq!(state.vision.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_selection_is_rejected() {
        let (_, app) = app();
        let (status, body) = post_form(app, form("face_detection", "5")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("out of range"));
    }

    #[tokio::test]
    async fn test_failed_render_keeps_celebration_for_next_request() {
        let (state, app) = app();

        let (status, _) = post_form(app.clone(), form("face_detection", "5")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_form(app.clone(), form("face_detection", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached"], true);
        assert_eq!(body["celebrate"], true);

        let (_, body) = post_form(app, form("face_detection", "0")).await;
        assert_eq!(body["celebrate"], false);
        assert_eq!(state.vision.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_analysis_type_is_rejected() {
        let (state, app) = app();
        let (status, _) = post_form(app, form("segmentation", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.vision.calls.load(Ordering::SeqCst), 0);
    }
}
