use crate::errors::AppError;
use crate::state::{Analysis, AppState};
use annotator::encode_jpeg;
use axum::Json;
use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use schema::{BoxRecord, CountSummary};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub fn app(state: AppState) -> Router {
    let output_dir = state.paths.output_dir.clone();
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/download-report", get(download_report))
        .nest_service("/static/output", ServeDir::new(output_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub counts: CountSummary,
    pub boxes: Vec<BoxRecord>,
    pub image: String,
}

/// `POST /predict`: run the uploaded image through the detector, annotate
/// it, and replace the process-wide latest analysis.
async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, AppError> {
    let mut image_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read image field: {e}")))?;
            image_bytes = Some(data);
            break;
        }
    }

    let image_bytes =
        image_bytes.ok_or_else(|| AppError::BadRequest("no `image` field in request".into()))?;

    let mut image = image::load_from_memory(&image_bytes)?.to_rgb8();

    let detections = {
        let mut detector = state.detector.lock().await;
        detector.detect(&image)?
    };

    let annotation = state.annotator.annotate(&mut image, &detections)?;
    let annotated_jpeg = encode_jpeg(&image)?;

    std::fs::write(&state.paths.processed_image, &annotated_jpeg)?;

    let analysis = Arc::new(Analysis {
        counts: annotation.counts.clone(),
        boxes: annotation.boxes.clone(),
        annotated_jpeg,
    });
    *state.latest.write().await = Some(analysis);

    tracing::info!(
        detections = detections.len(),
        total = annotation.counts.total(),
        "Prediction complete"
    );

    Ok(Json(PredictResponse {
        counts: annotation.counts,
        boxes: annotation.boxes,
        image: state.paths.processed_image.to_string_lossy().into_owned(),
    }))
}

/// `GET /download-report`: regenerate chart + PDF from the latest analysis
/// and stream the PDF as an attachment. Refused until a `/predict` call has
/// populated the state.
async fn download_report(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let analysis = state
        .latest
        .read()
        .await
        .clone()
        .ok_or(AppError::NoReportAvailable)?;

    // Stream the bytes this call rendered, not a re-read of the shared
    // output file, so a concurrent /predict cannot swap the PDF under us.
    let pdf = report::generate_report(
        &analysis.counts,
        &analysis.annotated_jpeg,
        &state.paths.chart_image,
        &state.paths.pdf_report,
    )?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"blood_report.pdf\"",
            ),
        ],
        pdf,
    ))
}
