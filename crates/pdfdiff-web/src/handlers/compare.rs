use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use pdfdiff_core::{ComparisonResult, Granularity};
use pdfdiff_reporting::{ExportFormat, ReportMeta};

use super::ApiError;
use crate::models::{CompareResponse, ErrorResponse};
use crate::state::AppState;
use crate::template;
use crate::upload;

struct Comparison {
    meta: ReportMeta,
    granularity: Granularity,
    result: ComparisonResult,
}

/// `POST /compare`: the side-by-side HTML report.
pub async fn compare_html(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let rendered = run_comparison(state, multipart).await.and_then(|c| {
        pdfdiff_reporting::render(&c.result, &c.meta, ExportFormat::Html)
            .map_err(|e| ApiError::internal(e.to_string()))
    });

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => (e.status, template::render_error(&e.message)).into_response(),
    }
}

/// `POST /compare/pdf`: the report laid out as a PDF download.
pub async fn compare_pdf(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let rendered = match run_comparison(state, multipart).await {
        Ok(c) => render_pdf(c).await,
        Err(e) => Err(e),
    };

    match rendered {
        Ok((filename, bytes)) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => (e.status, template::render_error(&e.message)).into_response(),
    }
}

/// `POST /api/compare`: the comparison as JSON.
pub async fn compare_json(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match run_comparison(state, multipart).await {
        Ok(c) => Json(CompareResponse::new(&c.meta, c.granularity, c.result)).into_response(),
        Err(e) => (
            e.status,
            Json(ErrorResponse {
                error: e.message,
                side: e.side,
            }),
        )
            .into_response(),
    }
}

async fn render_pdf(c: Comparison) -> Result<(String, Vec<u8>), ApiError> {
    let filename = pdfdiff_reporting::default_filename(ExportFormat::Pdf, &c.meta.generated_at);

    // PDF layout is blocking (MuPDF)
    let bytes = tokio::task::spawn_blocking(move || {
        pdfdiff_reporting::render_bytes(&c.result, &c.meta, ExportFormat::Pdf)
    })
    .await
    .map_err(|e| ApiError::internal(format!("PDF rendering task failed: {}", e)))?
    .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(%filename, bytes = bytes.len(), "rendered PDF report");
    Ok((filename, bytes))
}

async fn run_comparison(
    state: Arc<AppState>,
    multipart: Multipart,
) -> Result<Comparison, ApiError> {
    let fields = upload::parse_multipart(multipart)
        .await
        .map_err(ApiError::bad_request)?;

    let mut config = state.config.clone();
    if let Some(g) = fields.granularity {
        config.segmentation.granularity = g;
    }
    let granularity = config.segmentation.granularity;
    let meta = ReportMeta::new(fields.first.filename.clone(), fields.second.filename.clone());

    // Extraction is blocking (MuPDF)
    let result = tokio::task::spawn_blocking(move || {
        pdfdiff_ingest::compare_bytes(
            (fields.first.filename.as_str(), fields.first.data.as_slice()),
            (fields.second.filename.as_str(), fields.second.data.as_slice()),
            &config,
        )
    })
    .await
    .map_err(|e| ApiError::internal(format!("Comparison task failed: {}", e)))?;

    let result = result.inspect_err(|e| {
        tracing::warn!(error = %e, "comparison failed");
    })?;

    tracing::info!(
        first = %meta.first_name,
        second = %meta.second_name,
        %granularity,
        added = result.summary.added,
        removed = result.summary.removed,
        modified = result.summary.modified,
        "compared documents"
    );

    Ok(Comparison {
        meta,
        granularity,
        result,
    })
}
