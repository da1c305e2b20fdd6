use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

mod handlers;
mod models;
mod state;
mod template;
mod upload;

use state::AppState;

const DEFAULT_BIND: &str = "0.0.0.0:5001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let file_config = pdfdiff_core::config_file::load_config();
    let env_granularity = std::env::var(pdfdiff_core::config_file::GRANULARITY_ENV).ok();
    let state = Arc::new(AppState::from_config_file(
        &file_config,
        env_granularity.as_deref(),
    ));

    let bind = std::env::var("PDFDIFF_BIND")
        .ok()
        .or_else(|| file_config.bind_address().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind))?;

    tracing::info!(
        granularity = %state.config.segmentation.granularity,
        max_upload_mb = state.max_upload_mb(),
        "starting server"
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/compare", post(handlers::compare::compare_html))
        .route("/compare/pdf", post(handlers::compare::compare_pdf))
        .route("/api/compare", post(handlers::compare::compare_json))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pdfdiff_core::Config;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pdfdiff-test-boundary";

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            config: Config::default(),
            max_upload_bytes: 1024 * 1024,
        })
    }

    /// `(field, filename, content)`; `filename: None` makes a plain text field.
    fn multipart_bytes(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, filename, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let disposition = match filename {
                Some(name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    field, name
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let parts: Vec<(&str, Option<&str>, &[u8])> = parts
            .iter()
            .map(|(field, filename, content)| (*field, *filename, content.as_bytes()))
            .collect();
        multipart_bytes(&parts)
    }

    async fn send(uri: &str, body: Vec<u8>) -> axum::response::Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        router(test_state()).oneshot(request).await.unwrap()
    }

    async fn post(uri: &str, body: Vec<u8>) -> (StatusCode, String) {
        let response = send(uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn two_versions() -> Vec<u8> {
        multipart_body(&[
            ("pdf1", Some("draft.txt"), "Hello world\n\nLine two\n"),
            ("pdf2", Some("final.txt"), "Hello world\n\nLine 2\n\nAppendix\n"),
        ])
    }

    #[tokio::test]
    async fn index_serves_upload_form() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("name=\"pdf1\""));
        assert!(html.contains("name=\"pdf2\""));
        assert!(html.contains("<option value=\"paragraph\" selected>Paragraph</option>"));
        assert!(html.contains("limited to 1 MB"));
        assert!(html.contains("formaction=\"/compare/pdf\""));
    }

    #[tokio::test]
    async fn api_compare_returns_classification() {
        let (status, body) = post("/api/compare", two_versions()).await;
        assert_eq!(status, StatusCode::OK);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["first_document"], "draft.txt");
        assert_eq!(v["granularity"], "paragraph");
        assert_eq!(v["identical"], false);
        assert_eq!(v["summary"]["modified"], 1);
        assert_eq!(v["summary"]["added"], 1);
        assert_eq!(v["summary"]["unchanged"], 1);
        assert_eq!(v["segments"][1]["type"], "modified");
        assert_eq!(v["changes"][1]["new_anchor"], "new-addition-1");
    }

    #[tokio::test]
    async fn api_compare_honours_granularity_field() {
        let body = multipart_body(&[
            ("pdf1", Some("a.txt"), "One. Two."),
            ("pdf2", Some("b.txt"), "One. Three."),
            ("granularity", None, "sentence"),
        ]);
        let (status, body) = post("/api/compare", body).await;
        assert_eq!(status, StatusCode::OK);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["granularity"], "sentence");
        assert_eq!(v["summary"]["unchanged"], 1);
        assert_eq!(v["summary"]["modified"], 1);
    }

    #[tokio::test]
    async fn api_compare_rejects_unknown_granularity() {
        let body = multipart_body(&[
            ("pdf1", Some("a.txt"), "x"),
            ("pdf2", Some("b.txt"), "y"),
            ("granularity", None, "word"),
        ]);
        let (status, _) = post("/api/compare", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_compare_requires_both_files() {
        let body = multipart_body(&[("pdf1", Some("a.txt"), "only one")]);
        let (status, body) = post("/api/compare", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(v["error"].as_str().unwrap().contains("second"));
    }

    #[tokio::test]
    async fn api_compare_names_invalid_pdf() {
        let body = multipart_body(&[
            ("pdf1", Some("a.txt"), "fine"),
            ("pdf2", Some("scan.pdf"), "not really a pdf"),
        ]);
        let (status, body) = post("/api/compare", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(v["error"].as_str().unwrap().contains("scan.pdf"));
    }

    #[tokio::test]
    async fn api_compare_unreadable_document_is_unprocessable() {
        let body = multipart_bytes(&[
            ("pdf1", Some("a.txt"), &b"fine"[..]),
            ("pdf2", Some("b.txt"), &b"not \xff utf-8"[..]),
        ]);
        let (status, body) = post("/api/compare", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["side"], "second");
        let error = v["error"].as_str().unwrap();
        assert!(error.starts_with("second document: b.txt: "));
    }

    #[tokio::test]
    async fn upload_errors_carry_no_side() {
        let body = multipart_body(&[("pdf1", Some("a.txt"), "only one")]);
        let (_, body) = post("/api/compare", body).await;
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(v.get("side").is_none());
    }

    #[tokio::test]
    async fn compare_pdf_downloads_report() {
        let response = send("/compare/pdf", two_versions()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"comparison_report_"));
        assert!(disposition.ends_with(".pdf\""));

        let bytes = to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn compare_pdf_errors_render_html() {
        let body = multipart_body(&[("pdf2", Some("b.txt"), "y")]);
        let (status, html) = post("/compare/pdf", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("Please upload the first PDF document"));
    }

    #[tokio::test]
    async fn compare_renders_html_report() {
        let (status, html) = post("/compare", two_versions()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("id=\"old-modification-1\""));
        assert!(html.contains("id=\"new-addition-1\""));
        assert!(html.contains("[Content only in second document]"));
    }

    #[tokio::test]
    async fn compare_error_page_is_escaped() {
        let body = multipart_body(&[
            ("pdf1", Some("<b>.pdf"), "nope"),
            ("pdf2", Some("b.txt"), "y"),
        ]);
        let (status, html) = post("/compare", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("Comparison failed"));
        assert!(html.contains("&lt;b&gt;.pdf"));
    }
}
