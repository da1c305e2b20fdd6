use axum::response::Html;

use pdfdiff_core::Granularity;

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Render the upload page with the granularity options and upload limit.
pub fn render_index(default: Granularity, max_upload_mb: usize) -> Html<String> {
    let options: String = Granularity::all()
        .iter()
        .map(|g| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                g.as_str(),
                if *g == default { " selected" } else { "" },
                capitalize(g.as_str()),
            )
        })
        .collect();

    let html = INDEX_HTML
        .replace("{{ granularity_options }}", &options)
        .replace("{{ max_upload_mb }}", &max_upload_mb.to_string());
    Html(html)
}

/// Minimal page shown when an HTML comparison fails.
pub fn render_error(message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"UTF-8\"><title>Comparison failed</title></head>\n\
         <body style=\"font-family: sans-serif; padding: 2rem\">\n\
         <h1>Comparison failed</h1>\n<p style=\"background:#ffcccc;padding:1rem;border-radius:8px\">{}</p>\n\
         <p><a href=\"/\">Back</a></p>\n</body>\n</html>\n",
        html_escape(message)
    ))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
