use axum::extract::Multipart;

use pdfdiff_core::Granularity;

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed form fields from the multipart upload.
pub struct FormFields {
    pub first: UploadedFile,
    pub second: UploadedFile,
    pub granularity: Option<Granularity>,
}

/// Parse a multipart form upload into structured form fields.
///
/// Both `pdf1` and `pdf2` are required and each must look like a document
/// we can read; errors name the offending file.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FormFields, String> {
    let mut first: Option<UploadedFile> = None;
    let mut second: Option<UploadedFile> = None;
    let mut granularity: Option<Granularity> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pdf1" | "pdf2" => {
                let fallback = if name == "pdf1" { "first.pdf" } else { "second.pdf" };
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(fallback)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();

                // Browsers send an empty part when no file was chosen
                if data.is_empty() {
                    continue;
                }

                let file = UploadedFile { filename, data };
                if name == "pdf1" {
                    first = Some(file);
                } else {
                    second = Some(file);
                }
            }
            "granularity" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| format!("Failed to read granularity: {}", e))?;
                if !val.is_empty() {
                    granularity = Some(val.parse()?);
                }
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    let first = first.ok_or("Please upload the first PDF document")?;
    let second = second.ok_or("Please upload the second PDF document")?;
    validate(&first)?;
    validate(&second)?;

    Ok(FormFields {
        first,
        second,
        granularity,
    })
}

fn validate(file: &UploadedFile) -> Result<(), String> {
    pdfdiff_ingest::detect_kind(&file.filename, &file.data)
        .map(|_| ())
        .map_err(|e| format!("{}: {}", file.filename, e))
}
