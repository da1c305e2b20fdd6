use serde::Serialize;

use pdfdiff_core::{
    ChangeEntry, ClassifiedSegment, ComparisonResult, DocumentSide, Granularity, Summary,
};
use pdfdiff_reporting::ReportMeta;

/// JSON body of a successful `/api/compare`.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub first_document: String,
    pub second_document: String,
    pub granularity: Granularity,
    pub identical: bool,
    pub summary: Summary,
    pub changes: Vec<ChangeEntry>,
    pub segments: Vec<ClassifiedSegment>,
}

impl CompareResponse {
    pub fn new(meta: &ReportMeta, granularity: Granularity, result: ComparisonResult) -> Self {
        let changes = pdfdiff_core::changes(&result);
        Self {
            first_document: meta.first_name.clone(),
            second_document: meta.second_name.clone(),
            granularity,
            identical: result.is_identical(),
            summary: result.summary,
            changes,
            segments: result.segments,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Which upload failed, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<DocumentSide>,
}
