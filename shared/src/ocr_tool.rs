//! Standalone PDF-to-text page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::ocr::{OcrJob, OcrPurpose};
use crate::error::ApiError;
use crate::model::UploadedFile;

pub const ONLY_PDF: &str = "Only PDF files are supported for OCR.";
pub const NO_PDF: &str = "Please upload a PDF file first.";
pub const EXTRACTION_FAILED: &str = "Failed to extract text from PDF. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrTool {
    pub files: Vec<UploadedFile>,
    pub loading: bool,
    pub error: Option<String>,
    pub text: Option<String>,
    /// Extraction whose result is still wanted.
    pub pending: Option<String>,
}

impl OcrTool {
    /// Replaces the selection with the PDFs among `files`.
    pub fn choose(&mut self, files: Vec<UploadedFile>) {
        let offered = files.len();
        self.files = files.into_iter().filter(UploadedFile::is_pdf).collect();
        self.error = (self.files.len() < offered).then(|| ONLY_PDF.to_string());
        self.text = None;
        self.loading = false;
        self.pending = None;
    }

    pub fn begin_extract(&mut self) -> Option<OcrJob> {
        if self.loading {
            return None;
        }
        let Some(file) = self.files.first() else {
            self.error = Some(NO_PDF.to_string());
            return None;
        };
        let request_id = Uuid::new_v4().to_string();
        let job = OcrJob {
            purpose: OcrPurpose::Tool {
                request_id: request_id.clone(),
            },
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes: file.bytes.clone(),
        };
        self.loading = true;
        self.pending = Some(request_id);
        self.error = None;
        self.text = None;
        Some(job)
    }

    /// Returns false when the files were replaced after the request went out.
    pub fn completed(&mut self, request_id: &str, result: Result<String, ApiError>) -> bool {
        if self.pending.as_deref() != Some(request_id) {
            return false;
        }
        self.loading = false;
        self.pending = None;
        match result {
            Ok(text) => self.text = Some(text),
            Err(_) => self.error = Some(EXTRACTION_FAILED.to_string()),
        }
        true
    }
}
