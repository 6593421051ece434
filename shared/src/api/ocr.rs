use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Gateway;
use crate::capabilities::read_json;
use crate::error::ApiError;
use crate::event::Event;

pub const FILE_FIELD: &str = "file";
pub const OCR_UNSUCCESSFUL: &str = "OCR service could not extract text";

/// Where extracted text goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OcrPurpose {
    Intake { attachment_id: String },
    Tool { request_id: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct OcrJob {
    pub purpose: OcrPurpose,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for OcrJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrJob")
            .field("purpose", &self.purpose)
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub text: String,
}

impl OcrResponse {
    pub fn into_text(self) -> Result<String, ApiError> {
        if self.success {
            Ok(self.text)
        } else {
            Err(ApiError::Rejected(OCR_UNSUCCESSFUL.to_string()))
        }
    }
}

/// A `multipart/form-data` body carrying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn single_file(field: &str, file_name: &str, mime_type: &str, contents: &[u8]) -> Self {
        let boundary = format!("----tender-{}", Uuid::new_v4().simple());
        let mime_type = if mime_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };

        let mut bytes = Vec::with_capacity(contents.len() + 256);
        bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                quote(field),
                quote(file_name)
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(format!("Content-Type: {}\r\n\r\n", quote(mime_type)).as_bytes());
        bytes.extend_from_slice(contents);
        bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Self { boundary, bytes }
    }

    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

impl Gateway<'_> {
    pub fn extract_text(&self, job: OcrJob) {
        let url = self.endpoints.api.endpoint(&["api", "ocr", "extract"]);
        let body = MultipartBody::single_file(FILE_FIELD, &job.file_name, &job.mime_type, &job.bytes);
        let purpose = job.purpose;
        self.post(&url)
            .header("Content-Type", body.content_type().as_str())
            .body_bytes(body.bytes)
            .send(move |result| Event::OcrCompleted {
                purpose,
                result: read_json::<OcrResponse>(result).and_then(OcrResponse::into_text),
            });
    }
}

// Header parameters cannot carry quotes or line breaks.
fn quote(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_layout() {
        let body = MultipartBody::single_file("file", "brief.pdf", "application/pdf", b"%PDF-1.7");
        let text = String::from_utf8(body.bytes.clone()).unwrap();

        assert!(text.starts_with(&format!("--{}\r\n", body.boundary)));
        assert!(text.contains(
            "Content-Disposition: form-data; name=\"file\"; filename=\"brief.pdf\"\r\n"
        ));
        assert!(text.contains("Content-Type: application/pdf\r\n\r\n%PDF-1.7\r\n"));
        assert!(text.ends_with(&format!("--{}--\r\n", body.boundary)));
        assert_eq!(
            body.content_type(),
            format!("multipart/form-data; boundary={}", body.boundary)
        );
    }

    #[test]
    fn test_multipart_sanitizes_filename() {
        let body = MultipartBody::single_file("file", "a\"b\r\n.pdf", "", b"x");
        let text = String::from_utf8(body.bytes).unwrap();
        assert!(text.contains("filename=\"a'b.pdf\""));
        assert!(text.contains("Content-Type: application/octet-stream"));
    }

    #[test]
    fn test_unsuccessful_ocr_is_error() {
        let response: OcrResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(response.into_text(), Err(ApiError::Rejected(_))));

        let response: OcrResponse =
            serde_json::from_str(r#"{"success": true, "text": "WHEREAS"}"#).unwrap();
        assert_eq!(response.into_text().unwrap(), "WHEREAS");
    }
}
