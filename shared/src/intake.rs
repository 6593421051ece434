//! Intake → Analysis → Approval.
//!
//! `Idle` accepts text and files. Submitting moves to `Analyzing` under a fresh
//! agent session id; the reply moves to `Resolved`, and approve or reject
//! returns to `Idle`. PDFs are sent to OCR as soon as they are attached.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::api::ocr::{OcrJob, OcrPurpose};
use crate::error::{ApiError, AppError};
use crate::model::{AnalysisResult, UploadedFile};

pub const EMPTY_SUBMISSION_ALERT: &str = "Please enter text or upload files before submitting.";
pub const ANALYSIS_FAILED_ALERT: &str = "Failed to analyze content. Please try again.";
pub const DEFAULT_SPECIALIST: &str = "Legal Researcher";
pub const MIN_PLACEHOLDER_CONFIDENCE: f64 = 0.60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("{}", EMPTY_SUBMISSION_ALERT)]
    EmptySubmission,

    #[error("an analysis is already running")]
    Busy,

    #[error("PDF text extraction is still running")]
    OcrPending,

    #[error("there is no analysis to review")]
    NothingToReview,
}

impl From<IntakeError> for AppError {
    fn from(error: IntakeError) -> Self {
        Self::validation(error.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IntakePhase {
    #[default]
    Idle,
    Analyzing {
        session_id: String,
    },
    Resolved {
        result: AnalysisResult,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrStatus {
    NotNeeded,
    Pending,
    Extracted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub ocr: OcrStatus,
}

/// What goes to the agent once a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub phase: IntakePhase,
    pub error: Option<String>,
    pub last_decision: Option<Decision>,
}

impl Intake {
    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    /// Appends the files and returns one OCR job per PDF among them.
    pub fn attach(&mut self, files: Vec<UploadedFile>) -> Vec<OcrJob> {
        let mut jobs = Vec::new();
        for file in files {
            let id = Uuid::new_v4().to_string();
            let pdf = file.is_pdf();
            self.attachments.push(Attachment {
                id: id.clone(),
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                size: file.size(),
                ocr: if pdf {
                    OcrStatus::Pending
                } else {
                    OcrStatus::NotNeeded
                },
            });
            if pdf {
                jobs.push(OcrJob {
                    purpose: OcrPurpose::Intake { attachment_id: id },
                    file_name: file.name,
                    mime_type: file.mime_type,
                    bytes: file.bytes,
                });
            }
        }
        jobs
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    /// Returns false when the attachment is gone or was not waiting on OCR.
    pub fn ocr_completed(&mut self, attachment_id: &str, result: Result<String, ApiError>) -> bool {
        let Some(attachment) = self
            .attachments
            .iter_mut()
            .find(|a| a.id == attachment_id && a.ocr == OcrStatus::Pending)
        else {
            return false;
        };

        match result {
            Ok(text) => {
                attachment.ocr = OcrStatus::Extracted;
                let extracted = text.trim();
                if !extracted.is_empty() {
                    let block = format!("--- Extracted from {} ---\n{extracted}", attachment.name);
                    if self.text.trim().is_empty() {
                        self.text = block;
                    } else {
                        self.text = format!("{}\n\n{block}", self.text.trim_end());
                    }
                }
            }
            Err(_) => {
                attachment.ocr = OcrStatus::Failed;
                self.error = Some(format!("Failed to extract text from {}", attachment.name));
            }
        }
        true
    }

    #[must_use]
    pub fn ocr_in_flight(&self) -> bool {
        self.attachments.iter().any(|a| a.ocr == OcrStatus::Pending)
    }

    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, IntakePhase::Analyzing { .. })
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.attachments.is_empty()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_analyzing() && !self.ocr_in_flight() && self.has_content()
    }

    #[must_use]
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            IntakePhase::Resolved { result } => Some(result),
            _ => None,
        }
    }

    /// Validates the form and enters `Analyzing`. The id is only drawn once
    /// the submission is accepted.
    pub fn submit(&mut self, next_session_id: impl FnOnce() -> String) -> Result<Submission, IntakeError> {
        if self.is_analyzing() {
            return Err(IntakeError::Busy);
        }
        if self.ocr_in_flight() {
            return Err(IntakeError::OcrPending);
        }
        if !self.has_content() {
            return Err(IntakeError::EmptySubmission);
        }

        let text = if self.text.trim().is_empty() {
            let names: Vec<&str> = self.attachments.iter().map(|a| a.name.as_str()).collect();
            format!("Attached files: {}", names.join(", "))
        } else {
            self.text.clone()
        };

        let session_id = next_session_id();
        self.phase = IntakePhase::Analyzing {
            session_id: session_id.clone(),
        };
        self.error = None;
        self.last_decision = None;
        Ok(Submission { session_id, text })
    }

    #[must_use]
    pub fn is_awaiting(&self, session_id: &str) -> bool {
        matches!(&self.phase, IntakePhase::Analyzing { session_id: current } if current == session_id)
    }

    /// Returns false for replies to a session that is no longer current.
    pub fn analysis_succeeded(&mut self, session_id: &str, reply: String, confidence: f64) -> bool {
        if !self.is_awaiting(session_id) {
            return false;
        }
        let task_detected = !reply.trim().is_empty();
        self.phase = IntakePhase::Resolved {
            result: AnalysisResult {
                task_detected,
                task_description: Some(reply),
                confidence: Some(confidence),
                specialist: Some(DEFAULT_SPECIALIST.to_string()),
                id: Some(session_id.to_string()),
            },
        };
        true
    }

    pub fn analysis_failed(&mut self, session_id: &str) -> bool {
        if !self.is_awaiting(session_id) {
            return false;
        }
        self.phase = IntakePhase::Idle;
        true
    }

    /// Clears the form and hands back the approved result.
    pub fn approve(&mut self) -> Result<AnalysisResult, IntakeError> {
        let IntakePhase::Resolved { result } = std::mem::take(&mut self.phase) else {
            return Err(IntakeError::NothingToReview);
        };
        self.text.clear();
        self.attachments.clear();
        self.error = None;
        self.last_decision = Some(Decision::Approved);
        Ok(result)
    }

    /// Drops the result, keeps what was typed and attached.
    pub fn reject(&mut self) -> Result<(), IntakeError> {
        if !matches!(self.phase, IntakePhase::Resolved { .. }) {
            return Err(IntakeError::NothingToReview);
        }
        self.phase = IntakePhase::Idle;
        self.last_decision = Some(Decision::Rejected);
        Ok(())
    }
}

/// Stand-in score until the agent reports one.
pub fn placeholder_confidence<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(MIN_PLACEHOLDER_CONFIDENCE..1.0)
}
