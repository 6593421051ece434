//! Case-linked email browser with per-email AI summaries.

use serde::{Deserialize, Serialize};

use crate::model::EmailMessage;

pub const SUMMARY_PROMPT_PREFIX: &str = "Summarize the following email content in a concise manner, highlighting key points and action items:\n\n";
pub const SESSION_INIT_FAILED: &str = "Failed to initialize AI session";
pub const SUMMARY_FAILED: &str = "Failed to generate AI summary";
pub const EMAILS_FAILED: &str = "Failed to load emails";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryState {
    pub text: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub session_id: Option<String>,
}

/// A summary ready to go to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub email_id: String,
    pub session_id: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    pub selected_case_id: Option<String>,
    pub emails: Vec<EmailMessage>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_email_id: Option<String>,
    pub summary: SummaryState,
}

impl Inbox {
    /// Returns the case whose emails need fetching.
    pub fn select_case(&mut self, case_id: Option<String>) -> Option<String> {
        *self = Self {
            loading: case_id.is_some(),
            selected_case_id: case_id.clone(),
            ..Self::default()
        };
        case_id
    }

    /// Drops lists for a case that is no longer selected.
    pub fn emails_loaded(&mut self, case_id: &str, result: Result<Vec<EmailMessage>, String>) -> bool {
        if self.selected_case_id.as_deref() != Some(case_id) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(emails) => {
                self.emails = emails;
                self.error = None;
            }
            Err(message) => {
                self.emails.clear();
                self.error = Some(message);
            }
        }
        true
    }

    #[must_use]
    pub fn selected_email(&self) -> Option<&EmailMessage> {
        let id = self.selected_email_id.as_deref()?;
        self.emails.iter().find(|e| e.id == id)
    }

    /// Marks the email read and forgets any earlier summary.
    pub fn select_email(&mut self, email_id: &str) -> bool {
        let Some(email) = self.emails.iter_mut().find(|e| e.id == email_id) else {
            return false;
        };
        email.read = true;
        self.selected_email_id = Some(email_id.to_string());
        self.summary = SummaryState::default();
        true
    }

    pub fn begin_summary(&mut self, next_session_id: impl FnOnce() -> String) -> Option<SummaryRequest> {
        if self.summary.loading {
            return None;
        }
        let email = self.selected_email()?;
        let email_id = email.id.clone();
        let prompt = format!("{SUMMARY_PROMPT_PREFIX}{}", email.body);

        let session_id = next_session_id();
        self.summary = SummaryState {
            loading: true,
            session_id: Some(session_id.clone()),
            ..SummaryState::default()
        };
        Some(SummaryRequest {
            email_id,
            session_id,
            prompt,
        })
    }

    #[must_use]
    pub fn is_awaiting(&self, email_id: &str, session_id: &str) -> bool {
        self.summary.loading
            && self.selected_email_id.as_deref() == Some(email_id)
            && self.summary.session_id.as_deref() == Some(session_id)
    }

    pub fn summary_replied(&mut self, email_id: &str, session_id: &str, text: String) -> bool {
        if !self.is_awaiting(email_id, session_id) {
            return false;
        }
        self.summary.loading = false;
        self.summary.text = Some(text);
        true
    }

    pub fn summary_failed(&mut self, email_id: &str, session_id: &str, message: &str) -> bool {
        if !self.is_awaiting(email_id, session_id) {
            return false;
        }
        self.summary.loading = false;
        self.summary.error = Some(message.to_string());
        true
    }
}
