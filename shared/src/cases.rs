use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::model::CaseRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CaseFormError {
    #[error("Case name is required")]
    MissingName,

    #[error("Case summary is required")]
    MissingSummary,
}

impl From<CaseFormError> for AppError {
    fn from(error: CaseFormError) -> Self {
        Self::validation(error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFormField {
    Name,
    Number,
    Summary,
    ClientName,
    ClientEmail,
}

/// Body of `POST /api/cases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCase {
    pub case_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    pub case_summary: String,
    pub client_name: String,
    pub client_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseForm {
    pub open: bool,
    pub name: String,
    pub number: String,
    pub summary: String,
    pub client_name: String,
    pub client_email: String,
    pub submitting: bool,
    pub error: Option<AppError>,
}

impl CaseForm {
    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    /// Closing also forgets what was typed.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn edit(&mut self, field: CaseFormField, value: String) {
        let slot = match field {
            CaseFormField::Name => &mut self.name,
            CaseFormField::Number => &mut self.number,
            CaseFormField::Summary => &mut self.summary,
            CaseFormField::ClientName => &mut self.client_name,
            CaseFormField::ClientEmail => &mut self.client_email,
        };
        *slot = value;
    }

    pub fn validate(&self) -> Result<NewCase, CaseFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CaseFormError::MissingName);
        }
        let summary = self.summary.trim();
        if summary.is_empty() {
            return Err(CaseFormError::MissingSummary);
        }
        let number = self.number.trim();

        Ok(NewCase {
            case_name: name.to_string(),
            case_number: (!number.is_empty()).then(|| number.to_string()),
            case_summary: summary.to_string(),
            client_name: self.client_name.trim().to_string(),
            client_email: self.client_email.trim().to_string(),
        })
    }

    /// Validates and marks the form as submitting. Errors stay on the form.
    pub fn begin_submit(&mut self) -> Option<NewCase> {
        if self.submitting {
            return None;
        }
        match self.validate() {
            Ok(case) => {
                self.submitting = true;
                self.error = None;
                Some(case)
            }
            Err(e) => {
                self.error = Some(e.into());
                None
            }
        }
    }

    pub fn submit_failed(&mut self, error: AppError) {
        self.submitting = false;
        self.error = Some(error);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDirectory {
    pub cases: Vec<CaseRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<CaseRecord>,
    /// Case whose detail was asked for last. Other replies are stale.
    pub pending_detail: Option<String>,
}

impl CaseDirectory {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn loaded(&mut self, result: Result<Vec<CaseRecord>, String>) {
        self.loading = false;
        match result {
            Ok(cases) => self.cases = cases,
            Err(message) => self.error = Some(message),
        }
    }

    pub fn request_detail(&mut self, id: &str) {
        self.pending_detail = Some(id.to_string());
        self.error = None;
    }

    #[must_use]
    pub fn is_awaiting_detail(&self, id: &str) -> bool {
        self.pending_detail.as_deref() == Some(id)
    }

    /// Returns false for a reply to a case that is no longer being opened.
    pub fn detail_loaded(&mut self, id: &str, case: CaseRecord) -> bool {
        if !self.is_awaiting_detail(id) {
            return false;
        }
        self.pending_detail = None;
        if let Some(existing) = self.cases.iter_mut().find(|c| c.id == id) {
            *existing = case.clone();
        }
        self.selected = Some(case);
        true
    }

    pub fn detail_failed(&mut self, id: &str, message: &str) -> bool {
        if !self.is_awaiting_detail(id) {
            return false;
        }
        self.pending_detail = None;
        self.error = Some(message.to_string());
        true
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CaseForm {
        let mut form = CaseForm::default();
        form.open();
        form.edit(CaseFormField::Name, "  Smith v. Davidson ".into());
        form.edit(CaseFormField::Summary, "Contract dispute".into());
        form.edit(CaseFormField::ClientName, "Jane Smith".into());
        form.edit(CaseFormField::ClientEmail, "jane@smith.example".into());
        form
    }

    #[test]
    fn test_name_and_summary_required() {
        let mut form = CaseForm::default();
        assert_eq!(form.validate(), Err(CaseFormError::MissingName));
        form.edit(CaseFormField::Name, "Estate of Brown".into());
        assert_eq!(form.validate(), Err(CaseFormError::MissingSummary));
        assert!(form.begin_submit().is_none());
        let error = form.error.as_ref().unwrap();
        assert_eq!(error.kind, crate::error::ErrorKind::Validation);
        assert_eq!(error.message, "Case summary is required");
    }

    #[test]
    fn test_validated_case_is_trimmed() {
        let case = filled().validate().unwrap();
        assert_eq!(case.case_name, "Smith v. Davidson");
        assert_eq!(case.case_number, None);

        let json = serde_json::to_value(&case).unwrap();
        assert!(json.get("case_number").is_none());
    }

    #[test]
    fn test_submit_once() {
        let mut form = filled();
        form.edit(CaseFormField::Number, "SD-2025-042".into());
        let case = form.begin_submit().unwrap();
        assert_eq!(case.case_number.as_deref(), Some("SD-2025-042"));
        assert!(form.submitting);
        assert!(form.begin_submit().is_none());

        form.submit_failed(AppError::from_api(
            "Failed to create case",
            &crate::error::ApiError::Status { status: 500 },
        ));
        assert!(!form.submitting);
        assert!(form.open);
        assert_eq!(form.name, "  Smith v. Davidson ");
    }

    #[test]
    fn test_close_resets() {
        let mut form = filled();
        form.close();
        assert_eq!(form, CaseForm::default());
    }

    #[test]
    fn test_directory_keeps_cases_on_error() {
        let mut directory = CaseDirectory::default();
        directory.begin_load();
        directory.loaded(Ok(vec![CaseRecord {
            id: "c1".into(),
            name: "Estate of Brown".into(),
            case_number: None,
            summary: String::new(),
            client_name: String::new(),
            client_email: String::new(),
            created_at: None,
        }]));
        assert!(!directory.loading);

        directory.begin_load();
        directory.loaded(Err("Failed to load cases".into()));
        assert_eq!(directory.cases.len(), 1);
        assert_eq!(directory.error.as_deref(), Some("Failed to load cases"));
        assert!(directory.find("c1").is_some());
    }

    fn record(id: &str) -> CaseRecord {
        CaseRecord {
            id: id.into(),
            name: format!("Case {id}"),
            case_number: None,
            summary: String::new(),
            client_name: String::new(),
            client_email: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_only_latest_detail_applies() {
        let mut directory = CaseDirectory::default();
        assert!(!directory.detail_loaded("c1", record("c1")));

        directory.request_detail("c1");
        directory.request_detail("c2");
        assert!(!directory.detail_loaded("c1", record("c1")));
        assert!(!directory.detail_failed("c1", "Failed to load case"));
        assert_eq!(directory.selected, None);
        assert_eq!(directory.error, None);

        assert!(directory.detail_loaded("c2", record("c2")));
        assert_eq!(directory.selected.as_ref().map(|c| c.id.as_str()), Some("c2"));
        assert!(!directory.detail_loaded("c2", record("c2")));
    }
}
