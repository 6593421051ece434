use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cases::{CaseDirectory, CaseForm};
use crate::config::{AppConfig, ConfigError, Endpoints};
use crate::error::AppError;
use crate::history::TaskHistory;
use crate::inbox::Inbox;
use crate::intake::Intake;
use crate::ocr_tool::OcrTool;
use crate::session::Session;

pub const MAX_SESSION_BASE: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", alias = "sub")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// A case as the case backend stores it. Field aliases cover both the
/// create-form names and the list/detail names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "case_name")]
    pub name: String,
    #[serde(default, alias = "caseNumber")]
    pub case_number: Option<String>,
    #[serde(default, alias = "case_summary")]
    pub summary: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl CaseRecord {
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.case_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => format!("{} ({number})", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub received_at: Option<String>,
    pub read: bool,
    pub case_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub task_detected: bool,
    pub task_description: Option<String>,
    pub confidence: Option<f64>,
    pub specialist: Option<String>,
    pub id: Option<String>,
}

/// File handed over by the shell. Bytes are only kept as long as OCR needs them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(crate::PDF_MIME_TYPE)
            || self.name.to_ascii_lowercase().ends_with(".pdf")
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    History,
    Email,
    Ocr,
}

/// Hands out AI agent session ids: a random base drawn once per launch,
/// incremented for every new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIds {
    next: u64,
}

impl SessionIds {
    #[must_use]
    pub fn starting_at(base: u64) -> Self {
        Self { next: base }
    }

    #[must_use]
    pub fn random() -> Self {
        Self::starting_at(rand::thread_rng().gen_range(0..MAX_SESSION_BASE))
    }

    pub fn allocate(&mut self) -> String {
        let id = format!("s_{}", self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    #[must_use]
    pub fn peek(&self) -> String {
        format!("s_{}", self.next)
    }
}

impl Default for SessionIds {
    fn default() -> Self {
        Self::random()
    }
}

pub struct Model {
    pub endpoints: Option<Endpoints>,
    pub config_error: Option<ConfigError>,
    pub page: Page,
    pub session: Session,
    pub intake: Intake,
    pub case_form: CaseForm,
    pub cases: CaseDirectory,
    pub inbox: Inbox,
    pub history: TaskHistory,
    pub ocr_tool: OcrTool,
    pub session_ids: SessionIds,
    pub alert: Option<AppError>,
    pub notice: Option<AppError>,
    pub redirect_to: Option<String>,
}

impl Default for Model {
    fn default() -> Self {
        let mut model = Self {
            endpoints: None,
            config_error: None,
            page: Page::default(),
            session: Session::default(),
            intake: Intake::default(),
            case_form: CaseForm::default(),
            cases: CaseDirectory::default(),
            inbox: Inbox::default(),
            history: TaskHistory::default(),
            ocr_tool: OcrTool::default(),
            session_ids: SessionIds::default(),
            alert: None,
            notice: None,
            redirect_to: None,
        };
        model.apply_config(&AppConfig::default());
        model
    }
}

impl Model {
    pub fn apply_config(&mut self, config: &AppConfig) {
        match config.validate() {
            Ok(endpoints) => {
                self.endpoints = Some(endpoints);
                self.config_error = None;
            }
            Err(e) => {
                self.endpoints = None;
                self.config_error = Some(e);
            }
        }
    }

    /// Drops everything that belongs to the signed-in user.
    pub fn clear_user_state(&mut self) {
        self.page = Page::Home;
        self.intake = Intake::default();
        self.case_form = CaseForm::default();
        self.cases = CaseDirectory::default();
        self.inbox = Inbox::default();
        self.history = TaskHistory::default();
        self.ocr_tool = OcrTool::default();
        self.alert = None;
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_increment() {
        let mut ids = SessionIds::starting_at(41);
        assert_eq!(ids.allocate(), "s_41");
        assert_eq!(ids.allocate(), "s_42");
        assert_eq!(ids.peek(), "s_43");
    }

    #[test]
    fn test_random_base_in_range() {
        for _ in 0..50 {
            let ids = SessionIds::random();
            let n: u64 = ids.peek().trim_start_matches("s_").parse().unwrap();
            assert!(n < MAX_SESSION_BASE);
        }
    }

    #[test]
    fn test_case_display_name() {
        let mut case = CaseRecord {
            id: "case-2".into(),
            name: "Smith v. Davidson".into(),
            case_number: Some("SD-2025-042".into()),
            summary: String::new(),
            client_name: String::new(),
            client_email: String::new(),
            created_at: None,
        };
        assert_eq!(case.display_name(), "Smith v. Davidson (SD-2025-042)");
        case.case_number = Some("  ".into());
        assert_eq!(case.display_name(), "Smith v. Davidson");
    }

    #[test]
    fn test_case_record_accepts_backend_field_names() {
        let json = r#"{
            "_id": "65f0",
            "case_name": "Westfield Property Acquisition",
            "case_summary": "Commercial real estate purchase",
            "client_name": "Westfield Corp",
            "client_email": "legal@westfield.example",
            "createdAt": "2025-10-05T00:00:00Z"
        }"#;
        let case: CaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(case.id, "65f0");
        assert_eq!(case.name, "Westfield Property Acquisition");
        assert_eq!(case.case_number, None);
        assert_eq!(case.created_at.as_deref(), Some("2025-10-05T00:00:00Z"));
    }

    #[test]
    fn test_user_accepts_mongo_id() {
        let user: User =
            serde_json::from_str(r#"{"_id": "u1", "name": "Ada", "email": "ada@firm.example"}"#)
                .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.picture, None);
    }

    #[test]
    fn test_pdf_detection() {
        let pdf = UploadedFile {
            name: "scan.bin".into(),
            mime_type: "application/pdf".into(),
            bytes: vec![1],
        };
        let by_name = UploadedFile {
            name: "Contract.PDF".into(),
            mime_type: String::new(),
            bytes: vec![],
        };
        let doc = UploadedFile {
            name: "notes.docx".into(),
            mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                .into(),
            bytes: vec![],
        };
        assert!(pdf.is_pdf());
        assert!(by_name.is_pdf());
        assert!(!doc.is_pdf());
    }
}
