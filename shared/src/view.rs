//! Everything the shell renders, computed from the model.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::cases::CaseForm;
use crate::error::AppError;
use crate::history::{TaskFilter, TaskRecord, TaskStatus};
use crate::inbox::SummaryState;
use crate::intake::{Attachment, Decision, Intake, OcrStatus};
use crate::model::{AnalysisResult, CaseRecord, EmailMessage, Model, Page, UploadedFile, User};
use crate::session::AuthPhase;

pub const SUBMIT_LABEL: &str = "Submit for Analysis";
pub const ANALYZING_LABEL: &str = "Analyzing...";
pub const PROCESSING_PDF_LABEL: &str = "Processing PDF...";
pub const EMAIL_PREVIEW_CHARS: usize = 60;
const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
const SHORT_DATE_FORMAT: &str = "%b %-d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    None,
}

impl ConfidenceBand {
    #[must_use]
    pub fn from_score(confidence: Option<f64>) -> Self {
        match confidence {
            None => Self::None,
            Some(c) if c == 0.0 || c.is_nan() => Self::None,
            Some(c) if c >= 0.9 => Self::High,
            Some(c) if c >= 0.7 => Self::Medium,
            Some(_) => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistKind {
    RecordsWrangler,
    ClientCommunicationGuru,
    LegalResearcher,
    VoiceBotScheduler,
    EvidenceSorter,
    Other,
}

impl SpecialistKind {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Records Wrangler" => Self::RecordsWrangler,
            "Client Communication Guru" => Self::ClientCommunicationGuru,
            "Legal Researcher" => Self::LegalResearcher,
            "Voice Bot Scheduler" => Self::VoiceBotScheduler,
            "Evidence Sorter" => Self::EvidenceSorter,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Document,
    Text,
    Image,
    Other,
}

impl FileKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" | "odt" | "rtf" => Self::Document,
            "txt" | "md" | "eml" | "csv" => Self::Text,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "tif" | "tiff" => Self::Image,
            _ => Self::Other,
        }
    }
}

/// `0.89` → `89%`. Missing or zero scores read `0%`.
#[must_use]
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c.is_finite() && c != 0.0 => {
            #[allow(clippy::cast_possible_truncation)]
            let percent = (c * 100.0).round() as i64;
            format!("{percent}%")
        }
        _ => "0%".to_string(),
    }
}

#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}

/// Parses RFC 3339 and RFC 2822 (mail header) timestamps.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
}

/// `Oct 20, 2025, 02:30 PM`. Unparseable input is shown as it came.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw).map_or_else(|| raw.to_string(), |t| format_datetime(&t))
}

#[must_use]
pub fn format_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthView {
    pub phase: AuthPhase,
    pub user: Option<User>,
    pub error: Option<String>,
    pub logging_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeView {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentView {
    pub name: String,
    pub size_label: String,
    pub kind: FileKind,
    pub ocr: OcrStatus,
}

impl From<&Attachment> for AttachmentView {
    fn from(a: &Attachment) -> Self {
        Self {
            name: a.name.clone(),
            size_label: format_file_size(a.size),
            kind: FileKind::from_name(&a.name),
            ocr: a.ocr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeView {
    pub text: String,
    pub attachments: Vec<AttachmentView>,
    pub analyzing: bool,
    pub processing_pdf: bool,
    pub can_submit: bool,
    pub submit_label: String,
    pub error: Option<String>,
}

impl From<&Intake> for IntakeView {
    fn from(intake: &Intake) -> Self {
        let analyzing = intake.is_analyzing();
        let processing_pdf = intake.ocr_in_flight();
        let submit_label = if analyzing {
            ANALYZING_LABEL
        } else if processing_pdf {
            PROCESSING_PDF_LABEL
        } else {
            SUBMIT_LABEL
        };
        Self {
            text: intake.text.clone(),
            attachments: intake.attachments.iter().map(AttachmentView::from).collect(),
            analyzing,
            processing_pdf,
            can_submit: intake.can_submit(),
            submit_label: submit_label.to_string(),
            error: intake.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisView {
    pub task_detected: bool,
    pub task_description: String,
    pub confidence: Option<f64>,
    pub confidence_label: String,
    pub confidence_band: ConfidenceBand,
    pub specialist: Option<String>,
    pub specialist_kind: SpecialistKind,
}

impl From<&AnalysisResult> for AnalysisView {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            task_detected: result.task_detected,
            task_description: result.task_description.clone().unwrap_or_default(),
            confidence: result.confidence,
            confidence_label: format_confidence(result.confidence),
            confidence_band: ConfidenceBand::from_score(result.confidence),
            specialist: result.specialist.clone(),
            specialist_kind: result
                .specialist
                .as_deref()
                .map_or(SpecialistKind::Other, SpecialistKind::from_label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFormView {
    pub open: bool,
    pub name: String,
    pub number: String,
    pub summary: String,
    pub client_name: String,
    pub client_email: String,
    pub submitting: bool,
    pub can_submit: bool,
    pub error: Option<NoticeView>,
}

impl From<&AppError> for NoticeView {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.user_facing_message(),
        }
    }
}

impl From<&CaseForm> for CaseFormView {
    fn from(form: &CaseForm) -> Self {
        Self {
            open: form.open,
            name: form.name.clone(),
            number: form.number.clone(),
            summary: form.summary.clone(),
            client_name: form.client_name.clone(),
            client_email: form.client_email.clone(),
            submitting: form.submitting,
            can_submit: !form.submitting && form.validate().is_ok(),
            error: form.error.as_ref().map(NoticeView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseItemView {
    pub id: String,
    pub display_name: String,
    pub summary: String,
    pub client_name: String,
    pub client_email: String,
    pub created_label: Option<String>,
}

impl From<&CaseRecord> for CaseItemView {
    fn from(case: &CaseRecord) -> Self {
        Self {
            id: case.id.clone(),
            display_name: case.display_name(),
            summary: case.summary.clone(),
            client_name: case.client_name.clone(),
            client_email: case.client_email.clone(),
            created_label: case.created_at.as_deref().map(format_timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasesView {
    pub items: Vec<CaseItemView>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<CaseItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailItemView {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub preview: String,
    pub date_label: Option<String>,
    pub short_date: Option<String>,
    pub read: bool,
}

impl From<&EmailMessage> for EmailItemView {
    fn from(email: &EmailMessage) -> Self {
        let parsed = email.received_at.as_deref().and_then(parse_timestamp);
        Self {
            id: email.id.clone(),
            subject: email.subject.clone(),
            sender: email.sender.clone(),
            recipient: email.recipient.clone(),
            body: email.body.clone(),
            preview: preview(&email.body),
            date_label: email.received_at.as_deref().map(format_timestamp),
            short_date: parsed.map(|t| t.format(SHORT_DATE_FORMAT).to_string()),
            read: email.read,
        }
    }
}

fn preview(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(EMAIL_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxView {
    pub selected_case_id: Option<String>,
    pub emails: Vec<EmailItemView>,
    pub unread_count: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_email: Option<EmailItemView>,
    pub summary: SummaryState,
    pub can_summarize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: String,
    pub description: String,
    pub specialist: String,
    pub specialist_kind: SpecialistKind,
    pub timestamp_label: String,
    pub status: TaskStatus,
}

impl From<&TaskRecord> for TaskView {
    fn from(task: &TaskRecord) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            specialist: task.specialist.clone(),
            specialist_kind: SpecialistKind::from_label(&task.specialist),
            timestamp_label: format_datetime(&task.timestamp),
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub filter: TaskFilter,
    pub tasks: Vec<TaskView>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileView {
    pub name: String,
    pub size_label: String,
}

impl From<&UploadedFile> for FileView {
    fn from(file: &UploadedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_label: format_file_size(file.size()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrToolView {
    pub files: Vec<FileView>,
    pub loading: bool,
    pub can_extract: bool,
    pub error: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub auth: AuthView,
    pub page: Page,
    pub alert: Option<NoticeView>,
    pub notice: Option<NoticeView>,
    pub config_error: Option<String>,
    pub redirect_to: Option<String>,
    pub intake: IntakeView,
    pub analysis: Option<AnalysisView>,
    pub last_decision: Option<Decision>,
    pub case_form: CaseFormView,
    pub cases: CasesView,
    pub inbox: InboxView,
    pub history: HistoryView,
    pub ocr_tool: OcrToolView,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let session = &model.session;
        let inbox = &model.inbox;

        Self {
            auth: AuthView {
                phase: session.phase(),
                user: session.user().cloned(),
                error: session.error().map(str::to_string),
                logging_out: session.is_logging_out(),
            },
            page: model.page,
            alert: model.alert.as_ref().map(NoticeView::from),
            notice: model.notice.as_ref().map(NoticeView::from),
            config_error: model.config_error.as_ref().map(ToString::to_string),
            redirect_to: model.redirect_to.clone(),
            intake: IntakeView::from(&model.intake),
            analysis: model.intake.result().map(AnalysisView::from),
            last_decision: model.intake.last_decision,
            case_form: CaseFormView::from(&model.case_form),
            cases: CasesView {
                items: model.cases.cases.iter().map(CaseItemView::from).collect(),
                loading: model.cases.loading,
                error: model.cases.error.clone(),
                selected: model.cases.selected.as_ref().map(CaseItemView::from),
            },
            inbox: InboxView {
                selected_case_id: inbox.selected_case_id.clone(),
                emails: inbox.emails.iter().map(EmailItemView::from).collect(),
                unread_count: inbox.emails.iter().filter(|e| !e.read).count(),
                loading: inbox.loading,
                error: inbox.error.clone(),
                selected_email: inbox.selected_email().map(EmailItemView::from),
                summary: inbox.summary.clone(),
                can_summarize: inbox.selected_email().is_some() && !inbox.summary.loading,
            },
            history: HistoryView {
                filter: model.history.filter,
                tasks: model.history.visible().into_iter().map(TaskView::from).collect(),
                total: model.history.len(),
            },
            ocr_tool: OcrToolView {
                files: model.ocr_tool.files.iter().map(FileView::from).collect(),
                loading: model.ocr_tool.loading,
                can_extract: !model.ocr_tool.files.is_empty() && !model.ocr_tool.loading,
                error: model.ocr_tool.error.clone(),
                text: model.ocr_tool.text.clone(),
            },
        }
    }
}
