use serde::{Deserialize, Serialize};

use crate::api::agent::AgentPurpose;
use crate::api::ocr::OcrPurpose;
use crate::cases::CaseFormField;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::history::TaskFilter;
use crate::model::{CaseRecord, EmailMessage, Page, UploadedFile, User};
use crate::session::{TokenSource, VerifyTokenResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    AppStarted,
    Configure(AppConfig),
    Navigate(Page),
    DismissAlert,
    DismissNotice,
    RedirectHandled,

    LoginRequested,
    /// The shell was sent back from the OAuth provider to this URL.
    OAuthCallback {
        url: String,
    },
    LogoutRequested,

    TextChanged(String),
    FilesAdded(Vec<UploadedFile>),
    FileRemoved(usize),
    SubmitRequested,
    ApproveRequested,
    RejectRequested,

    CaseFormOpened,
    CaseFormClosed,
    CaseFormEdited {
        field: CaseFormField,
        value: String,
    },
    CaseFormSubmitted,
    CasesRefreshRequested,
    CaseSelected(String),

    InboxCaseSelected(Option<String>),
    EmailSelected(String),
    SummaryRequested,

    HistoryFilterChanged(TaskFilter),

    OcrToolFilesChosen(Vec<UploadedFile>),
    OcrToolExtractRequested,

    // Capability responses
    #[serde(skip)]
    StoredTokenLoaded(Result<Option<Vec<u8>>, String>),
    #[serde(skip)]
    TokenStored(Result<(), String>),
    #[serde(skip)]
    TokenCleared(Result<(), String>),
    #[serde(skip)]
    TokenVerified {
        source: TokenSource,
        result: Result<VerifyTokenResponse, ApiError>,
    },
    #[serde(skip)]
    UserLoaded(Result<User, ApiError>),
    #[serde(skip)]
    LoggedOut(Result<(), ApiError>),
    #[serde(skip)]
    CasesLoaded(Result<Vec<CaseRecord>, ApiError>),
    #[serde(skip)]
    CaseLoaded {
        case_id: String,
        result: Result<CaseRecord, ApiError>,
    },
    #[serde(skip)]
    CaseCreated(Result<(), ApiError>),
    #[serde(skip)]
    EmailsLoaded {
        case_id: String,
        result: Result<Vec<EmailMessage>, ApiError>,
    },
    #[serde(skip)]
    OcrCompleted {
        purpose: OcrPurpose,
        result: Result<String, ApiError>,
    },
    #[serde(skip)]
    AgentSessionCreated {
        purpose: AgentPurpose,
        session_id: String,
        text: String,
        result: Result<(), ApiError>,
    },
    #[serde(skip)]
    AgentReplied {
        purpose: AgentPurpose,
        session_id: String,
        result: Result<String, ApiError>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::Navigate(_) => "navigate",
            Self::DismissAlert => "dismiss_alert",
            Self::DismissNotice => "dismiss_notice",
            Self::RedirectHandled => "redirect_handled",
            Self::LoginRequested => "login_requested",
            Self::OAuthCallback { .. } => "oauth_callback",
            Self::LogoutRequested => "logout_requested",
            Self::TextChanged(_) => "text_changed",
            Self::FilesAdded(_) => "files_added",
            Self::FileRemoved(_) => "file_removed",
            Self::SubmitRequested => "submit_requested",
            Self::ApproveRequested => "approve_requested",
            Self::RejectRequested => "reject_requested",
            Self::CaseFormOpened => "case_form_opened",
            Self::CaseFormClosed => "case_form_closed",
            Self::CaseFormEdited { .. } => "case_form_edited",
            Self::CaseFormSubmitted => "case_form_submitted",
            Self::CasesRefreshRequested => "cases_refresh_requested",
            Self::CaseSelected(_) => "case_selected",
            Self::InboxCaseSelected(_) => "inbox_case_selected",
            Self::EmailSelected(_) => "email_selected",
            Self::SummaryRequested => "summary_requested",
            Self::HistoryFilterChanged(_) => "history_filter_changed",
            Self::OcrToolFilesChosen(_) => "ocr_tool_files_chosen",
            Self::OcrToolExtractRequested => "ocr_tool_extract_requested",
            Self::StoredTokenLoaded(_) => "stored_token_loaded",
            Self::TokenStored(_) => "token_stored",
            Self::TokenCleared(_) => "token_cleared",
            Self::TokenVerified { .. } => "token_verified",
            Self::UserLoaded(_) => "user_loaded",
            Self::LoggedOut(_) => "logged_out",
            Self::CasesLoaded(_) => "cases_loaded",
            Self::CaseLoaded { .. } => "case_loaded",
            Self::CaseCreated(_) => "case_created",
            Self::EmailsLoaded { .. } => "emails_loaded",
            Self::OcrCompleted { .. } => "ocr_completed",
            Self::AgentSessionCreated { .. } => "agent_session_created",
            Self::AgentReplied { .. } => "agent_replied",
        }
    }

    /// Events that only make sense for a signed-in user.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        !matches!(
            self,
            Self::AppStarted
                | Self::Configure(_)
                | Self::DismissAlert
                | Self::DismissNotice
                | Self::RedirectHandled
                | Self::LoginRequested
                | Self::OAuthCallback { .. }
                | Self::LogoutRequested
                | Self::StoredTokenLoaded(_)
                | Self::TokenStored(_)
                | Self::TokenCleared(_)
                | Self::TokenVerified { .. }
                | Self::UserLoaded(_)
                | Self::LoggedOut(_)
        )
    }
}
