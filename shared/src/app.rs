use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::api::agent::AgentPurpose;
use crate::api::auth::login_url;
use crate::api::ocr::{OcrJob, OcrPurpose};
use crate::api::Gateway;
use crate::capabilities::{decode_token, encode_token, Capabilities};
use crate::error::{ApiError, AppError};
use crate::event::Event;
use crate::inbox::{EMAILS_FAILED, SESSION_INIT_FAILED, SUMMARY_FAILED};
use crate::intake::{placeholder_confidence, IntakeError, ANALYSIS_FAILED_ALERT};
use crate::model::Model;
use crate::session::{token_from_redirect, AuthPhase, TokenSource};
use crate::view::ViewModel;
use crate::AUTH_TOKEN_KEY;

pub const CASES_FAILED: &str = "Failed to load cases";
pub const CASE_FAILED: &str = "Failed to load case";
pub const CASE_CREATE_FAILED: &str = "Failed to create case. Please try again.";
pub const REQUEST_FAILED: &str = "The request could not be sent";

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        debug!(event = event_name, "update");

        if event.requires_session() && !model.session.is_authenticated() {
            warn!(event = event_name, phase = ?model.session.phase(), "ignored without a session");
            return;
        }

        match event {
            Event::AppStarted => {
                if let Some(error) = &model.config_error {
                    warn!(%error, "starting with invalid configuration");
                }
                caps.kv.get(AUTH_TOKEN_KEY.to_string(), |result| {
                    Event::StoredTokenLoaded(result.map_err(|e| format!("{e:?}")))
                });
            }

            Event::Configure(config) => {
                model.apply_config(&config);
                match &model.config_error {
                    Some(error) => warn!(%error, "configuration rejected"),
                    None => info!(api = %config.api_base_url, agent = %config.agent_base_url, "configured"),
                }
            }

            Event::Navigate(page) => model.page = page,
            Event::DismissAlert => model.alert = None,
            Event::DismissNotice => {
                model.notice = None;
                model.session.clear_error();
            }
            Event::RedirectHandled => model.redirect_to = None,

            // Session
            Event::LoginRequested => {
                let url = model.endpoints.as_ref().map(|e| login_url(&e.api));
                match url {
                    Some(url) => model.redirect_to = Some(url),
                    None => {
                        let error = Self::unconfigured(model);
                        Self::report(model, &error);
                    }
                }
            }

            Event::OAuthCallback { url } => match token_from_redirect(&url) {
                Some(token) => Self::verify(model, caps, token, TokenSource::Redirect),
                None => {
                    warn!("OAuth redirect carried no token");
                    model.session.sign_in_failed();
                }
            },

            Event::StoredTokenLoaded(result) => match result {
                Ok(Some(bytes)) => match decode_token(bytes) {
                    Ok(token) => Self::verify(model, caps, token, TokenSource::Stored),
                    Err(e) => {
                        warn!(error = %e, "discarding unreadable stored token");
                        model.session.no_stored_token();
                        Self::forget_token(caps);
                    }
                },
                Ok(None) => {
                    debug!("no stored token");
                    model.session.no_stored_token();
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stored token");
                    model.session.no_stored_token();
                }
            },

            Event::TokenVerified { source, result } => {
                if !model.session.is_verifying(source) {
                    debug!(?source, "dropping verification result for a replaced token");
                    return;
                }
                match result {
                    Ok(response) if response.valid => {
                        info!(?source, "token verified");
                        if source == TokenSource::Redirect {
                            if let Some(token) = model.session.token() {
                                caps.kv.set(AUTH_TOKEN_KEY.to_string(), encode_token(token), |result| {
                                    Event::TokenStored(result.map(|_| ()).map_err(|e| format!("{e:?}")))
                                });
                            }
                        }
                        if let Err(e) = Self::dispatch(model, caps, |api| {
                            api.current_user();
                            Ok(())
                        }) {
                            Self::report(model, &e);
                            Self::sign_in_rejected(model, caps);
                        }
                    }
                    Ok(response) => {
                        warn!(?source, error = ?response.error, "token rejected");
                        Self::sign_in_rejected(model, caps);
                    }
                    Err(e) => {
                        warn!(?source, error = %e, "token verification failed");
                        Self::sign_in_rejected(model, caps);
                    }
                }
            }

            Event::UserLoaded(result) => {
                if model.session.phase() != AuthPhase::Verifying {
                    debug!("user arrived outside verification");
                    return;
                }
                match result {
                    Ok(user) => {
                        info!(user_id = %user.id, "signed in");
                        model.session.establish(user);
                        Self::load_cases(model, caps);
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load current user");
                        Self::sign_in_rejected(model, caps);
                    }
                }
            }

            Event::TokenStored(result) | Event::TokenCleared(result) => {
                if let Err(e) = result {
                    warn!(event = event_name, error = %e, "token storage failed");
                }
            }

            Event::LogoutRequested => {
                if !model.session.begin_logout() {
                    debug!("logout already running or not signed in");
                    return;
                }
                Self::forget_token(caps);
                if let Err(e) = Self::dispatch(model, caps, |api| {
                    api.logout();
                    Ok(())
                }) {
                    warn!(error = %e, "logout call not sent");
                    Self::finish_logout(model);
                }
            }

            Event::LoggedOut(result) => {
                if !model.session.is_logging_out() {
                    return;
                }
                if let Err(e) = result {
                    warn!(error = %e, "backend logout failed");
                }
                Self::finish_logout(model);
            }

            // Intake
            Event::TextChanged(text) => model.intake.set_text(text),

            Event::FilesAdded(files) => {
                let jobs = model.intake.attach(files);
                info!(pdfs = jobs.len(), attachments = model.intake.attachments.len(), "files attached");
                for job in jobs {
                    Self::extract(model, caps, job);
                }
            }

            Event::FileRemoved(index) => {
                if model.intake.remove_attachment(index).is_none() {
                    debug!(index, "no attachment at index");
                }
            }

            Event::SubmitRequested => {
                let ids = &mut model.session_ids;
                match model.intake.submit(|| ids.allocate()) {
                    Ok(submission) => {
                        info!(session_id = %submission.session_id, "analysis requested");
                        Self::start_conversation(model, caps, AgentPurpose::Analysis, submission.session_id, submission.text);
                    }
                    Err(IntakeError::EmptySubmission) => {
                        model.alert = Some(AppError::from(IntakeError::EmptySubmission));
                    }
                    Err(e) => debug!(reason = %e, "submit ignored"),
                }
            }

            Event::ApproveRequested => match model.intake.approve() {
                Ok(result) => {
                    info!(
                        task = result.task_description.as_deref().unwrap_or_default(),
                        specialist = result.specialist.as_deref().unwrap_or_default(),
                        "task approved"
                    );
                    model.history.record_approval(&result, Utc::now());
                }
                Err(e) => debug!(reason = %e, "approve ignored"),
            },

            Event::RejectRequested => match model.intake.reject() {
                Ok(()) => info!("analysis rejected"),
                Err(e) => debug!(reason = %e, "reject ignored"),
            },

            // Cases
            Event::CaseFormOpened => model.case_form.open(),
            Event::CaseFormClosed => model.case_form.close(),
            Event::CaseFormEdited { field, value } => model.case_form.edit(field, value),

            Event::CaseFormSubmitted => {
                match model.case_form.begin_submit() {
                    Some(case) => {
                        if let Err(e) = Self::dispatch(model, caps, |api| api.create_case(&case)) {
                            Self::report(model, &e);
                            model.case_form.submit_failed(AppError::from_api(CASE_CREATE_FAILED, &e));
                        }
                    }
                    None => debug!(error = ?model.case_form.error, "case form not submitted"),
                }
            }

            Event::CaseCreated(result) => match result {
                Ok(()) => {
                    info!("case created");
                    model.case_form.close();
                    Self::load_cases(model, caps);
                }
                Err(e) => {
                    warn!(error = %e, "case creation failed");
                    model.case_form.submit_failed(AppError::from_api(CASE_CREATE_FAILED, &e));
                }
            },

            Event::CasesRefreshRequested => Self::load_cases(model, caps),

            Event::CaseSelected(id) => {
                model.cases.request_detail(&id);
                if let Err(e) = Self::dispatch(model, caps, |api| {
                    api.get_case(&id);
                    Ok(())
                }) {
                    Self::report(model, &e);
                    model.cases.detail_failed(&id, CASE_FAILED);
                }
            }

            Event::CasesLoaded(result) => {
                let result = result.map_err(|e| {
                    warn!(error = %e, "case list failed");
                    CASES_FAILED.to_string()
                });
                model.cases.loaded(result);
            }

            Event::CaseLoaded { case_id, result } => {
                let current = match result {
                    Ok(case) => model.cases.detail_loaded(&case_id, case),
                    Err(e) => {
                        warn!(%case_id, error = %e, "case detail failed");
                        model.cases.detail_failed(&case_id, CASE_FAILED)
                    }
                };
                if !current {
                    debug!(%case_id, "dropping stale case detail");
                }
            }

            // Inbox
            Event::InboxCaseSelected(case_id) => {
                if let Some(case_id) = model.inbox.select_case(case_id) {
                    if let Err(e) = Self::dispatch(model, caps, |api| {
                        api.list_emails(&case_id);
                        Ok(())
                    }) {
                        Self::report(model, &e);
                        model.inbox.emails_loaded(&case_id, Err(EMAILS_FAILED.to_string()));
                    }
                }
            }

            Event::EmailsLoaded { case_id, result } => {
                let result = result.map_err(|e| {
                    warn!(%case_id, error = %e, "email list failed");
                    EMAILS_FAILED.to_string()
                });
                if !model.inbox.emails_loaded(&case_id, result) {
                    debug!(%case_id, "dropping emails for deselected case");
                }
            }

            Event::EmailSelected(id) => {
                if !model.inbox.select_email(&id) {
                    debug!(email_id = %id, "unknown email");
                }
            }

            Event::SummaryRequested => {
                let ids = &mut model.session_ids;
                if let Some(request) = model.inbox.begin_summary(|| ids.allocate()) {
                    info!(email_id = %request.email_id, session_id = %request.session_id, "summary requested");
                    Self::start_conversation(
                        model,
                        caps,
                        AgentPurpose::Summary {
                            email_id: request.email_id,
                        },
                        request.session_id,
                        request.prompt,
                    );
                }
            }

            // Agent conversations
            Event::AgentSessionCreated {
                purpose,
                session_id,
                text,
                result,
            } => {
                if !Self::is_current(model, &purpose, &session_id) {
                    debug!(%session_id, "dropping stale agent session");
                    return;
                }
                match result {
                    Ok(()) => {
                        let sent = Self::dispatch(model, caps, |api| {
                            api.run_agent(purpose.clone(), session_id.clone(), text)
                        });
                        if let Err(e) = sent {
                            Self::conversation_failed(model, &purpose, &session_id, &e, SUMMARY_FAILED);
                        }
                    }
                    Err(e) => {
                        Self::conversation_failed(model, &purpose, &session_id, &e, SESSION_INIT_FAILED);
                    }
                }
            }

            Event::AgentReplied {
                purpose,
                session_id,
                result,
            } => match result {
                Ok(reply) => {
                    let accepted = match &purpose {
                        AgentPurpose::Analysis => {
                            let confidence = placeholder_confidence(&mut rand::thread_rng());
                            model.intake.analysis_succeeded(&session_id, reply, confidence)
                        }
                        AgentPurpose::Summary { email_id } => {
                            model.inbox.summary_replied(email_id, &session_id, reply)
                        }
                    };
                    if accepted {
                        info!(%session_id, "agent replied");
                    } else {
                        debug!(%session_id, "dropping stale agent reply");
                    }
                }
                Err(e) => Self::conversation_failed(model, &purpose, &session_id, &e, SUMMARY_FAILED),
            },

            // History
            Event::HistoryFilterChanged(filter) => model.history.set_filter(filter),

            // OCR
            Event::OcrToolFilesChosen(files) => model.ocr_tool.choose(files),

            Event::OcrToolExtractRequested => {
                if let Some(job) = model.ocr_tool.begin_extract() {
                    info!(file = %job.file_name, "extracting text");
                    Self::extract(model, caps, job);
                }
            }

            Event::OcrCompleted { purpose, result } => {
                if let Err(e) = &result {
                    warn!(?purpose, error = %e, "text extraction failed");
                }
                match purpose {
                    OcrPurpose::Intake { attachment_id } => {
                        if !model.intake.ocr_completed(&attachment_id, result) {
                            debug!(%attachment_id, "dropping text for removed attachment");
                        }
                    }
                    OcrPurpose::Tool { request_id } => {
                        if !model.ocr_tool.completed(&request_id, result) {
                            debug!(%request_id, "dropping text for an earlier selection");
                        }
                    }
                }
            }
        }

        Self::render(caps);
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}

impl App {
    fn render(caps: &Capabilities) {
        caps.render.render();
    }

    fn unconfigured(model: &Model) -> ApiError {
        let reason = model
            .config_error
            .as_ref()
            .map_or_else(|| "not configured".to_string(), ToString::to_string);
        ApiError::Configuration(reason)
    }

    /// Runs `call` against the backends, or fails if there are none configured.
    fn dispatch(
        model: &Model,
        caps: &Capabilities,
        call: impl FnOnce(&Gateway<'_>) -> Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        let Some(endpoints) = &model.endpoints else {
            return Err(Self::unconfigured(model));
        };
        call(&Gateway::new(caps, endpoints, model.session.bearer()))
    }

    fn report(model: &mut Model, error: &ApiError) {
        warn!(%error, "request not sent");
        match error {
            ApiError::Configuration(reason) => {
                let message = format!("Service configuration is invalid: {reason}");
                model.alert = Some(AppError::from_api(message, error));
            }
            other => model.notice = Some(AppError::from_api(REQUEST_FAILED, other)),
        }
    }

    fn verify(model: &mut Model, caps: &Capabilities, token: SecretString, source: TokenSource) {
        if !model.session.begin_verification(token, source) {
            debug!(?source, "verification already running");
            return;
        }
        let sent = Self::dispatch(model, caps, |api| match model.session.token() {
            Some(token) => api.verify_token(token, source),
            None => Ok(()),
        });
        if let Err(e) = sent {
            Self::report(model, &e);
            model.session.reject();
        }
    }

    /// Any failed sign-in leaves nothing behind in storage.
    fn sign_in_rejected(model: &mut Model, caps: &Capabilities) {
        model.session.reject();
        Self::forget_token(caps);
    }

    fn forget_token(caps: &Capabilities) {
        caps.kv.delete(AUTH_TOKEN_KEY.to_string(), |result| {
            Event::TokenCleared(result.map(|_| ()).map_err(|e| format!("{e:?}")))
        });
    }

    fn finish_logout(model: &mut Model) {
        model.session.tear_down();
        model.clear_user_state();
        info!("signed out");
    }

    fn load_cases(model: &mut Model, caps: &Capabilities) {
        model.cases.begin_load();
        if let Err(e) = Self::dispatch(model, caps, |api| {
            api.list_cases();
            Ok(())
        }) {
            Self::report(model, &e);
            model.cases.loaded(Err(CASES_FAILED.to_string()));
        }
    }

    fn extract(model: &mut Model, caps: &Capabilities, job: OcrJob) {
        let purpose = job.purpose.clone();
        let sent = Self::dispatch(model, caps, |api| {
            api.extract_text(job);
            Ok(())
        });
        if let Err(e) = sent {
            Self::report(model, &e);
            match purpose {
                OcrPurpose::Intake { attachment_id } => {
                    model.intake.ocr_completed(&attachment_id, Err(e));
                }
                OcrPurpose::Tool { request_id } => {
                    model.ocr_tool.completed(&request_id, Err(e));
                }
            }
        }
    }

    fn start_conversation(
        model: &mut Model,
        caps: &Capabilities,
        purpose: AgentPurpose,
        session_id: String,
        text: String,
    ) {
        let sent = Self::dispatch(model, caps, |api| {
            api.create_agent_session(purpose.clone(), session_id.clone(), text);
            Ok(())
        });
        if let Err(e) = sent {
            Self::conversation_failed(model, &purpose, &session_id, &e, SESSION_INIT_FAILED);
        }
    }

    fn is_current(model: &Model, purpose: &AgentPurpose, session_id: &str) -> bool {
        match purpose {
            AgentPurpose::Analysis => model.intake.is_awaiting(session_id),
            AgentPurpose::Summary { email_id } => model.inbox.is_awaiting(email_id, session_id),
        }
    }

    /// Analysis failures raise an alert; summary failures stay inline.
    fn conversation_failed(
        model: &mut Model,
        purpose: &AgentPurpose,
        session_id: &str,
        error: &ApiError,
        summary_message: &str,
    ) {
        let current = match purpose {
            AgentPurpose::Analysis => {
                let current = model.intake.analysis_failed(session_id);
                if current {
                    model.alert = Some(AppError::from_api(ANALYSIS_FAILED_ALERT, error));
                }
                current
            }
            AgentPurpose::Summary { email_id } => {
                model.inbox.summary_failed(email_id, session_id, summary_message)
            }
        };
        if current {
            warn!(%session_id, %error, "agent conversation failed");
        }
    }
}
