mod common;

use common::*;
use tender_shared::api::agent::AgentPurpose;
use tender_shared::api::ocr::OcrPurpose;
use tender_shared::intake::{Decision, OcrStatus, ANALYSIS_FAILED_ALERT, EMPTY_SUBMISSION_ALERT};
use tender_shared::model::UploadedFile;
use tender_shared::{ApiError, Event};

fn pdf(name: &str) -> UploadedFile {
    UploadedFile {
        name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.7 fake".to_vec(),
    }
}

fn docx(name: &str) -> UploadedFile {
    UploadedFile {
        name: name.to_string(),
        mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            .to_string(),
        bytes: vec![0; 1536],
    }
}

#[test]
fn test_empty_submit_never_calls_agent() {
    let (app, mut model) = signed_in();
    app.update(Event::TextChanged("   ".into()), &mut model);

    let update = app.update(Event::SubmitRequested, &mut model);
    assert!(http_requests(&update.effects).is_empty());
    assert!(has_render(&update.effects));
    let alert = app.view(&model).alert.expect("alert shown");
    assert_eq!(alert.code, "VALIDATION_ERROR");
    assert_eq!(alert.message, EMPTY_SUBMISSION_ALERT);

    app.update(Event::DismissAlert, &mut model);
    assert_eq!(model.alert, None);
}

#[test]
fn test_submit_runs_two_step_conversation() {
    let (app, mut model) = signed_in();
    let session_id = model.session_ids.peek();

    app.update(Event::TextChanged("Reschedule meeting".into()), &mut model);
    let update = app.update(Event::SubmitRequested, &mut model);

    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].url,
        format!("{AGENT}/apps/taskagent/users/u_123/sessions/{session_id}")
    );
    assert!(requests[0].body.is_empty());
    assert_eq!(app.view(&model).intake.submit_label, "Analyzing...");

    let update = app.update(
        Event::AgentSessionCreated {
            purpose: AgentPurpose::Analysis,
            session_id: session_id.clone(),
            text: "Reschedule meeting".into(),
            result: Ok(()),
        },
        &mut model,
    );
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{AGENT}/run"));
    assert_eq!(
        json_body(requests[0]),
        serde_json::json!({
            "appName": "taskagent",
            "user_id": "u_123",
            "session_id": session_id,
            "new_message": { "role": "user", "parts": [{ "text": "Reschedule meeting" }] }
        })
    );

    app.update(
        Event::AgentReplied {
            purpose: AgentPurpose::Analysis,
            session_id: session_id.clone(),
            result: Ok("Move the meeting to Thursday at 2pm.".into()),
        },
        &mut model,
    );

    let view = app.view(&model);
    let analysis = view.analysis.expect("analysis shown");
    assert!(analysis.task_detected);
    assert_eq!(analysis.task_description, "Move the meeting to Thursday at 2pm.");
    assert_eq!(analysis.specialist.as_deref(), Some("Legal Researcher"));
    let confidence = analysis.confidence.unwrap();
    assert!((0.6..1.0).contains(&confidence));
}

#[test]
fn test_approve_clears_and_records() {
    let (app, mut model) = signed_in();
    let session_id = model.session_ids.peek();
    app.update(Event::TextChanged("Call the client".into()), &mut model);
    app.update(Event::FilesAdded(vec![docx("notes.docx")]), &mut model);
    app.update(Event::SubmitRequested, &mut model);
    app.update(
        Event::AgentReplied {
            purpose: AgentPurpose::Analysis,
            session_id,
            result: Ok("Call Jane Smith about the settlement.".into()),
        },
        &mut model,
    );

    app.update(Event::ApproveRequested, &mut model);
    let view = app.view(&model);
    assert!(view.analysis.is_none());
    assert!(view.intake.text.is_empty());
    assert!(view.intake.attachments.is_empty());
    assert_eq!(view.last_decision, Some(Decision::Approved));
    assert_eq!(view.history.total, 1);
    assert_eq!(
        view.history.tasks[0].description,
        "Call Jane Smith about the settlement."
    );
}

#[test]
fn test_reject_keeps_input() {
    let (app, mut model) = signed_in();
    let session_id = model.session_ids.peek();
    app.update(Event::TextChanged("Call the client".into()), &mut model);
    app.update(Event::FilesAdded(vec![docx("notes.docx")]), &mut model);
    app.update(Event::SubmitRequested, &mut model);
    app.update(
        Event::AgentReplied {
            purpose: AgentPurpose::Analysis,
            session_id,
            result: Ok("Call Jane".into()),
        },
        &mut model,
    );

    app.update(Event::RejectRequested, &mut model);
    let view = app.view(&model);
    assert!(view.analysis.is_none());
    assert_eq!(view.intake.text, "Call the client");
    assert_eq!(view.intake.attachments.len(), 1);
    assert_eq!(view.intake.attachments[0].size_label, "1.5 KB");
    assert_eq!(view.history.total, 0);
}

#[test]
fn test_agent_failure_alerts_and_returns_to_idle() {
    let (app, mut model) = signed_in();
    let session_id = model.session_ids.peek();
    app.update(Event::TextChanged("Hello".into()), &mut model);
    app.update(Event::SubmitRequested, &mut model);

    app.update(
        Event::AgentSessionCreated {
            purpose: AgentPurpose::Analysis,
            session_id,
            text: "Hello".into(),
            result: Err(ApiError::Status { status: 502 }),
        },
        &mut model,
    );
    let alert = app.view(&model).alert.expect("alert shown");
    assert_eq!(alert.code, "NETWORK_ERROR");
    assert_eq!(alert.message, ANALYSIS_FAILED_ALERT);
    assert!(!model.intake.is_analyzing());
    assert!(app.view(&model).intake.can_submit);
}

#[test]
fn test_stale_reply_ignored() {
    let (app, mut model) = signed_in();
    app.update(Event::TextChanged("Hello".into()), &mut model);
    app.update(Event::SubmitRequested, &mut model);

    let update = app.update(
        Event::AgentSessionCreated {
            purpose: AgentPurpose::Analysis,
            session_id: "s_unknown".into(),
            text: "Hello".into(),
            result: Ok(()),
        },
        &mut model,
    );
    assert!(http_requests(&update.effects).is_empty());
    assert!(model.intake.is_analyzing());
}

#[test]
fn test_one_ocr_call_per_pdf() {
    let (app, mut model) = signed_in();
    app.update(Event::TextChanged("See attached.".into()), &mut model);

    let update = app.update(
        Event::FilesAdded(vec![pdf("lease.pdf"), docx("notes.docx"), pdf("addendum.pdf")]),
        &mut model,
    );
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.url, format!("{API}/api/ocr/extract"));
        let content_type = header(request, "content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"lease.pdf\""));

    let view = app.view(&model);
    assert_eq!(view.intake.submit_label, "Processing PDF...");
    let update = app.update(Event::SubmitRequested, &mut model);
    assert!(http_requests(&update.effects).is_empty());

    let lease_id = model.intake.attachments[0].id.clone();
    app.update(
        Event::OcrCompleted {
            purpose: OcrPurpose::Intake {
                attachment_id: lease_id,
            },
            result: Ok("Term: 12 months".into()),
        },
        &mut model,
    );
    let addendum_id = model.intake.attachments[2].id.clone();
    app.update(
        Event::OcrCompleted {
            purpose: OcrPurpose::Intake {
                attachment_id: addendum_id,
            },
            result: Err(ApiError::Status { status: 500 }),
        },
        &mut model,
    );

    assert_eq!(
        model.intake.text,
        "See attached.\n\n--- Extracted from lease.pdf ---\nTerm: 12 months"
    );
    assert_eq!(model.intake.attachments[2].ocr, OcrStatus::Failed);
    assert!(app.view(&model).intake.can_submit);
}

#[test]
fn test_non_pdf_never_ocrd() {
    let (app, mut model) = signed_in();
    let update = app.update(Event::FilesAdded(vec![docx("notes.docx")]), &mut model);
    assert!(http_requests(&update.effects).is_empty());

    app.update(Event::FileRemoved(0), &mut model);
    assert!(model.intake.attachments.is_empty());
}

#[test]
fn test_ocr_tool_ignores_text_for_replaced_file() {
    let (app, mut model) = signed_in();
    app.update(Event::OcrToolFilesChosen(vec![pdf("old.pdf")]), &mut model);
    let update = app.update(Event::OcrToolExtractRequested, &mut model);
    assert_eq!(http_requests(&update.effects).len(), 1);
    let stale = model.ocr_tool.pending.clone().unwrap();

    app.update(Event::OcrToolFilesChosen(vec![pdf("new.pdf")]), &mut model);
    assert!(!app.view(&model).ocr_tool.loading);
    app.update(
        Event::OcrCompleted {
            purpose: OcrPurpose::Tool { request_id: stale },
            result: Ok("old text".into()),
        },
        &mut model,
    );

    let view = app.view(&model).ocr_tool;
    assert_eq!(view.text, None);
    assert_eq!(view.files[0].name, "new.pdf");
    assert!(view.can_extract);
}
