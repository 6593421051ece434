//! Wire format of the generative-AI agent runtime.
//!
//! A conversation needs two calls: create a session scoped to
//! `(app, user, session)`, then post one message into it with `/run`.

use serde::{Deserialize, Serialize};

use super::Gateway;
use crate::capabilities::{read_json, read_ok};
use crate::error::ApiError;
use crate::event::Event;

pub const RUN_PATH: &str = "run";
pub const USER_ROLE: &str = "user";

/// Who asked for the conversation; decides where the reply lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentPurpose {
    Analysis,
    Summary { email_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: String,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: NewMessage,
}

impl RunRequest {
    #[must_use]
    pub fn new(app_name: &str, user_id: &str, session_id: &str, text: impl Into<String>) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            new_message: NewMessage {
                role: USER_ROLE.to_string(),
                parts: vec![TextPart { text: text.into() }],
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentContent {
    #[serde(default)]
    pub parts: Vec<AgentPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub content: Option<AgentContent>,
}

/// Every text part of every message, in order.
#[must_use]
pub fn reply_text(messages: &[AgentMessage]) -> String {
    messages
        .iter()
        .filter_map(|m| m.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect()
}

impl Gateway<'_> {
    fn agent_name(&self, purpose: &AgentPurpose) -> &str {
        match purpose {
            AgentPurpose::Analysis => &self.endpoints.intake_agent,
            AgentPurpose::Summary { .. } => &self.endpoints.summary_agent,
        }
    }

    /// First step. `text` rides along so the run can follow once the session exists.
    pub fn create_agent_session(&self, purpose: AgentPurpose, session_id: String, text: String) {
        let agent = &self.endpoints.agent;
        let url = agent.endpoint(&[
            "apps",
            self.agent_name(&purpose),
            "users",
            self.endpoints.agent_user_id.as_str(),
            "sessions",
            session_id.as_str(),
        ]);
        self.post(&url).send(move |result| Event::AgentSessionCreated {
            purpose,
            session_id,
            text,
            result: read_ok(result),
        });
    }

    pub fn run_agent(&self, purpose: AgentPurpose, session_id: String, text: String) -> Result<(), ApiError> {
        let url = self.endpoints.agent.endpoint(&[RUN_PATH]);
        let request = RunRequest::new(
            self.agent_name(&purpose),
            &self.endpoints.agent_user_id,
            &session_id,
            text,
        );
        self.post_json(&url, &request)?.send(move |result| Event::AgentReplied {
            purpose,
            session_id,
            result: read_json::<Vec<AgentMessage>>(result).map(|messages| reply_text(&messages)),
        });
        Ok(())
    }
}
