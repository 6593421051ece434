//! Service endpoints the core talks to.
//!
//! Defaults are baked in at compile time from `TENDER_API_URL`,
//! `TENDER_AGENT_URL` and `TENDER_AGENT_USER`; the shell may replace them at
//! runtime with `Event::Configure`.

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:6767";
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";
pub const DEFAULT_AGENT_USER: &str = "u_123";
pub const DEFAULT_INTAKE_AGENT: &str = "taskagent";
pub const DEFAULT_SUMMARY_AGENT: &str = "emailagent";
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub agent_base_url: String,
    pub agent_user_id: String,
    pub intake_agent: String,
    pub summary_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("TENDER_API_URL")
                .unwrap_or(DEFAULT_API_URL)
                .to_string(),
            agent_base_url: option_env!("TENDER_AGENT_URL")
                .unwrap_or(DEFAULT_AGENT_URL)
                .to_string(),
            agent_user_id: option_env!("TENDER_AGENT_USER")
                .unwrap_or(DEFAULT_AGENT_USER)
                .to_string(),
            intake_agent: DEFAULT_INTAKE_AGENT.to_string(),
            summary_agent: DEFAULT_SUMMARY_AGENT.to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<Endpoints, ConfigError> {
        Ok(Endpoints {
            api: ServiceUrl::parse("api_base_url", &self.api_base_url)?,
            agent: ServiceUrl::parse("agent_base_url", &self.agent_base_url)?,
            agent_user_id: non_empty("agent_user_id", &self.agent_user_id)?,
            intake_agent: non_empty("intake_agent", &self.intake_agent)?,
            summary_agent: non_empty("summary_agent", &self.summary_agent)?,
        })
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: ServiceUrl,
    pub agent: ServiceUrl,
    pub agent_user_id: String,
    pub intake_agent: String,
    pub summary_agent: String,
}

/// Base URL of one backend. Only http(s) with a host and no userinfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    pub fn parse(field: &str, raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            field: field.to_string(),
            reason,
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::Empty {
                field: field.to_string(),
            });
        }
        if raw.len() > MAX_URL_LENGTH {
            return Err(invalid(format!(
                "exceeds maximum length of {MAX_URL_LENGTH} bytes"
            )));
        }

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(format!(
                "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
            )));
        }
        if url.host_str().is_none() {
            return Err(invalid("URL must have a host".to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials in URL are not allowed".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("base URL cannot carry a query or fragment".to_string()));
        }

        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> String {
        self.endpoint_url(segments).to_string()
    }

    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        // http(s) URLs always have a path base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
