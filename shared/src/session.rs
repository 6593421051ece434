//! Sign-in state and its lifecycle.
//!
//! The session is created when the app starts, verified whenever a token shows
//! up (from storage or from the OAuth redirect) and torn down on logout.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::capabilities::bearer_header;
use crate::model::User;

pub const TOKEN_QUERY_PARAM: &str = "token";
pub const SIGN_IN_FAILED: &str = "Sign-in failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Loading,
    Anonymous,
    Verifying,
    Authenticated,
}

/// Where the token under verification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Stored,
    Redirect,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VerifyTokenResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    phase: AuthPhase,
    source: Option<TokenSource>,
    token: Option<SecretString>,
    user: Option<User>,
    error: Option<String>,
    logging_out: bool,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn is_logging_out(&self) -> bool {
        self.logging_out
    }

    /// `Authorization` header value for backend calls.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(bearer_header)
    }

    /// No token in storage.
    pub fn no_stored_token(&mut self) {
        if self.phase == AuthPhase::Loading {
            self.phase = AuthPhase::Anonymous;
        }
    }

    #[must_use]
    pub fn is_verifying(&self, source: TokenSource) -> bool {
        self.phase == AuthPhase::Verifying && self.source == Some(source)
    }

    /// Returns false while another token is already being checked. A token
    /// from the OAuth redirect takes over from a stored one.
    pub fn begin_verification(&mut self, token: SecretString, source: TokenSource) -> bool {
        let takes_over =
            source == TokenSource::Redirect && self.source == Some(TokenSource::Stored);
        if self.phase == AuthPhase::Verifying && !takes_over {
            return false;
        }
        self.phase = AuthPhase::Verifying;
        self.source = Some(source);
        self.token = Some(token);
        self.user = None;
        self.error = None;
        true
    }

    pub fn establish(&mut self, user: User) {
        self.phase = AuthPhase::Authenticated;
        self.user = Some(user);
        self.error = None;
    }

    /// Verification failed; back to signed out. Redirect failures keep a message.
    pub fn reject(&mut self) {
        if self.source == Some(TokenSource::Redirect) {
            self.error = Some(SIGN_IN_FAILED.to_string());
        }
        self.phase = AuthPhase::Anonymous;
        self.token = None;
        self.user = None;
    }

    /// The provider came back without a usable token.
    pub fn sign_in_failed(&mut self) {
        if self.phase == AuthPhase::Loading {
            self.phase = AuthPhase::Anonymous;
        }
        self.error = Some(SIGN_IN_FAILED.to_string());
    }

    /// The token leaves local storage right away; state goes once the backend answers.
    pub fn begin_logout(&mut self) -> bool {
        if self.logging_out || self.phase != AuthPhase::Authenticated {
            return false;
        }
        self.logging_out = true;
        true
    }

    pub fn tear_down(&mut self) {
        *self = Self {
            phase: AuthPhase::Anonymous,
            ..Self::default()
        };
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Pulls the OAuth token out of the URL the backend redirected to.
#[must_use]
pub fn token_from_redirect(redirect_url: &str) -> Option<SecretString> {
    let url = Url::parse(redirect_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(SecretString::new)
}
