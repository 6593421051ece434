use secrecy::{ExposeSecret, SecretString};

use super::Gateway;
use crate::capabilities::{read_json, read_ok};
use crate::config::ServiceUrl;
use crate::error::ApiError;
use crate::event::Event;
use crate::model::User;
use crate::session::{TokenSource, VerifyTokenRequest, VerifyTokenResponse};

/// Where the shell sends the browser to start Google sign-in.
#[must_use]
pub fn login_url(api: &ServiceUrl) -> String {
    api.endpoint(&["api", "auth", "login"])
}

impl Gateway<'_> {
    pub fn verify_token(&self, token: &SecretString, source: TokenSource) -> Result<(), ApiError> {
        let url = self.endpoints.api.endpoint(&["api", "auth", "verify-token"]);
        let body = VerifyTokenRequest {
            token: token.expose_secret(),
        };
        self.post_json(&url, &body)?.send(move |result| Event::TokenVerified {
            source,
            result: read_json::<VerifyTokenResponse>(result),
        });
        Ok(())
    }

    pub fn current_user(&self) {
        let url = self.endpoints.api.endpoint(&["api", "auth", "user"]);
        self.get(&url)
            .send(|result| Event::UserLoaded(read_json::<User>(result)));
    }

    pub fn logout(&self) {
        let url = self.endpoints.api.endpoint(&["api", "auth", "logout"]);
        self.get(&url).send(|result| Event::LoggedOut(read_ok(result)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url() {
        let api = ServiceUrl::parse("api_base_url", "http://localhost:6767").unwrap();
        assert_eq!(login_url(&api), "http://localhost:6767/api/auth/login");
    }
}
