#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_http::protocol::HttpRequest;
use tender_shared::model::User;
use tender_shared::session::{TokenSource, VerifyTokenResponse};
use tender_shared::{App, AppConfig, Effect, Event, Model};

pub const API: &str = "http://api.tender.test";
pub const AGENT: &str = "http://agent.tender.test";
pub const TOKEN: &str = "ya29.test-token";

pub fn config() -> AppConfig {
    AppConfig {
        api_base_url: API.to_string(),
        agent_base_url: AGENT.to_string(),
        agent_user_id: "u_123".to_string(),
        intake_agent: "taskagent".to_string(),
        summary_agent: "emailagent".to_string(),
    }
}

pub fn user() -> User {
    User {
        id: "u1".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@firm.example".to_string(),
        picture: None,
    }
}

pub fn configured() -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::Configure(config()), &mut model);
    (app, model)
}

/// Drives the OAuth redirect flow through to an authenticated session.
pub fn signed_in() -> (AppTester<App, Effect>, Model) {
    let (app, mut model) = configured();
    app.update(
        Event::OAuthCallback {
            url: format!("http://localhost:3000/?token={TOKEN}"),
        },
        &mut model,
    );
    app.update(
        Event::TokenVerified {
            source: TokenSource::Redirect,
            result: Ok(VerifyTokenResponse {
                valid: true,
                error: None,
            }),
        },
        &mut model,
    );
    app.update(Event::UserLoaded(Ok(user())), &mut model);
    app.update(Event::CasesLoaded(Ok(vec![])), &mut model);
    assert!(model.session.is_authenticated());
    (app, model)
}

pub fn http_requests(effects: &[Effect]) -> Vec<&HttpRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .collect()
}

pub fn has_kv(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::KeyValue(_)))
}

pub fn has_render(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(_)))
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn json_body(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(&request.body).unwrap()
}
