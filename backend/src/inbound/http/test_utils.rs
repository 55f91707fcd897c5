//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    LoginService, MockLoginService, MockSuggestionSource, MockTaskCommand, MockTaskQuery,
    SuggestionSource, TaskCommand, TaskQuery,
};
use crate::domain::{TokenKeys, TokenService, UserId};

use super::state::{HttpState, HttpStatePorts};

pub const TEST_SECRET: &[u8] = b"http adapter test secret of 32+ bytes";

/// Clock frozen at a fixed instant.
pub struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub fn test_tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        TokenKeys::from_secret(TEST_SECRET),
        Arc::new(FixtureClock(fixed_now())),
    ))
}

/// Authorization header value for `user`, signed with [`TEST_SECRET`].
pub fn bearer_for(tokens: &TokenService, user: &UserId) -> String {
    let issued = tokens.issue(user).expect("token issues");
    format!("Bearer {}", issued.token)
}

/// Mocks for every port; unset expectations fail the test if called.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub tasks: MockTaskCommand,
    pub tasks_query: MockTaskQuery,
    pub suggestions: MockSuggestionSource,
}

impl MockPorts {
    pub fn into_state(self, tokens: Arc<TokenService>) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                login: Arc::new(self.login) as Arc<dyn LoginService>,
                tasks: Arc::new(self.tasks) as Arc<dyn TaskCommand>,
                tasks_query: Arc::new(self.tasks_query) as Arc<dyn TaskQuery>,
                suggestions: Arc::new(self.suggestions) as Arc<dyn SuggestionSource>,
            },
            tokens,
        )
    }
}
