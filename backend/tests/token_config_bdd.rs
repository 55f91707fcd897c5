//! Behaviour tests for bearer token secret configuration.
//!
//! These scenarios cover where the signing secret is read from, how release
//! builds fail fast, and what debug builds fall back to.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use backend::inbound::http::token_config::{
    ALLOW_EPHEMERAL_ENV, SECRET_ENV, SECRET_FILE_ENV, SecretSource, TokenConfigError,
    TokenSettings, token_settings_from_env,
};
use backend::settings::{BuildMode, ConfigEnv};
use mockable::{Env as MockableEnv, MockEnv};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::NamedTempFile;

struct TestEnv {
    inner: MockEnv,
}

impl ConfigEnv for TestEnv {
    fn string(&self, name: &str) -> Option<String> {
        MockableEnv::string(&self.inner, name)
    }
}

fn mock_env(vars: HashMap<String, String>) -> TestEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    TestEnv { inner: env }
}

struct TokenConfigWorld {
    vars: RefCell<HashMap<String, String>>,
    mode: RefCell<BuildMode>,
    outcome: RefCell<Option<Result<TokenSettings, TokenConfigError>>>,
    secret_files: RefCell<Vec<NamedTempFile>>,
}

impl TokenConfigWorld {
    fn new() -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            mode: RefCell::new(BuildMode::Release),
            outcome: RefCell::new(None),
            secret_files: RefCell::new(Vec::new()),
        }
    }

    fn set_env_var(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn add_secret_file(&self, len: usize) {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&vec![b's'; len]).expect("write secret");
        let path = file.path().to_string_lossy().into_owned();
        self.set_env_var(SECRET_FILE_ENV, &path);
        self.secret_files.borrow_mut().push(file);
    }

    fn evaluate(&self) {
        let env = mock_env(self.vars.borrow().clone());
        let mode = *self.mode.borrow();
        *self.outcome.borrow_mut() = Some(token_settings_from_env(&env, mode));
    }

    fn with_settings<F>(&self, f: F)
    where
        F: FnOnce(&TokenSettings),
    {
        let outcome = self.outcome.borrow();
        let settings = outcome
            .as_ref()
            .expect("evaluation result")
            .as_ref()
            .expect("expected settings to succeed");
        f(settings);
    }

    fn with_error<F>(&self, f: F)
    where
        F: FnOnce(&TokenConfigError),
    {
        let outcome = self.outcome.borrow();
        let error = outcome
            .as_ref()
            .expect("evaluation result")
            .as_ref()
            .expect_err("expected configuration to fail");
        f(error);
    }
}

#[fixture]
fn world() -> TokenConfigWorld {
    TokenConfigWorld::new()
}

#[given("a release build configuration")]
fn a_release_build_configuration(world: &TokenConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("a debug build configuration")]
fn a_debug_build_configuration(world: &TokenConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Debug;
}

#[given("a token secret file with {len} bytes")]
fn a_token_secret_file_with_bytes(world: &TokenConfigWorld, len: usize) {
    world.add_secret_file(len);
}

#[given("a missing token secret file")]
fn a_missing_token_secret_file(world: &TokenConfigWorld) {
    world.set_env_var(SECRET_FILE_ENV, "/nonexistent/jwt_secret");
}

#[given("JWT_SECRET is set to {value}")]
fn jwt_secret_is_set(world: &TokenConfigWorld, value: String) {
    world.set_env_var(SECRET_ENV, &value);
}

#[given("JWT_ALLOW_EPHEMERAL is set to {value}")]
fn jwt_allow_ephemeral_is_set(world: &TokenConfigWorld, value: String) {
    world.set_env_var(ALLOW_EPHEMERAL_ENV, &value);
}

#[when("the token configuration is loaded")]
fn the_token_configuration_is_loaded(world: &TokenConfigWorld) {
    world.evaluate();
}

#[then("the configuration load succeeds")]
fn the_configuration_load_succeeds(world: &TokenConfigWorld) {
    world.with_settings(|_| {});
}

#[then("the secret source is the file")]
fn the_secret_source_is_the_file(world: &TokenConfigWorld) {
    world.with_settings(|settings| assert_eq!(settings.source, SecretSource::File));
}

#[then("the secret source is ephemeral")]
fn the_secret_source_is_ephemeral(world: &TokenConfigWorld) {
    world.with_settings(|settings| assert_eq!(settings.source, SecretSource::Ephemeral));
}

#[then("the settings include a 16 character hex fingerprint")]
fn the_settings_include_a_hex_fingerprint(world: &TokenConfigWorld) {
    world.with_settings(|settings| {
        assert_eq!(settings.fingerprint.len(), 16);
        assert!(
            settings
                .fingerprint
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "fingerprint should be lowercase hex"
        );
    });
}

#[then("the configuration load fails because the secret is too short")]
fn the_load_fails_because_secret_too_short(world: &TokenConfigWorld) {
    world.with_error(|error| {
        assert!(
            matches!(error, TokenConfigError::SecretTooShort { length: 8, .. }),
            "unexpected error: {error}"
        );
    });
}

#[then("the configuration load fails because ephemeral secrets are not allowed")]
fn the_load_fails_because_ephemeral_not_allowed(world: &TokenConfigWorld) {
    world.with_error(|error| {
        assert!(
            matches!(error, TokenConfigError::EphemeralNotAllowed),
            "unexpected error: {error}"
        );
    });
}

#[scenario(path = "tests/features/token_secret_from_file.feature")]
fn token_secret_from_file(world: TokenConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/token_secret_too_short.feature")]
fn token_secret_too_short(world: TokenConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/token_ephemeral_release.feature")]
fn token_ephemeral_release(world: TokenConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/token_ephemeral_debug.feature")]
fn token_ephemeral_debug(world: TokenConfigWorld) {
    drop(world);
}
