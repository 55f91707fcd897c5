//! HTTP access to the task service.
//!
//! [`TaskApi`] is the seam the board depends on; [`TaskApiClient`] implements
//! it over `reqwest`. The client keeps the bearer token returned by
//! [`TaskApiClient::login`] and attaches it to every protected call. A 401
//! on a protected call discards the token, so later calls fail with
//! [`ClientError::NotAuthenticated`] until the user logs in again.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::ClientError;
use crate::model::{
    LoginResponse, NewTask, SuggestionEnvelope, Task, TaskEnvelope, TaskStatus, TaskUpdate,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_MESSAGE: &str = "request failed";

/// Operations the board performs against the task service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch every task owned by the caller.
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;

    /// Create a task and return the stored record.
    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError>;

    /// Apply a partial update and return the stored record.
    async fn update_task(&self, id: Uuid, update: &TaskUpdate) -> Result<Task, ClientError>;

    /// Change only the status and return the stored record.
    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, ClientError>;

    /// Delete a task.
    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError>;

    /// Ask the suggestion service for a task idea.
    async fn suggest(&self, description: &str) -> Result<String, ClientError>;
}

/// `reqwest` implementation of [`TaskApi`].
pub struct TaskApiClient {
    http: Client,
    base: Url,
    token: RwLock<Option<Zeroizing<String>>>,
}

impl std::fmt::Debug for TaskApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskApiClient")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl TaskApiClient {
    /// Build a client for the service rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidBaseUrl`] when the URL does not parse or
    /// cannot carry paths, and [`ClientError::Transport`] when the HTTP
    /// client cannot be initialised.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Transport {
                message: err.to_string(),
            })?;
        Self::with_client(http, base_url)
    }

    /// Build a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidBaseUrl`] when the URL does not parse or
    /// cannot carry paths.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let invalid = |message: String| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            message,
        };
        let mut base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry paths".to_owned()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            token: RwLock::new(None),
        })
    }

    /// Reuse a token obtained elsewhere.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.store_token(Some(Zeroizing::new(token.into())));
        self
    }

    /// True while a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the held token.
    pub fn logout(&mut self) {
        self.store_token(None);
    }

    fn store_token(&self, token: Option<Zeroizing<String>>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Exchange credentials for a bearer token and keep it for later calls.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] with status 401 for bad credentials, or a
    /// transport/decoding error.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let request = self
            .http
            .post(self.endpoint("login")?)
            .json(&Credentials { username, password });
        let response: LoginResponse = decode(send(request).await?).await?;
        debug!(expires_in = response.expires_in, "logged in");
        self.store_token(Some(Zeroizing::new(response.token.clone())));
        Ok(response)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|err| ClientError::InvalidBaseUrl {
                url: self.base.to_string(),
                message: err.to_string(),
            })
    }

    fn authorised(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ClientError::NotAuthenticated)?;
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .bearer_auth(token.as_str()))
    }

    /// Send a protected request, discarding the token when it is rejected.
    async fn send_authorised(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        match send(request).await {
            Err(ClientError::Api {
                status: 401,
                message,
            }) => {
                warn!(%message, "token rejected; discarding it");
                self.store_token(None);
                Err(ClientError::SessionExpired { message })
            }
            other => other,
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request.send().await.map_err(|err| {
        warn!(error = %err, "task service unreachable");
        ClientError::Transport {
            message: err.to_string(),
        }
    })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    debug!(status = status.as_u16(), %message, "task service rejected request");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.text().await.map_err(|err| ClientError::Transport {
        message: err.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|err| ClientError::Decode {
        message: err.to_string(),
    })
}

/// Prefer the server's `message` (or `error`) field, then the raw body, then
/// the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.trim().is_empty());
    if let Some(message) = from_json {
        return message;
    }
    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_owned();
    }
    status
        .canonical_reason()
        .unwrap_or(FALLBACK_MESSAGE)
        .to_owned()
}

#[async_trait]
impl TaskApi for TaskApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self
            .send_authorised(self.authorised(Method::GET, "tasks")?)
            .await?;
        decode(response).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let request = self.authorised(Method::POST, "tasks")?.json(task);
        let envelope: TaskEnvelope = decode(self.send_authorised(request).await?).await?;
        Ok(envelope.task)
    }

    async fn update_task(&self, id: Uuid, update: &TaskUpdate) -> Result<Task, ClientError> {
        let request = self
            .authorised(Method::PUT, &format!("tasks/{id}"))?
            .json(update);
        let envelope: TaskEnvelope = decode(self.send_authorised(request).await?).await?;
        Ok(envelope.task)
    }

    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, ClientError> {
        let request = self
            .authorised(Method::PATCH, &format!("tasks/{id}"))?
            .json(&json!({ "status": status }));
        let envelope: TaskEnvelope = decode(self.send_authorised(request).await?).await?;
        Ok(envelope.task)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_authorised(self.authorised(Method::DELETE, &format!("tasks/{id}"))?)
            .await?;
        Ok(())
    }

    async fn suggest(&self, description: &str) -> Result<String, ClientError> {
        let request = self
            .authorised(Method::POST, "ai/suggest")?
            .json(&json!({ "description": description }));
        let envelope: SuggestionEnvelope = decode(self.send_authorised(request).await?).await?;
        Ok(envelope.suggestion)
    }
}
