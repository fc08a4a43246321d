//! Client construction, request addressing/signing, and transport.
//!
//! Building a request and executing it are separate steps: [`Client::build_get`]
//! and [`Client::build_post`] only address and sign (no I/O), while
//! [`Client::execute`] performs exactly one round trip with no retries.

use crate::constants::{API_KEY_FIELD, PRODUCTION_URL, SANDBOX_URL, SIGNATURE_FIELD};
use crate::error::{FlowError, RemoteError};
use crate::signature;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::Url;

/// Which Flow environment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Sandbox,
    Production,
}

impl Mode {
    fn base_url(self) -> &'static str {
        match self {
            Mode::Sandbox => SANDBOX_URL,
            Mode::Production => PRODUCTION_URL,
        }
    }
}

/// Credentials and environment selection for a [`Client`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity key issued by Flow. Sent with every request.
    pub api_key: String,
    /// Secret key issued by Flow. Used only as HMAC input, never transmitted.
    pub secret_key: String,
    pub mode: Mode,
}

impl Config {
    /// Credentials with the default (sandbox) environment.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            mode: Mode::Sandbox,
        }
    }

    /// Read `FLOW_API_KEY`, `FLOW_SECRET_KEY` and `FLOW_PRODUCTION` from the
    /// environment. The keys are required; production is opt-in.
    pub fn from_env() -> Result<Self, FlowError> {
        let api_key = std::env::var("FLOW_API_KEY")
            .map_err(|_| FlowError::Config("FLOW_API_KEY is not set".to_string()))?;
        let secret_key = std::env::var("FLOW_SECRET_KEY")
            .map_err(|_| FlowError::Config("FLOW_SECRET_KEY is not set".to_string()))?;

        let production = std::env::var("FLOW_PRODUCTION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            api_key,
            secret_key,
            mode: if production {
                Mode::Production
            } else {
                Mode::Sandbox
            },
        })
    }
}

/// Authenticated Flow API client.
///
/// The base URL is fixed at construction. Switching between sandbox and
/// production means constructing a new client, so concurrent callers never
/// observe a half-switched environment. Everything else is immutable and the
/// client is cheap to clone and share.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    secret_key: String,
    base: Url,
}

impl Client {
    /// Client for the environment selected in `config`.
    pub fn new(config: Config) -> Self {
        let base = Url::parse(config.mode.base_url()).expect("built-in base URL is valid");
        Self::from_parts(config, base)
    }

    /// Client pointed at an arbitrary base URL. Intended for tests and
    /// self-hosted mirrors; the base may carry its own path (e.g. `/api`).
    pub fn with_base_url(config: Config, base_url: &str) -> Result<Self, FlowError> {
        let base = Url::parse(base_url)
            .map_err(|e| FlowError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FlowError::Config(format!(
                "base URL {base_url:?} cannot carry a path"
            )));
        }
        Ok(Self::from_parts(config, base))
    }

    fn from_parts(config: Config, base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key,
            secret_key: config.secret_key,
            base,
        }
    }

    /// Join an endpoint path onto the base URL, keeping the base's own path
    /// segments (the public hosts serve under `/api`).
    fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().expect("base URL can be a base");
            segments.pop_if_empty();
            segments.extend(endpoint.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    /// Insert the identity key, then compute the `s` signature over the
    /// resulting set. The signature never covers itself.
    fn signed_params(&self, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
        params.insert(API_KEY_FIELD.to_string(), self.api_key.clone());
        let sig = signature::sign(&self.secret_key, &params);
        params.insert(SIGNATURE_FIELD.to_string(), sig);
        params
    }

    /// Address and sign a GET request. All parameters, identity key and
    /// signature included, go into the query string. Performs no I/O.
    pub fn build_get(&self, endpoint: &str, params: BTreeMap<String, String>) -> reqwest::Request {
        let params = self.signed_params(params);
        let mut url = self.endpoint_url(endpoint);
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &params {
                query.append_pair(name, value);
            }
        }
        reqwest::Request::new(Method::GET, url)
    }

    /// Address and sign a POST request. All parameters go into a
    /// form-encoded body. Performs no I/O.
    pub fn build_post(&self, endpoint: &str, params: BTreeMap<String, String>) -> reqwest::Request {
        let params = self.signed_params(params);
        let url = self.endpoint_url(endpoint);

        let mut form = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &params {
            form.append_pair(name, value);
        }

        let mut request = reqwest::Request::new(Method::POST, url);
        request.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        *request.body_mut() = Some(form.finish().into());
        request
    }

    /// Execute a built request: exactly one round trip, no retries.
    ///
    /// 2xx yields the raw body for the caller to decode. Non-2xx is shaped
    /// into [`FlowError::Remote`] when the body parses as `{message, code}`,
    /// [`FlowError::Status`] otherwise. Connection-level failures come back
    /// as [`FlowError::Transport`].
    pub async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::Request,
    ) -> Result<Vec<u8>, FlowError> {
        tracing::debug!(operation, url = %request.url(), "sending request to Flow");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| FlowError::Transport { operation, source: e })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FlowError::Transport { operation, source: e })?;

        classify_response(operation, status, &body)?;
        Ok(body.to_vec())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> Result<T, FlowError> {
        let request = self.build_get(endpoint, params);
        let body = self.execute(operation, request).await?;
        decode(operation, &body)
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> Result<T, FlowError> {
        let request = self.build_post(endpoint, params);
        let body = self.execute(operation, request).await?;
        decode(operation, &body)
    }
}

/// Split 2xx from everything else and shape the failure.
fn classify_response(
    operation: &'static str,
    status: StatusCode,
    body: &[u8],
) -> Result<(), FlowError> {
    if status.is_success() {
        return Ok(());
    }

    match serde_json::from_slice::<RemoteError>(body) {
        Ok(remote) => {
            tracing::warn!(
                operation,
                code = remote.code,
                message = %remote.message,
                "Flow rejected the request"
            );
            Err(FlowError::Remote {
                operation,
                code: remote.code,
                message: remote.message,
            })
        }
        Err(_) => Err(FlowError::Status {
            operation,
            status: status.as_u16(),
        }),
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T, FlowError> {
    serde_json::from_slice(body).map_err(|e| FlowError::Decode { operation, source: e })
}
