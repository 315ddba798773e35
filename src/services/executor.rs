use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::Url;
use serde_json::Value;

use crate::config::{Config, ConfigError};
use crate::services::crypto::{canonize_body, RequestSigner};
use crate::services::error::ApiError;
use crate::services::retry::RetryPolicy;
use crate::services::transport::{HttpMethod, HttpRequest, ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://performance.ozon.ru/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client identifier and secret key issued by Ozon Performance.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    api_key: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        let api_key = api_key.into();
        if client_id.trim().is_empty() || api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Credentials { client_id, api_key })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &"***")
            .finish()
    }
}

/// Signed, retrying client for the Ozon Performance API.
///
/// Every physical attempt gets its own timestamp and signature. Calls block
/// until all retries and backoff sleeps are done.
pub struct OzonClient {
    credentials: Credentials,
    base_url: String,
    host: String,
    signer: RequestSigner,
    retry_policy: RetryPolicy,
    transport: Box<dyn Transport>,
}

pub struct OzonClientBuilder {
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    transport: Option<Box<dyn Transport>>,
}

impl OzonClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout applied by the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Replaces the default `reqwest` transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn build(self) -> Result<OzonClient, ConfigError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let host = host_header(&base_url)?;

        let signer = RequestSigner::new(self.credentials.api_key())
            .map_err(|e| ConfigError::InvalidValue {
                key: "api_key".to_string(),
                value: e.to_string(),
            })?;

        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new(self.timeout)?),
        };

        Ok(OzonClient {
            credentials: self.credentials,
            base_url,
            host,
            signer,
            retry_policy: self.retry_policy,
            transport,
        })
    }
}

fn host_header(base_url: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "base_url".to_string(),
        value: base_url.to_string(),
    };

    let url = Url::parse(base_url).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

impl OzonClient {
    pub fn builder(credentials: Credentials) -> OzonClientBuilder {
        OzonClientBuilder {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            transport: None,
        }
    }

    pub fn new(credentials: Credentials) -> Result<Self, ConfigError> {
        Self::builder(credentials).build()
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::builder(config.credentials()?)
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .retry_policy(RetryPolicy::new(config.max_retries, config.backoff_factor))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Issues one logical API call with a method given by name.
    ///
    /// Unsupported methods fail with [`ApiError::InvalidRequest`] before any
    /// network attempt.
    pub fn execute(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let method: HttpMethod = method.parse()?;
        self.request(method, endpoint, body)
    }

    /// Issues one logical API call, retrying transient failures per the
    /// client's [`RetryPolicy`].
    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let body = if method.carries_body() {
            canonize_body(body)?
        } else {
            String::new()
        };
        let operation_name = format!("{method} {endpoint}");

        self.retry_policy.run(&operation_name, |attempt| {
            self.attempt(method, endpoint, &body, attempt)
        })
    }

    fn attempt(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &str,
        attempt: u32,
    ) -> Result<Value, ApiError> {
        let request = self.signed_request(method, endpoint, body)?;
        debug!("{} {} (attempt {})", method, endpoint, attempt + 1);

        let response = self.transport.send(&request)?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::Parse {
            message: format!("API response parse error: {e}: {}", response.body),
            status: Some(response.status),
            body: response.body,
        })
    }

    fn signed_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &str,
    ) -> Result<HttpRequest, ApiError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.signer.sign(&timestamp, method.as_str(), endpoint, body)?;

        let headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("Host", self.host.clone()),
            ("Client-Id", self.credentials.client_id.clone()),
            ("Api-Key", self.credentials.api_key.clone()),
            ("X-Signature", signature),
            ("X-Timestamp", timestamp),
        ];

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body: method.carries_body().then(|| body.to_string()),
        })
    }
}
