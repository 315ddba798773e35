use thiserror::Error;

/// Flat classification of [`ApiError`], used by the retry policy to decide
/// which failures are transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    RateLimit,
    InvalidRequest,
    Server,
    Api,
    Transport,
    Parse,
    Signing,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    Authentication {
        message: String,
        status: Option<u16>,
    },

    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    RateLimit {
        message: String,
        status: Option<u16>,
    },

    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    InvalidRequest {
        message: String,
        status: Option<u16>,
    },

    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    Server {
        message: String,
        status: Option<u16>,
    },

    /// Any other non-success status that does not fit the kinds above.
    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    Api {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// No response was received: DNS, connect, TLS or timeout failures.
    #[error("Ozon API Error: transport failure: {message}")]
    Transport { message: String },

    #[error("Ozon API Error{}: {message}", status_prefix(.status))]
    Parse {
        message: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Ozon API Error: failed to sign request: {0}")]
    Signing(#[from] openssl::error::ErrorStack),
}

fn status_prefix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest {
            message: message.into(),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status to the matching error variant.
    ///
    /// 401/403 are authentication failures, 429 is throttling, every 5xx is a
    /// server fault and the remaining 4xx are rejected requests. Anything else
    /// (1xx, 3xx) falls back to the generic [`ApiError::Api`] with the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("API request failed with status {status}")
        } else {
            format!("API request failed with status {status}: {}", body.trim())
        };
        let status_code = Some(status);

        match status {
            401 | 403 => ApiError::Authentication {
                message,
                status: status_code,
            },
            429 => ApiError::RateLimit {
                message,
                status: status_code,
            },
            500..=599 => ApiError::Server {
                message,
                status: status_code,
            },
            400..=499 => ApiError::InvalidRequest {
                message,
                status: status_code,
            },
            _ => ApiError::Api {
                message,
                status: status_code,
                body: Some(body.to_string()),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Authentication { .. } => ErrorKind::Authentication,
            ApiError::RateLimit { .. } => ErrorKind::RateLimit,
            ApiError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Api { .. } => ErrorKind::Api,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Parse { .. } => ErrorKind::Parse,
            ApiError::Signing(_) => ErrorKind::Signing,
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. }
            | ApiError::RateLimit { status, .. }
            | ApiError::InvalidRequest { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Api { status, .. }
            | ApiError::Parse { status, .. } => *status,
            ApiError::Transport { .. } | ApiError::Signing(_) => None,
        }
    }

    /// Raw response text kept for diagnostics.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Api { body, .. } => body.as_deref(),
            ApiError::Parse { body, .. } => Some(body),
            _ => None,
        }
    }
}
