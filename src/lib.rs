//! Blocking client for the Ozon Performance advertising API.
//!
//! Requests are signed with HMAC-SHA256 and retried with exponential backoff
//! when the API throttles or fails on its side.

pub mod config;
pub mod models;
pub mod services;

pub use config::{Config, ConfigError};
pub use models::{Ad, AdGroup, Campaign, Statistic, StatsQuery};
pub use services::error::{ApiError, ErrorKind};
pub use services::executor::{Credentials, OzonClient, OzonClientBuilder, DEFAULT_BASE_URL};
pub use services::retry::RetryPolicy;
pub use services::transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
