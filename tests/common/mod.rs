#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ozon_performance::{
    ApiError, Credentials, HttpRequest, HttpResponse, OzonClient, RetryPolicy, Transport,
};

pub const CLIENT_ID: &str = "test_client_id";
pub const API_KEY: &str = "test_api_key";

/// Replays canned outcomes in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(&self, error: ApiError) -> &Self {
        self.outcomes.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("no scripted response left")))
    }
}

pub fn no_sleep(_: Duration) {}

pub fn credentials() -> Credentials {
    Credentials::new(CLIENT_ID, API_KEY).unwrap()
}

pub fn client_with(transport: &Arc<ScriptedTransport>, max_retries: u32) -> OzonClient {
    OzonClient::builder(credentials())
        .retry_policy(RetryPolicy::new(max_retries, 0.0).with_sleep(no_sleep))
        .transport(Arc::clone(transport))
        .build()
        .unwrap()
}
