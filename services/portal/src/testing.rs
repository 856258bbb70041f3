//! In-memory fakes for the upstream services

use async_trait::async_trait;
use common::{
    cms::{AgentContent, ContentSource, SiteLabels},
    error::{ClientError, ClientResult},
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    credentials::{AuthApi, AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest},
    search::SearchCriteria,
    webhook::LeadWebhook,
};

/// Scripted [`AuthApi`]; unscripted calls fail with a 503
#[derive(Default)]
pub struct FakeAuthApi {
    login: Mutex<VecDeque<ClientResult<AuthResponse>>>,
    forgot: Mutex<VecDeque<ClientResult<()>>>,
    reset: Mutex<VecDeque<ClientResult<AuthResponse>>>,
    login_calls: AtomicUsize,
    forgot_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    last_login: Mutex<Option<LoginRequest>>,
    last_reset: Mutex<Option<ResetPasswordRequest>>,
}

impl FakeAuthApi {
    pub fn with_login(result: ClientResult<AuthResponse>) -> Self {
        let api = Self::default();
        api.login.lock().unwrap().push_back(result);
        api
    }

    pub fn with_forgot(result: ClientResult<()>) -> Self {
        let api = Self::default();
        api.forgot.lock().unwrap().push_back(result);
        api
    }

    pub fn with_reset(result: ClientResult<AuthResponse>) -> Self {
        let api = Self::default();
        api.reset.lock().unwrap().push_back(result);
        api
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn forgot_calls(&self) -> usize {
        self.forgot_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn last_login(&self) -> Option<LoginRequest> {
        self.last_login.lock().unwrap().clone()
    }

    pub fn last_reset(&self) -> Option<ResetPasswordRequest> {
        self.last_reset.lock().unwrap().clone()
    }
}

fn next<T>(queue: &Mutex<VecDeque<ClientResult<T>>>) -> ClientResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Err(ClientError::Status(503)))
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_login.lock().unwrap() = Some(request.clone());
        next(&self.login)
    }

    async fn forgot_password(&self, _request: &ForgotPasswordRequest) -> ClientResult<()> {
        self.forgot_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.forgot)
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> ClientResult<AuthResponse> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_reset.lock().unwrap() = Some(request.clone());
        next(&self.reset)
    }
}

/// Webhook that records submissions and answers with a fixed outcome
pub struct RecordingWebhook {
    fail_with: Option<u16>,
    submitted: Mutex<Vec<SearchCriteria>>,
}

impl RecordingWebhook {
    pub fn accepting() -> Self {
        Self {
            fail_with: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<SearchCriteria> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadWebhook for RecordingWebhook {
    async fn submit(&self, criteria: &SearchCriteria) -> ClientResult<()> {
        self.submitted.lock().unwrap().push(criteria.clone());
        match self.fail_with {
            Some(status) => Err(ClientError::Status(status)),
            None => Ok(()),
        }
    }
}

/// Content source returning fixed values, or failing when empty
#[derive(Default)]
pub struct StaticContent {
    pub labels: Option<SiteLabels>,
    pub agent: Option<AgentContent>,
}

#[async_trait]
impl ContentSource for StaticContent {
    async fn site_labels(&self) -> ClientResult<SiteLabels> {
        self.labels.clone().ok_or(ClientError::Status(500))
    }

    async fn agent_content(&self) -> ClientResult<Option<AgentContent>> {
        Ok(self.agent.clone())
    }
}
