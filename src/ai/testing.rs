//! In-memory backend for tests: replays scripted outcomes and records every
//! request it receives.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::backend::{GenerationBackend, GenerationRequest, GenerationResponse};
use crate::error::BackendError;

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<GenerationResponse, BackendError> + Send + Sync>;

pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<GenerationResponse, BackendError>>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Replay `outcomes` in order; further calls fail with a network error
    pub fn new(outcomes: Vec<Result<String, BackendError>>) -> Self {
        Self {
            script: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|o| o.map(GenerationResponse::from_text))
                    .collect(),
            ),
            responder: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every call (after the script runs out) with `f`
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<GenerationResponse, BackendError> + Send + Sync + 'static,
    {
        Self::new(Vec::new()).with_responder(f)
    }

    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<GenerationResponse, BackendError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(f));
        self
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.prompt_text()).collect()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match (scripted, &self.responder) {
            (Some(outcome), _) => outcome,
            (None, Some(responder)) => responder(request),
            (None, None) => Err(BackendError::network("script exhausted")),
        }
    }
}
