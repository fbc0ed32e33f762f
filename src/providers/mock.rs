/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working(kind)` - Always succeeds, echoing the prompt as content
 * - `MockProvider::intermittent(kind, n)` - Fails every nth request
 * - `MockProvider::failing(kind)` - Always fails with an error
 * - `MockProvider::empty(kind)` - Succeeds with no content
 *
 * Every request is recorded so tests can assert on the prompts a provider saw.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, MediaKind, MediaProvider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `MOCK <kind>: <prompt>` as content
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty content
    Empty,
}

/// Mock provider for testing generation behavior
#[derive(Debug)]
pub struct MockProvider {
    kind: MediaKind,
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(kind: MediaKind, behavior: MockBehavior) -> Self {
        Self {
            kind,
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working(kind: MediaKind) -> Self {
        Self::new(kind, MockBehavior::Working)
    }

    pub fn intermittent(kind: MediaKind, fail_every: usize) -> Self {
        Self::new(kind, MockBehavior::Intermittent { fail_every })
    }

    pub fn failing(kind: MediaKind) -> Self {
        Self::new(kind, MockBehavior::Failing)
    }

    pub fn empty(kind: MediaKind) -> Self {
        Self::new(kind, MockBehavior::Empty)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.prompt.clone()).collect()
    }

    /// Content a working mock returns for a prompt
    pub fn content_for(kind: MediaKind, prompt: &str) -> Bytes {
        Bytes::from(format!("MOCK {}: {}", kind, prompt))
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl MediaProvider for MockProvider {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn is_mock(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::content_for(self.kind, &request.prompt)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::content_for(self.kind, &request.prompt))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(Bytes::new()),
        }
    }
}
