//! Mock AI backend for testing
//!
//! Replies can be scripted ahead of time; without a script the mock
//! echoes the incoming message. Requests are recorded so tests can
//! assert on what was actually sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::types::{GenerateReply, GenerateRequest};
use super::AiBackend;
use crate::error::{Error, Result};

/// Scripted backend used in tests and offline development
#[derive(Clone, Default)]
pub struct MockBackend {
    scripted: Arc<Mutex<VecDeque<Result<GenerateReply>>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply; replies are consumed in order
    pub fn enqueue(&self, reply: GenerateReply) {
        self.scripted.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a transport failure
    pub fn enqueue_error(&self, message: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Err(Error::InvalidData(message.into())));
    }

    /// Requests seen so far, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AiBackend for MockBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply> {
        let message = request.message.clone();
        self.requests.lock().unwrap().push(request);
        match self.scripted.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(GenerateReply {
                text: format!("(mock) {}", message),
                ..Default::default()
            }),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_without_script() {
        let mock = MockBackend::new();
        let reply = mock
            .generate(GenerateRequest::simple("sys", "hello"))
            .await
            .unwrap();
        assert_eq!(reply.text, "(mock) hello");
    }

    #[tokio::test]
    async fn test_mock_scripted_replies_in_order() {
        let mock = MockBackend::new();
        mock.enqueue(GenerateReply {
            text: "first".into(),
            ..Default::default()
        });
        mock.enqueue_error("boom");

        let reply = mock
            .generate(GenerateRequest::simple("sys", "a"))
            .await
            .unwrap();
        assert_eq!(reply.text, "first");

        let err = mock.generate(GenerateRequest::simple("sys", "b")).await;
        assert!(err.is_err());
        assert_eq!(mock.requests().len(), 2);
    }
}
