use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionBackend, CompletionRequest};
use crate::AiError;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

impl Reply {
    fn into_result(self) -> Result<String, AiError> {
        match self {
            Reply::Text(t) => Ok(t),
            Reply::Fail(m) => Err(AiError::Upstream {
                status: 500,
                message: m,
            }),
        }
    }
}

/// Test backend with canned replies. Every request it receives is recorded.
///
/// Queued replies are consumed in order; once the queue is empty the default
/// reply is returned for every further call.
pub struct MockBackend {
    default: Reply,
    queue: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    /// Always answer with `text`.
    pub fn success(text: &str) -> Self {
        Self::with_default(Reply::Text(text.to_string()))
    }

    /// Always fail with an upstream error carrying `message`.
    pub fn failure(message: &str) -> Self {
        Self::with_default(Reply::Fail(message.to_string()))
    }

    fn with_default(default: Reply) -> Self {
        Self {
            default,
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies to hand out before falling back to the default.
    pub fn then(self, replies: Vec<&str>) -> Self {
        if let Ok(mut q) = self.queue.lock() {
            q.extend(replies.into_iter().map(|r| Reply::Text(r.to_string())));
        }
        self
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String, AiError> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(req.clone());
        }
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| self.default.clone()).into_result()
    }
}
