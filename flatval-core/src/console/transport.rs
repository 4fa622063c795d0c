//! Transport Boundary
//!
//! The console does not perform network I/O itself. It hands an
//! `EvalRequest` to a `Transport` and gets back the raw reply; the body of a
//! successful reply is the serialized value graph.

use std::collections::VecDeque;
use std::future::{self, Future};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of an evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalRequest {
    /// Source text typed into the console.
    pub code: String,
    /// Evaluator-side context to run it in.
    pub session_id: String,
}

/// A raw reply from the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 reply.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Failed { url: String, message: String },

    #[error("no reply available for {url}")]
    NoReply { url: String },
}

/// Sends evaluation requests to the evaluator.
pub trait Transport: Send + Sync {
    /// POST `request` as JSON to `url`.
    fn post(
        &self,
        url: &str,
        request: &EvalRequest,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send;
}

/// A request seen by `MemoryTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub request: EvalRequest,
}

/// In-process transport that answers from a queue of scripted replies.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    replies: Mutex<VecDeque<Result<Reply, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next request.
    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().push_back(Ok(reply));
    }

    /// Queue a transport failure for the next request.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().push_back(Err(message.into()));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn respond(&self, url: &str, request: &EvalRequest) -> Result<Reply, TransportError> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_owned(),
            request: request.clone(),
        });

        match self.replies.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(TransportError::Failed {
                url: url.to_owned(),
                message,
            }),
            None => Err(TransportError::NoReply { url: url.to_owned() }),
        }
    }
}

impl Transport for MemoryTransport {
    fn post(
        &self,
        url: &str,
        request: &EvalRequest,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send {
        future::ready(self.respond(url, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_fields() {
        let request = EvalRequest {
            code: "1 + 1".into(),
            session_id: "s-1".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "code": "1 + 1", "sessionId": "s-1" })
        );
    }

    #[test]
    fn success_range() {
        assert!(Reply::ok("{}").is_success());
        assert!(Reply::new(204, "").is_success());
        assert!(!Reply::new(500, "").is_success());
        assert!(!Reply::new(302, "").is_success());
    }

    #[tokio::test]
    async fn memory_transport_replays_in_order() {
        let transport = MemoryTransport::new();
        transport.push_reply(Reply::ok("first"));
        transport.push_failure("connection reset");

        let request = EvalRequest {
            code: "x".into(),
            session_id: "s".into(),
        };

        let reply = transport.post("http://h/eval", &request).await.unwrap();
        assert_eq!(reply.body, b"first");

        let err = transport.post("http://h/eval", &request).await.unwrap_err();
        assert!(matches!(err, TransportError::Failed { .. }));

        let err = transport.post("http://h/eval", &request).await.unwrap_err();
        assert!(matches!(err, TransportError::NoReply { .. }));

        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[0].url, "http://h/eval");
    }
}
