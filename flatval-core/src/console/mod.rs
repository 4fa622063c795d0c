//! Evaluation Console
//!
//! This module connects the deserializer to the remote evaluator.
//!
//! # Flow
//!
//! 1. Look up (or create) the session id of the tab the code came from.
//! 2. POST `{ code, sessionId }` to the evaluation endpoint through a
//!    `Transport`, bounded by the configured timeout.
//! 3. On an error status, surface the evaluator's `error` message.
//! 4. Otherwise parse the body as a serialized graph and deserialize it.
//!
//! Each call owns its graph and its resolver, so any number of
//! evaluations from different tabs can be in flight at once. The only
//! shared state is the session registry.

mod config;
mod session;
mod transport;

pub use config::ConsoleConfig;
pub use session::SessionRegistry;
pub use transport::{EvalRequest, MemoryTransport, RecordedRequest, Reply, Transport, TransportError};

use std::time::Duration;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::value::Materialized;
use crate::wire::SerializedGraph;

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Why an evaluation produced no value.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),

    /// The evaluator answered with an error status.
    #[error("{0}")]
    Remote(String),

    #[error("could not decode result: {0}")]
    Decode(#[from] DecodeError),
}

/// Client side of the evaluation console.
#[derive(Debug)]
pub struct Console<T> {
    config: ConsoleConfig,
    sessions: SessionRegistry,
    transport: T,
}

impl<T: Transport> Console<T> {
    pub fn new(config: ConsoleConfig, transport: T) -> Self {
        Self {
            config,
            sessions: SessionRegistry::new(),
            transport,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a fresh evaluator context for `tab`.
    pub fn reset_session(&self, tab: &str) -> String {
        self.sessions.reset(tab)
    }

    /// Evaluate `code` in the context of `tab` and rebuild the result.
    pub async fn evaluate(&self, code: &str, tab: &str) -> Result<Materialized, EvalError> {
        let session_id = self.sessions.session_for(tab);
        let url = self.config.endpoint();
        debug!(tab, session = %session_id, url = %url, "evaluating code");

        let request = EvalRequest {
            code: code.to_owned(),
            session_id,
        };

        let timeout = self.config.request_timeout();
        let reply = match tokio::time::timeout(timeout, self.transport.post(&url, &request)).await {
            Ok(reply) => reply?,
            Err(_) => {
                warn!(tab, ?timeout, "evaluation timed out");
                return Err(EvalError::Timeout(timeout));
            }
        };

        if !reply.is_success() {
            let message = remote_error_message(&reply.body);
            warn!(tab, status = reply.status, error = %message, "evaluator returned an error");
            return Err(EvalError::Remote(message));
        }

        let graph = SerializedGraph::from_slice(&reply.body)?;
        Ok(graph.deserialize()?)
    }
}

/// Message for a failed reply.
///
/// A body that is not JSON reports its parse error. Otherwise a non-empty
/// `error` field is the message; a missing, empty or falsy one falls back to
/// `UNKNOWN_ERROR`.
fn remote_error_message(body: &[u8]) -> String {
    let body: JsonValue = match serde_json::from_slice(body) {
        Ok(body) => body,
        Err(e) => return e.to_string(),
    };
    match body.get("error") {
        Some(JsonValue::String(message)) if !message.is_empty() => message.clone(),
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) | Some(JsonValue::String(_)) => {
            UNKNOWN_ERROR.to_owned()
        }
        Some(JsonValue::Number(n)) if n.as_f64() == Some(0.0) => UNKNOWN_ERROR.to_owned(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::wire::SerializedItem;

    fn console() -> Console<MemoryTransport> {
        Console::new(ConsoleConfig::new("http://eval.test"), MemoryTransport::new())
    }

    fn graph_reply(graph: &SerializedGraph) -> Reply {
        Reply::ok(graph.to_json().unwrap())
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(remote_error_message(br#"{"error":"boom"}"#), "boom");
        assert_eq!(remote_error_message(br#"{"error":""}"#), UNKNOWN_ERROR);
        assert_eq!(remote_error_message(br#"{"other":1}"#), UNKNOWN_ERROR);
        assert_eq!(remote_error_message(br#"{"error":0}"#), UNKNOWN_ERROR);
        assert_eq!(remote_error_message(br#"{"error":42}"#), "42");
        assert!(remote_error_message(b"<html>").contains("expected value"));
    }

    #[tokio::test]
    async fn evaluate_posts_code_with_tab_session() {
        let console = console();
        let graph = SerializedGraph::new("r").with("r", SerializedItem::number(2.0));
        console.transport().push_reply(graph_reply(&graph));

        let value = console.evaluate("1 + 1", "tab-a").await.unwrap();
        assert_eq!(value.root(), &Value::Number(2.0));

        let requests = console.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://eval.test/eval");
        assert_eq!(requests[0].request.code, "1 + 1");
        assert_eq!(
            Some(requests[0].request.session_id.clone()),
            console.sessions().get("tab-a")
        );
    }

    #[tokio::test]
    async fn reset_changes_the_session_sent() {
        let console = console();
        let graph = SerializedGraph::new("r").with("r", SerializedItem::undefined());
        console.transport().push_reply(graph_reply(&graph));
        console.transport().push_reply(graph_reply(&graph));

        console.evaluate("let x = 1", "tab").await.unwrap();
        let fresh = console.reset_session("tab");
        console.evaluate("x", "tab").await.unwrap();

        let requests = console.transport().requests();
        assert_ne!(requests[0].request.session_id, requests[1].request.session_id);
        assert_eq!(requests[1].request.session_id, fresh);
    }

    #[tokio::test]
    async fn error_status_surfaces_remote_message() {
        let console = console();
        console
            .transport()
            .push_reply(Reply::new(400, r#"{"error":"ReferenceError: y is not defined"}"#));

        match console.evaluate("y", "tab").await.unwrap_err() {
            EvalError::Remote(message) => assert_eq!(message, "ReferenceError: y is not defined"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_graph_is_a_decode_error() {
        let console = console();
        console
            .transport()
            .push_reply(Reply::ok(r#"{"root":"x","serialized":{}}"#));

        let err = console.evaluate("x", "tab").await.unwrap_err();
        assert!(matches!(
            err,
            EvalError::Decode(DecodeError::UnknownReference { .. })
        ));
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let console = console();
        console.transport().push_failure("connection refused");

        let err = console.evaluate("1", "tab").await.unwrap_err();
        assert!(matches!(err, EvalError::Transport(TransportError::Failed { .. })));
    }
}
