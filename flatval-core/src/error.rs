use thiserror::Error;

use crate::wire::{NodeId, NodeKind};

/// Why a wire payload could not be turned into a value.
///
/// Every variant aborts the whole deserialization; there is no partial
/// result.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("reference to unknown node '{id}'")]
    UnknownReference { id: NodeId },

    #[error("node '{id}' has unknown type '{kind}'")]
    UnknownKind { id: NodeId, kind: String },

    #[error("node '{id}' has an invalid {kind} payload: {reason}")]
    InvalidPayload {
        id: NodeId,
        kind: NodeKind,
        reason: String,
    },

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("malformed msgpack payload: {0}")]
    MalformedMsgpack(#[from] rmp_serde::decode::Error),
}

impl DecodeError {
    /// The node the error is about, if it concerns a single node.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::UnknownReference { id }
            | Self::UnknownKind { id, .. }
            | Self::InvalidPayload { id, .. } => Some(id),
            Self::Malformed(_) | Self::MalformedMsgpack(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
