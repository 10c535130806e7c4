pub mod codec;

use serde::{Deserialize, Serialize};

pub use codec::{CodecError, MAX_FRAME_LEN};

/// One key/value pair as it travels to and from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreRequest {
    /// Must be the first request on a connection.
    OpenSession {
        user: String,
        password: String,
        database: String,
    },
    /// Write every pair in one transaction.
    SetAll { kvs: Vec<KeyValue> },
    /// Read the values for `keys`, answered in request order.
    GetAll { keys: Vec<Vec<u8>> },
    Ping,
    CloseSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreResponse {
    SessionOpened { session_id: u64 },
    Written { tx_id: u64, count: u32 },
    /// One slot per requested key; `None` where the store holds no value.
    Values { entries: Vec<Option<Vec<u8>>> },
    Pong,
    Closed,
    Error(String),
}

impl StoreRequest {
    pub fn name(&self) -> &'static str {
        match self {
            StoreRequest::OpenSession { .. } => "OpenSession",
            StoreRequest::SetAll { .. } => "SetAll",
            StoreRequest::GetAll { .. } => "GetAll",
            StoreRequest::Ping => "Ping",
            StoreRequest::CloseSession => "CloseSession",
        }
    }
}

impl StoreResponse {
    pub fn name(&self) -> &'static str {
        match self {
            StoreResponse::SessionOpened { .. } => "SessionOpened",
            StoreResponse::Written { .. } => "Written",
            StoreResponse::Values { .. } => "Values",
            StoreResponse::Pong => "Pong",
            StoreResponse::Closed => "Closed",
            StoreResponse::Error(_) => "Error",
        }
    }
}
