use reqwest::{StatusCode, header::InvalidHeaderValue};
use thiserror::Error;

/// Error that can occur while reading the sensors of the PDU.
#[derive(Error, Debug)]
pub enum CallError {
    /// The credentials cannot be sent in an HTTP header.
    #[error("auth should make a valid http header")]
    InvalidCredentials(#[source] InvalidHeaderValue),
    #[error("failed to initialize HTTP client")]
    Client(#[source] reqwest::Error),
    /// The request could not be sent, or the response could not be received.
    #[error("could not send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a 4xx or 5xx status.
    #[error("server responded with error: {status}\n{body}")]
    Status { status: StatusCode, body: String },
    /// The JSON-RPC call itself failed.
    #[error("rpc call failed with code {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed bulk response")]
    Decode(#[from] serde_json::Error),
    #[error("rpc response has neither a result nor an error")]
    MissingResult,
}

/// The two families of [`CallError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing usable came back from the device: connection, TLS, HTTP or RPC failure.
    Transport,
    /// A response came back but it does not have the expected shape.
    Decode,
}

impl CallError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CallError::InvalidCredentials(_)
            | CallError::Client(_)
            | CallError::Transport { .. }
            | CallError::Status { .. }
            | CallError::Rpc { .. } => FailureKind::Transport,
            CallError::Decode(_) | CallError::MissingResult => FailureKind::Decode,
        }
    }
}
