use thiserror::Error;

/// Failure reported by a [`crate::PermitSource`].
///
/// `Offline` and `Connect` mean the server was never reached; the orchestrator
/// treats those as fatal for the whole search chain. Everything else means the
/// server answered badly and the nearby fallback is still worth trying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network offline")]
    Offline,

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status code, when the server was reached.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no request could reach the server.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Offline | TransportError::Connect(_))
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("network offline, cannot fetch permits")]
    Offline,

    #[error("failed to connect to the server: {0}")]
    Connectivity(String),

    #[error("an error occurred while searching nearby addresses: {0}")]
    NearbyFailed(String),

    #[error("no history frame at index {index} (history has {len} frames)")]
    InvalidFrame { index: usize, len: usize },

    #[error("search {ticket} was superseded by a newer search")]
    Superseded { ticket: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
