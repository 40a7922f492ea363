use thiserror::Error;

use crate::protocol::Endpoint;

/// Failure of an exchange before a structured payload could be read.
///
/// Backend-reported failures are not errors at this level: they arrive as an
/// `error` field inside an otherwise well-formed reply.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{endpoint}: request failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
    #[error("{endpoint}: request timed out")]
    Timeout { endpoint: Endpoint },
    #[error("{endpoint}: malformed response body: {message}")]
    Decode { endpoint: Endpoint, message: String },
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl GatewayError {
    pub fn transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint,
            message: message.into(),
        }
    }

    pub fn decode(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint,
            message: message.into(),
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Timeout { endpoint }
            | Self::Decode { endpoint, .. } => Some(*endpoint),
            Self::InvalidUrl(_) | Self::Client(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
