use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Remote fetch failed: {api} - {message}")]
    RemoteFetch {
        api: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// A remote call that never produced an HTTP status (connect or timeout)
    pub fn remote_fetch(api: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteFetch {
            api: api.into(),
            status: None,
            message: message.into(),
        }
    }

    /// A remote call that completed with an HTTP status but no usable response
    pub fn remote_status(api: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::RemoteFetch {
            api: api.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Only remote failures qualify: transport errors without a status,
    /// rate limiting (429) and server errors (5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RemoteFetch { status: None, .. } => true,
            Self::RemoteFetch {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}
