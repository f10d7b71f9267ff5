use thiserror::Error;

/// Failure of one API call. A batch fails with the first of these it sees.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, timeout, TLS and other transport failures.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with a non-2xx status.
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: u16,
        /// Decoded error body (`null` when empty, a string when not JSON).
        body: serde_json::Value,
    },

    #[error("invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The task carrying a batched request panicked or was aborted.
    #[error("request task failed: {0}")]
    Task(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Error code reported by the API (`error_code` field of the body), used by the UI's message lookup.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.get("error_code").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_exposes_code() {
        let err = ApiError::Status {
            endpoint: "/api/share".into(),
            status: 409,
            body: json!({ "error_code": "ERR_EXISTS", "reason": "already shared" }),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.error_code(), Some("ERR_EXISTS"));
        assert_eq!(err.to_string(), "/api/share returned 409");
    }

    #[test]
    fn test_task_error_has_no_status() {
        let err = ApiError::Task("panicked".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.error_code(), None);
    }
}
