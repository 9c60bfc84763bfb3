//! Error types for forcepull-bulk.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Get the HTTP status code if this is an API error.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check whether a batch was reported failed by the server.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::BatchFailed { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("HTTP {status} error: {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Batch {batch_id} of job {job_id} failed: {state_message}")]
    BatchFailed {
        job_id: String,
        batch_id: String,
        state_message: String,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Job error: {0}")]
    Job(String),
    #[error("Table error: {0}")]
    Table(String),
}

impl From<forcepull_client::Error> for Error {
    fn from(err: forcepull_client::Error) -> Self {
        // API errors keep their status across the seam.
        let kind = match &err.kind {
            forcepull_client::ErrorKind::Api { status, message } => ErrorKind::Api {
                status: *status,
                message: message.clone(),
            },
            _ => ErrorKind::Transport(err.to_string()),
        };
        Error {
            kind,
            source: Some(Box::new(err)),
        }
    }
}

impl From<forcepull_table::Error> for Error {
    fn from(err: forcepull_table::Error) -> Self {
        Error {
            kind: ErrorKind::Table(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status_across_seam() {
        let client_err = forcepull_client::Error::new(forcepull_client::ErrorKind::Api {
            status: 400,
            message: "InvalidJob: unknown object".to_string(),
        });
        let err: Error = client_err.into();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("InvalidJob"));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_transport_error_wraps_other_client_kinds() {
        let client_err =
            forcepull_client::Error::new(forcepull_client::ErrorKind::Timeout);
        let err: Error = client_err.into();

        assert!(matches!(err.kind, ErrorKind::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_batch_failed_display() {
        let err = Error::new(ErrorKind::BatchFailed {
            job_id: "750x0".to_string(),
            batch_id: "751x0".to_string(),
            state_message: "InvalidBatch: field mismatch".to_string(),
        });

        assert!(err.is_batch_failure());
        let rendered = err.to_string();
        assert!(rendered.contains("751x0"));
        assert!(rendered.contains("750x0"));
        assert!(rendered.contains("InvalidBatch"));
    }
}
