//! Error types for forcepull-soql.

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
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("HTTP {status} error: {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Normalize error: {0}")]
    Normalize(String),
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
            kind: ErrorKind::Normalize(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
