use std::fmt;

use thiserror::Error;

/// Coarse cause of a failed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider rejected the request.
    Service,
    /// The request could not be completed.
    Transport,
    /// Raised by this crate, not by the provider.
    Logical,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    AccessDenied,
    PreconditionFailed,
    Other { status: u16, code: Option<String> },
}

impl ServiceErrorKind {
    /// Classifies a rejected request from its HTTP status and provider error code.
    pub fn classify(status: u16, code: Option<&str>) -> Self {
        match (status, code) {
            // a missing bucket must not read as a missing key
            (_, Some("NoSuchBucket")) => ServiceErrorKind::Other {
                status,
                code: code.map(str::to_string),
            },
            (_, Some("NoSuchKey")) | (_, Some("NotFound")) | (404, _) => ServiceErrorKind::NotFound,
            (_, Some("AccessDenied")) | (403, _) => ServiceErrorKind::AccessDenied,
            (_, Some("PreconditionFailed")) | (412, _) => ServiceErrorKind::PreconditionFailed,
            // concurrent conditional write on the same key
            (409, Some("ConditionalRequestConflict")) => ServiceErrorKind::PreconditionFailed,
            (status, code) => ServiceErrorKind::Other {
                status,
                code: code.map(str::to_string),
            },
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::NotFound => write!(f, "not found"),
            ServiceErrorKind::AccessDenied => write!(f, "access denied"),
            ServiceErrorKind::PreconditionFailed => write!(f, "precondition failed"),
            ServiceErrorKind::Other { status, code } => match code {
                Some(code) => write!(f, "{} (status {})", code, status),
                None => write!(f, "status {}", status),
            },
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    #[error("{operation} rejected for `{key}`: {kind}: {message}")]
    Service {
        operation: &'static str,
        key: String,
        kind: ServiceErrorKind,
        message: String,
    },
    #[error("{operation} failed for `{key}`: {message}")]
    Transport {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Service { .. } => FailureKind::Service,
            ProviderError::Transport { .. } => FailureKind::Transport,
        }
    }

    pub fn service_kind(&self) -> Option<&ServiceErrorKind> {
        match self {
            ProviderError::Service { kind, .. } => Some(kind),
            ProviderError::Transport { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.service_kind(), Some(ServiceErrorKind::NotFound))
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self.service_kind(), Some(ServiceErrorKind::PreconditionFailed))
    }
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("object `{key}` already exists and overwrite is disabled")]
    AlreadyExists { key: String },

    #[error("object `{key}` does not exist")]
    NotFound { key: String },

    #[error("could not determine whether `{key}` exists")]
    ExistenceUnknown {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("copy of `{from}` to `{to}` returned no result")]
    EmptyCopyResult { from: String, to: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{operation} of `{prefix}` stopped after {completed} objects")]
    FolderIncomplete {
        operation: &'static str,
        prefix: String,
        completed: usize,
        #[source]
        source: Box<OperationError>,
    },
}

impl OperationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            OperationError::InvalidKey { .. }
            | OperationError::AlreadyExists { .. }
            | OperationError::EmptyCopyResult { .. } => FailureKind::Logical,
            OperationError::NotFound { .. } => FailureKind::Service,
            OperationError::ExistenceUnknown { source, .. } => source.kind(),
            OperationError::Provider(err) => err.kind(),
            OperationError::FolderIncomplete { source, .. } => source.kind(),
        }
    }
}

/// Local failures while building a session; no remote call is made at build time.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("invalid bucket uri `{0}`, expected s3://<bucket> or gs://<bucket>")]
    BucketUri(String),
}
