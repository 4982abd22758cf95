use thiserror::Error;

use crate::host::ElementId;

/// Failure reported by a host service (storage quota, denied clipboard, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{0} is not available in this environment")]
    Unavailable(&'static str),
    #[error("{0}")]
    Failed(String),
}

/// Configuration defects found while registering an element for reveal.
///
/// These never abort the page: the offending element is skipped and the
/// defect is logged and reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    #[error("{0} is not attached to the document")]
    Detached(ElementId),
    #[error("{element} has no counter target (looked for {attributes:?})")]
    MissingCounterTarget {
        element: ElementId,
        attributes: Vec<String>,
    },
    #[error("{element} has a non-numeric counter target {value:?}")]
    InvalidCounterTarget { element: ElementId, value: String },
    #[error("{element} has a negative counter target {value}")]
    NegativeCounterTarget { element: ElementId, value: i64 },
    #[error("{0} has neither a data-progress attribute nor an inline width")]
    MissingProgressWidth(ElementId),
    #[error("{0} is already registered for this reveal kind")]
    AlreadyRegistered(ElementId),
}

impl RevealError {
    pub fn element(&self) -> ElementId {
        match self {
            RevealError::Detached(el)
            | RevealError::MissingProgressWidth(el)
            | RevealError::AlreadyRegistered(el) => *el,
            RevealError::MissingCounterTarget { element, .. }
            | RevealError::InvalidCounterTarget { element, .. }
            | RevealError::NegativeCounterTarget { element, .. } => *element,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend: {0}")]
    Host(#[from] HostError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unrecognized date {0:?}")]
    InvalidDate(String),
}
