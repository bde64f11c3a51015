use thiserror::Error;

use crate::events::EventKind;

pub type Result<T, E = ResolverError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] InvalidEventReason),
    #[error("network error: {0}")]
    Network(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a raw event was turned away at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidEventReason {
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("{0:?} events do not carry an angle")]
    UnexpectedAngle(EventKind),
    #[error("angle must be a finite number of degrees")]
    NonFiniteAngle,
}

