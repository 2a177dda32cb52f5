use std::io;
use std::process::ExitStatus;
use std::time::Duration;

/// Errors from wire framing on a single connection.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("peer closed the connection before a complete frame arrived")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Request validation failures, framed back to the caller as plain text.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid nonce: {len} bytes exceeds the {max}-byte limit")]
    NonceTooLarge { len: usize, max: usize },
}

/// Failures from the external attestation tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    #[error("failed to run attestation tool: {0}")]
    Spawn(#[source] io::Error),

    #[error("attestation tool timed out after {budget:?}")]
    Timeout { budget: Duration },

    #[error("attestation tool exited with {status}: {stderr}")]
    NonzeroExit { status: ExitStatus, stderr: String },

    #[error("attestation tool returned no document: {stderr}")]
    EmptyOutput { stderr: String },
}

/// Errors converted into a framed error response at the connection
/// boundary. Everything else aborts the connection (or, for setup
/// failures, the process) instead of producing a response.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Attestation(#[from] AttestError),
}

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Attestation(#[from] AttestError),

    /// Fatal listener setup failure (bind/listen). Never recovered from.
    #[error("listener setup failed: {0}")]
    Setup(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
