//! Attestation proxy for AWS Nitro Enclaves.
//!
//! Accepts a caller-supplied nonce over a length-prefixed vsock protocol,
//! invokes the external attestation document retriever with a fixed,
//! injection-safe argument vector, and returns the signed document (or a
//! plain-text error) framed the same way. The document itself is opaque
//! here; verification belongs to relying parties.

pub mod attestation;
pub mod error;
pub mod frame;
pub mod nonce;
pub mod proxy;
pub mod transport;

// Re-export key types at crate root for convenience.
pub use attestation::{AttestationDocument, AttestationProvider, ToolInvocation, ToolProvider};
pub use error::{Error, Result};
pub use frame::{FrameChannel, FrameCodec};
pub use nonce::{Nonce, MAX_NONCE_LEN};
