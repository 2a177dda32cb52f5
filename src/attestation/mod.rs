pub mod tool;

use async_trait::async_trait;

use crate::error::AttestError;
use crate::nonce::Nonce;

pub use tool::{ToolInvocation, ToolProvider};

/// An attestation document as produced by the attestation tool: opaque
/// base64 text, neither parsed nor cryptographically verified here.
/// Relying parties do that downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationDocument(String);

impl AttestationDocument {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }
}

/// Source of attestation documents (runs inside the enclave).
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Produce a signed attestation document covering the caller's nonce.
    async fn attest(&self, nonce: &Nonce) -> Result<AttestationDocument, AttestError>;
}
