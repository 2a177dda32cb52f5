//! Invocation of the external attestation document retriever.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AttestationDocument, AttestationProvider};
use crate::error::AttestError;
use crate::nonce::Nonce;

/// Fixed path of the retriever binary inside the enclave image.
pub const TOOL_PATH: &str = "/usr/local/bin/att_doc_retriever";

/// User data bound into the attestation document.
pub const USER_DATA: &str = "hello, world!";

/// Public key bound into the attestation document.
pub const PUBLIC_KEY: &str = "my super secret key";

/// Hard budget for one tool invocation, measured from spawn.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully-built invocation of the attestation tool.
///
/// The only way to obtain one is [`ToolInvocation::for_nonce`], which fixes
/// the program path and the argv shape. Every dynamic value occupies its
/// own argv element and the process is spawned directly, never through a
/// shell, so argument and command injection are structurally impossible
/// rather than escaped away.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    program: PathBuf,
    argv: Vec<String>,
}

impl ToolInvocation {
    /// Build the fixed-shape invocation for one nonce.
    pub fn for_nonce(nonce: &Nonce) -> Self {
        let argv = vec![
            "--nonce".to_string(),
            nonce.to_base64(),
            "--user-data".to_string(),
            USER_DATA.to_string(),
            "--public-key".to_string(),
            PUBLIC_KEY.to_string(),
            "--base64".to_string(),
        ];
        Self {
            program: PathBuf::from(TOOL_PATH),
            argv,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Spawn the tool and wait for it to exit, within `budget`.
    ///
    /// stdout and stderr are captured separately. Nonzero exit, empty
    /// stdout (after trimming), and running past the budget are all
    /// failures; a timed-out child is killed, never left running.
    pub async fn run(&self, budget: Duration) -> Result<AttestationDocument, AttestError> {
        tracing::info!(program = %self.program.display(), "invoking attestation tool");

        let child = Command::new(&self.program)
            .args(&self.argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must also kill the child.
            .kill_on_drop(true)
            .spawn()
            .map_err(AttestError::Spawn)?;

        let output = match tokio::time::timeout(budget, child.wait_with_output()).await {
            Ok(waited) => waited.map_err(AttestError::Spawn)?,
            Err(_) => return Err(AttestError::Timeout { budget }),
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(AttestError::NonzeroExit {
                status: output.status,
                stderr,
            });
        }

        let doc = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if doc.is_empty() {
            return Err(AttestError::EmptyOutput { stderr });
        }
        Ok(AttestationDocument::new(doc))
    }
}

/// [`AttestationProvider`] backed by the external attestation tool.
pub struct ToolProvider {
    timeout: Duration,
}

impl ToolProvider {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Override the invocation budget.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ToolProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttestationProvider for ToolProvider {
    async fn attest(&self, nonce: &Nonce) -> Result<AttestationDocument, AttestError> {
        ToolInvocation::for_nonce(nonce).run(self.timeout).await
    }
}
