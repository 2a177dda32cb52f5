use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::attestation::{AttestationDocument, AttestationProvider};
use crate::error::{Error, RequestError};
use crate::frame::FrameChannel;
use crate::nonce::Nonce;

/// Vsock port the proxy listens on inside the enclave.
pub const VSOCK_PORT: u32 = 5000;

/// Run the proxy on a vsock listener (production transport).
///
/// Connections are served strictly one at a time: read, validate, invoke,
/// respond, close, then accept the next. Attestation is requested rarely
/// and off any hot path, so the sequential loop trades throughput for a
/// minimal trusted surface. The OS accept queue buffers concurrent
/// connection attempts in the meantime.
///
/// Returns only on a bind/listen failure, which is fatal.
#[cfg(all(feature = "vsock", target_os = "linux"))]
pub async fn run_vsock(port: u32, provider: Arc<dyn AttestationProvider>) -> Result<(), Error> {
    let mut listener = crate::transport::vsock::listen(port).map_err(Error::Setup)?;
    tracing::info!(port, "attestation proxy listening on vsock");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::debug!(?peer, "accepted connection");
                if let Err(e) = handle_connection(stream, provider.as_ref()).await {
                    tracing::warn!(error = %e, "connection handler error");
                }
            }
            Err(e) => tracing::warn!(error = %e, "accept error"),
        }
    }
}

/// Run the proxy on an already-bound TCP listener.
///
/// Same sequential loop as [`run_vsock`]; used for development and tests,
/// where a hypervisor vsock endpoint is not available.
#[cfg(feature = "tcp")]
pub async fn run_tcp(
    listener: tokio::net::TcpListener,
    provider: Arc<dyn AttestationProvider>,
) -> Result<(), Error> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                stream.set_nodelay(true).ok();
                tracing::debug!(%peer, "accepted connection");
                if let Err(e) = handle_connection(stream, provider.as_ref()).await {
                    tracing::warn!(error = %e, "connection handler error");
                }
            }
            Err(e) => tracing::warn!(error = %e, "accept error"),
        }
    }
}

/// Serve one request/response exchange, then drop the connection.
///
/// Validation and attestation failures are framed back to the caller as
/// plain text, using the same format as a successful document; the caller
/// distinguishes the two by content. Only transport failures abort the
/// exchange without a response. There are no retries within a connection.
pub async fn handle_connection<T>(
    stream: T,
    provider: &dyn AttestationProvider,
) -> Result<(), Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut channel = FrameChannel::new(stream);

    let raw = match channel.recv().await? {
        Some(raw) => raw,
        // Peer connected and left without sending a request.
        None => return Ok(()),
    };
    tracing::debug!(len = raw.len(), "received nonce");

    let response = match process_request(raw, provider).await {
        Ok(doc) => {
            tracing::info!("attestation document retrieved");
            Bytes::from(doc.into_bytes())
        }
        Err(e) => {
            tracing::warn!(error = %e, "request failed");
            Bytes::from(e.to_string())
        }
    };

    channel.send(response).await
}

/// Validate the nonce and fetch an attestation document covering it.
async fn process_request(
    raw: Bytes,
    provider: &dyn AttestationProvider,
) -> Result<AttestationDocument, RequestError> {
    let nonce = Nonce::new(raw)?;
    let doc = provider.attest(&nonce).await?;
    Ok(doc)
}
