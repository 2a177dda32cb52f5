use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Error, FrameError};
use crate::frame::FrameChannel;

/// Send a nonce over an established connection and wait for the framed
/// response.
///
/// The protocol carries no status byte: the returned bytes are either a
/// base64 attestation document or a plain-text error message, and the
/// caller must tell them apart by content. A caller that wants a retried
/// attestation opens a new connection.
pub async fn request_attestation<T>(stream: T, nonce: &[u8]) -> Result<Bytes, Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut channel = FrameChannel::new(stream);
    channel.send(Bytes::copy_from_slice(nonce)).await?;
    match channel.recv().await? {
        Some(response) => Ok(response),
        None => Err(FrameError::UnexpectedEof.into()),
    }
}

/// Connect to an enclave's attestation proxy over vsock and run one
/// exchange.
#[cfg(all(feature = "vsock", target_os = "linux"))]
pub async fn request_attestation_vsock(cid: u32, port: u32, nonce: &[u8]) -> Result<Bytes, Error> {
    let stream = crate::transport::vsock::connect(cid, port).await?;
    request_attestation(stream, nonce).await
}
