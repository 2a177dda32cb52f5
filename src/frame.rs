//! Length-prefixed wire framing.
//!
//! Both directions use the same minimal format: a 4-byte unsigned
//! big-endian length `N` followed by exactly `N` raw bytes. No magic, no
//! version, no status byte. Existing callers depend on this exact layout,
//! so it must be reproduced bit-for-bit.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Error, FrameError};

/// Size of the length prefix in bytes.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Default cap on a single frame: 64 MiB.
///
/// The wire format allows lengths up to `u32::MAX`; the cap bounds the
/// allocation a hostile length prefix can force. It sits far above the
/// nonce limit, so an oversized nonce is still read in full and answered
/// with a framed validation error rather than a dropped connection.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Codec for the length-prefixed format.
#[derive(Debug)]
pub struct FrameCodec {
    /// Length from a prefix whose payload has not fully arrived yet.
    pending_len: Option<usize>,
    /// Configured maximum payload size (enforced on decode).
    max_frame_size: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            pending_len: None,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom maximum frame size.
    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self {
            pending_len: None,
            max_frame_size,
        }
    }

    /// True while a length prefix has been consumed but its payload has
    /// not fully arrived.
    fn mid_frame(&self) -> bool {
        self.pending_len.is_some()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let len = match self.pending_len.take() {
            Some(len) => len,
            None => {
                if src.len() < LEN_PREFIX_SIZE {
                    return Ok(None);
                }
                let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]);
                if len > self.max_frame_size {
                    return Err(FrameError::PayloadTooLarge {
                        size: u64::from(len),
                        max: u64::from(self.max_frame_size),
                    });
                }
                src.advance(LEN_PREFIX_SIZE);
                len as usize
            }
        };

        // Wait for the full payload, however many reads that takes.
        if src.len() < len {
            src.reserve(len - src.len());
            self.pending_len = Some(len);
            return Ok(None);
        }

        Ok(Some(src.split_to(len).freeze()))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let len = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: payload.len() as u64,
            max: u64::from(u32::MAX),
        })?;

        dst.reserve(LEN_PREFIX_SIZE + payload.len());
        dst.put_u32(len);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

/// One framed message stream over any `AsyncRead + AsyncWrite` transport.
pub struct FrameChannel<T> {
    transport: T,
    codec: FrameCodec,
    read_buf: BytesMut,
}

impl<T: AsyncRead + AsyncWrite + Unpin> FrameChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: FrameCodec::new(),
            read_buf: BytesMut::new(),
        }
    }

    /// Write one framed payload and flush it.
    pub async fn send(&mut self, payload: Bytes) -> Result<(), Error> {
        let mut buf = BytesMut::new();
        self.codec.encode(payload, &mut buf).map_err(Error::Frame)?;
        self.transport.write_all(&buf).await.map_err(Error::Io)?;
        self.transport.flush().await.map_err(Error::Io)?;
        Ok(())
    }

    /// Read one framed payload.
    ///
    /// Returns `None` on a clean close (peer disconnected between frames).
    /// A close mid-frame is reported as [`FrameError::UnexpectedEof`].
    pub async fn recv(&mut self) -> Result<Option<Bytes>, Error> {
        loop {
            if let Some(payload) = self.codec.decode(&mut self.read_buf).map_err(Error::Frame)? {
                return Ok(Some(payload));
            }
            let n = self
                .transport
                .read_buf(&mut self.read_buf)
                .await
                .map_err(Error::Io)?;
            if n == 0 {
                if self.read_buf.is_empty() && !self.codec.mid_frame() {
                    return Ok(None);
                }
                return Err(FrameError::UnexpectedEof.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_payload_exactly() {
        for len in [0usize, 1, 1000, 65536] {
            let mut codec = FrameCodec::new();
            let payload = Bytes::from(vec![0x5Au8; len]);

            let mut buf = BytesMut::new();
            codec.encode(payload.clone(), &mut buf).unwrap();
            assert_eq!(buf.len(), LEN_PREFIX_SIZE + len);

            let decoded = codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(decoded, payload);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn wire_layout_is_bit_exact() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Bytes::from_static(b"abc"), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn partial_prefix_and_payload_are_buffered() {
        let mut codec = FrameCodec::new();
        let mut encoded = BytesMut::new();
        codec
            .encode(Bytes::from_static(b"attestation"), &mut encoded)
            .unwrap();

        // Two bytes of the prefix.
        let mut buf = encoded.split_to(2);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        // Rest of the prefix plus half the payload.
        buf.extend_from_slice(&encoded.split_to(7));
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&encoded);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded[..], b"attestation");
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let mut codec = FrameCodec::with_max_frame_size(8);
        let mut buf = BytesMut::from(&[0, 0, 0, 9][..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 8 }));
    }

    #[tokio::test]
    async fn channel_roundtrip() {
        let (a, b) = tokio::io::duplex(256);
        let mut tx = FrameChannel::new(a);
        let mut rx = FrameChannel::new(b);

        tx.send(Bytes::from_static(b"hello")).await.unwrap();
        let got = rx.recv().await.unwrap().unwrap();
        assert_eq!(&got[..], b"hello");
    }

    #[tokio::test]
    async fn clean_close_yields_none() {
        let (a, b) = tokio::io::duplex(256);
        drop(a);
        let mut rx = FrameChannel::new(b);
        assert!(rx.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn close_mid_frame_is_an_error() {
        let (mut a, b) = tokio::io::duplex(256);
        // Prefix claims 10 bytes, peer delivers 3 and hangs up.
        a.write_all(&[0, 0, 0, 10, 1, 2, 3]).await.unwrap();
        drop(a);

        let mut rx = FrameChannel::new(b);
        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, Error::Frame(FrameError::UnexpectedEof)));
    }
}
