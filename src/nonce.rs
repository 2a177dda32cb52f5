use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::ValidationError;

/// Maximum accepted nonce length in bytes.
pub const MAX_NONCE_LEN: usize = 1000;

/// A caller-supplied nonce, bounds-checked on construction.
///
/// Content is opaque; the only rule is the length bound. Zero-length
/// nonces are accepted (freshness is then simply not guaranteed for the
/// caller, which is the caller's choice to make).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(Bytes);

impl Nonce {
    /// Validate and wrap raw nonce bytes from the wire.
    pub fn new(raw: Bytes) -> Result<Self, ValidationError> {
        if raw.len() > MAX_NONCE_LEN {
            return Err(ValidationError::NonceTooLarge {
                len: raw.len(),
                max: MAX_NONCE_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Base64 form used when handing the nonce to the attestation tool.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lengths_within_bound() {
        for len in [0usize, 1, 999, MAX_NONCE_LEN] {
            let nonce = Nonce::new(Bytes::from(vec![0xAB; len])).unwrap();
            assert_eq!(nonce.len(), len);
        }
    }

    #[test]
    fn rejects_lengths_over_bound() {
        let err = Nonce::new(Bytes::from(vec![0; MAX_NONCE_LEN + 1])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonceTooLarge { len: 1001, max: MAX_NONCE_LEN }
        ));
    }

    #[test]
    fn content_is_not_inspected() {
        // Arbitrary binary content is fine; only the length matters.
        let nonce = Nonce::new(Bytes::from_static(&[0x00, 0xFF, 0x0A, 0x27])).unwrap();
        assert_eq!(nonce.as_bytes(), &[0x00, 0xFF, 0x0A, 0x27]);
    }

    #[test]
    fn base64_uses_standard_alphabet() {
        let nonce = Nonce::new(Bytes::from_static(b"test")).unwrap();
        assert_eq!(nonce.to_base64(), "dGVzdA==");

        let empty = Nonce::new(Bytes::new()).unwrap();
        assert_eq!(empty.to_base64(), "");
    }
}
