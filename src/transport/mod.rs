/// TCP transport helpers (development and tests).
#[cfg(feature = "tcp")]
pub mod tcp;

/// VSock transport between the enclave and its parent instance.
#[cfg(all(feature = "vsock", target_os = "linux"))]
pub mod vsock;
