/// Caller-side helper for the framed attestation exchange.
pub mod client;
/// The attestation proxy server (runs inside the enclave).
pub mod server;
