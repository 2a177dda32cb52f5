use tokio_vsock::{VsockAddr, VsockListener, VsockStream};

/// Bind a vsock listener that accepts connections from any CID.
pub fn listen(port: u32) -> std::io::Result<VsockListener> {
    VsockListener::bind(VsockAddr::new(tokio_vsock::VMADDR_CID_ANY, port))
}

/// Connect to a vsock endpoint.
pub async fn connect(cid: u32, port: u32) -> std::io::Result<VsockStream> {
    VsockStream::connect(VsockAddr::new(cid, port)).await
}
