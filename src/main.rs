use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use attestation_proxy::proxy::server;
use attestation_proxy::{AttestationProvider, ToolProvider};

#[derive(Parser)]
#[command(name = "attestation-proxy", about = "Nitro Enclave attestation proxy")]
struct Args {
    /// Vsock port to listen on.
    #[arg(long, default_value_t = server::VSOCK_PORT)]
    port: u32,

    /// Listen on TCP instead of vsock (development only).
    #[arg(long)]
    tcp: Option<std::net::SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let provider: Arc<dyn AttestationProvider> = Arc::new(ToolProvider::new());

    // A bind/listen failure propagates out of serve() and exits non-zero;
    // an interrupt shuts the listening socket down cleanly.
    tokio::select! {
        res = serve(&args, provider) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            Ok(())
        }
    }
}

async fn serve(args: &Args, provider: Arc<dyn AttestationProvider>) -> Result<()> {
    if let Some(addr) = args.tcp {
        let listener = attestation_proxy::transport::tcp::listen(addr)
            .await
            .map_err(attestation_proxy::Error::Setup)?;
        tracing::info!(%addr, "attestation proxy listening on tcp (development mode)");
        server::run_tcp(listener, provider).await?;
    } else {
        #[cfg(all(feature = "vsock", target_os = "linux"))]
        server::run_vsock(args.port, provider).await?;

        #[cfg(not(all(feature = "vsock", target_os = "linux")))]
        anyhow::bail!("vsock transport unavailable in this build; use --tcp");
    }
    Ok(())
}
