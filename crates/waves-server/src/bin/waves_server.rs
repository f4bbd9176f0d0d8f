//! Waves RPC server.
//!
//! Serves a wave model over length-prefixed JSON frames, on TCP or a Unix
//! socket, optionally alongside a JSON-over-HTTP gateway.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tracing::{error, info};

use waves_model::{AiryModel, ScalarWaveModel, StubModel};
use waves_server::protocol::SetParameterRequest;
use waves_server::{DEFAULT_BIND, Listener, ServerOptions, WavesServer, WavesServicer, http};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelKind {
    /// Deterministic test model (elevation = x + y + t).
    Stub,
    /// Single linear Airy wave.
    Airy,
}

#[derive(Parser, Debug)]
#[command(name = "waves-server")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Listen on this Unix socket instead of TCP.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Also serve the HTTP gateway on this address.
    #[arg(long)]
    http: Option<SocketAddr>,

    /// Wave model to serve.
    #[arg(long, value_enum, default_value = "stub")]
    model: ModelKind,

    /// YAML parameters applied before serving.
    #[arg(long)]
    parameters: Option<PathBuf>,

    /// Largest request frame accepted, in bytes.
    #[arg(long)]
    max_frame_bytes: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waves_server::init_logging();

    let cli = Cli::parse();

    match cli.model {
        ModelKind::Stub => serve(&cli, StubModel::new()).await,
        ModelKind::Airy => serve(&cli, AiryModel::new()).await,
    }
}

async fn serve<M>(cli: &Cli, model: M) -> anyhow::Result<()>
where
    M: ScalarWaveModel + Clone + 'static,
{
    let servicer = WavesServicer::new(model);

    if let Some(path) = &cli.parameters {
        info!("Loading parameters from: {}", path.display());
        let parameters = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        servicer
            .set_parameters(&SetParameterRequest { parameters })
            .map_err(|e| anyhow::anyhow!("invalid parameters in {}: {}", path.display(), e))?;
    }

    let mut options = ServerOptions::default();
    if let Some(max_frame_bytes) = cli.max_frame_bytes {
        options.max_frame_bytes = max_frame_bytes;
    }
    let server = WavesServer::new(servicer).with_options(options);

    let listener = match &cli.socket {
        Some(path) => Listener::bind_unix(path)
            .with_context(|| format!("failed to bind {}", path.display()))?,
        None => Listener::bind_tcp(cli.bind)
            .await
            .with_context(|| format!("failed to bind {}", cli.bind))?,
    };

    if let Some(addr) = cli.http {
        let http_listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind HTTP gateway on {}", addr))?;
        let state = server.state();
        tokio::spawn(async move {
            if let Err(e) = http::serve(http_listener, state).await {
                error!("HTTP gateway failed: {}", e);
            }
        });
    }

    info!("Starting waves server...");
    let result = tokio::select! {
        result = server.run(listener) => result.context("waves server failed"),
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C");
            Ok(())
        }
    };

    if let Some(path) = &cli.socket {
        let _ = std::fs::remove_file(path);
    }
    info!("Stopped waves server");
    result
}
