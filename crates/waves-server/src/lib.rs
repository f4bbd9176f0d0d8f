//! Waves Server
//!
//! Serves a [`waves_model::ScalarWaveModel`] over batched grids: configure it
//! from a YAML document, then query elevations, dynamic pressures, orbital
//! velocities, spectra and RAO supports for many points at once.
//!
//! Requests travel as length-prefixed JSON frames over TCP or a Unix socket,
//! or through the optional HTTP gateway.

use tracing_subscriber::{EnvFilter, fmt};

pub mod client;
pub mod error;
pub mod framing;
pub mod http;
pub mod protocol;
pub mod router;
pub mod server;
pub mod servicer;

pub use client::{ClientError, WavesClient};
pub use error::{GridError, RpcError};
pub use protocol::{StatusCode, WaveRequest, WaveResponse};
pub use router::{RequestHandler, RequestRouter, ServerState};
pub use server::{Listener, ServerOptions, WavesServer};
pub use servicer::WavesServicer;

/// Default address of the waves service.
pub const DEFAULT_BIND: &str = "0.0.0.0:50051";

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,waves_server=debug,waves_model=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
