//! Demo client: configures a waves server and asks for a few elevations.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use waves_server::WavesClient;

const DEMO_PARAMETERS: &str = "\
Hs: 5
Tp: 15
gamma: 1.2
waves propagating to: 0
omega: [1, 2, 3]
";

#[derive(Parser, Debug)]
#[command(name = "waves-client")]
struct Cli {
    /// Server address.
    #[arg(long, default_value = "127.0.0.1:50051")]
    addr: String,

    /// Connect to this Unix socket instead of TCP.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// YAML parameters to send instead of the demo document.
    #[arg(long)]
    parameters: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waves_server::init_logging();

    let cli = Cli::parse();

    let parameters = match &cli.parameters {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEMO_PARAMETERS.to_string(),
    };
    let points = [(1.0, 2.0), (6.0, 5.0)];
    let t = 3.0;

    let elevations = match &cli.socket {
        Some(path) => {
            let mut client = WavesClient::connect_unix(path).await?;
            client.set_parameters(&parameters).await?;
            client.elevations(&points, t).await?
        }
        None => {
            let mut client = WavesClient::connect(cli.addr.as_str()).await?;
            client.set_parameters(&parameters).await?;
            client.elevations(&points, t).await?
        }
    };

    info!("Parameters accepted");
    for ((x, y), z) in points.iter().zip(&elevations) {
        println!("eta({}, {}, {}) = {}", x, y, t, z);
    }
    Ok(())
}
