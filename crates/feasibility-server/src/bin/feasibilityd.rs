use std::io;

use feasibility_server::{FeasibilityServer, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // A missing .env file is normal; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = ServerConfig::from_env();
    let server = FeasibilityServer::new(&config).map_err(|e| {
        error!(error = %e, "failed to start feasibility server");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    info!("feasibilityd started");
    server.serve_stdio()
}
