use std::time::Duration;

use cardroom::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=cardroom=debug,cardroom_room=debug for per-action output
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let bind = std::env::var("CARDROOM_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let idle_timeout = match std::env::var("CARDROOM_IDLE_TIMEOUT_SECS") {
        Ok(secs) => Some(Duration::from_secs(secs.trim().parse()?)),
        Err(_) => None,
    };

    let server = CardroomServer::builder()
        .bind(&bind)
        .idle_timeout(idle_timeout)
        .build()
        .await?;
    server.run().await?;
    Ok(())
}
