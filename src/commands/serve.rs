use anyhow::{Context, Result};
use std::sync::Arc;

use reelcost::config::Config;
use reelcost::crawler::DirectorCrawler;
use reelcost::server::ApiServer;

/// Run the HTTP API until the process is stopped
pub async fn serve(mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let crawler = Arc::new(DirectorCrawler::new(&config).await?);
    let server = ApiServer::new(config.server.clone(), crawler);

    server.start().await.context("Server error")?;
    Ok(())
}
