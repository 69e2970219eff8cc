/*
 * Responsibility
 * - start the tokio runtime
 * - hand off to app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    registry_token_server::app::run().await
}
