//! certdeck - certificate inventory CLI

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    certdeck_cli::run().await
}
