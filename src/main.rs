//! Server binary entry point.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> { admill::server::run().await }
