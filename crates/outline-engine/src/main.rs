use outline_core::config::Config;
use outline_core::mcp_stdio::run_mcp_stdio;
use outline_core::server::OutlineEngine;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().with_args(env::args().skip(1));
    let engine = OutlineEngine::new(&config);

    // Seeds the data file when it does not exist yet.
    let tree = engine.get_tree().await?;
    tracing::info!(
        data_file = %config.data_file.display(),
        root = %tree.title,
        nodes = tree.node_count(),
        "outline engine ready"
    );

    run_mcp_stdio(Arc::new(engine)).await
}
