use crate::mcp::{McpServer, TREE_UPDATED};
use crate::mcp_types::{McpError, McpNotification, McpRequest, McpResponse, PARSE_ERROR};
use crate::server::OutlineEngine;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Serves JSON-RPC over stdin/stdout, one message per line, until stdin closes.
///
/// Tree updates are pushed to the client as `notifications/tree_updated`.
pub async fn run_mcp_stdio(engine: Arc<OutlineEngine>) -> anyhow::Result<()> {
    let forwarder = forward_updates(&engine);
    let server = McpServer::new(engine);
    let mut reader = BufReader::new(stdin()).lines();

    while let Some(line) = reader.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpRequest>(&line) {
            Ok(request) => server.handle(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request line");
                Some(McpResponse::failure(
                    None,
                    McpError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ))
            }
        };

        if let Some(response) = response {
            println!("{}", serde_json::to_string(&response)?);
        }
    }

    forwarder.abort();
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

fn forward_updates(engine: &OutlineEngine) -> JoinHandle<()> {
    let mut updates = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(tree) => {
                    let notification = McpNotification::new(TREE_UPDATED, json!({ "tree": tree }));
                    match serde_json::to_string(&notification) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::error!(error = %e, "failed to encode tree update"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "update subscriber lagged, some trees dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
