use crate::error::OutlineError;
use crate::mcp_types::{McpError, McpRequest, McpResponse, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::outline::{NewNode, NodeEdit};
use crate::server::OutlineEngine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const TREE_UPDATED: &str = "notifications/tree_updated";

/// Request payload for the `add_node` tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNodeParams {
    pub parent_id: String,
    #[serde(flatten)]
    pub node: NewNode,
}

/// Request payload for the `edit_node` tool.
#[derive(Debug, Deserialize)]
pub struct EditNodeParams {
    pub id: String,
    #[serde(flatten)]
    pub edit: NodeEdit,
}

/// Request payload for the `delete_node` tool.
#[derive(Debug, Deserialize)]
pub struct DeleteNodeParams {
    pub id: String,
}

/// The MCP adapter.
/// Maps JSON-RPC requests onto the outline engine's four operations.
pub struct McpServer {
    engine: Arc<OutlineEngine>,
}

impl McpServer {
    pub fn new(engine: Arc<OutlineEngine>) -> Self {
        Self { engine }
    }

    /// Handles one request. Notifications yield no response.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "ignoring client notification");
            return None;
        }

        let id = request.id;
        let result = match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "outline-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.list_tools() })),
            "tools/call" => {
                let params = request.params.unwrap_or_else(|| json!({}));
                let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                match params["name"].as_str() {
                    Some(name) => self.call_tool(name, args).await.map(|value| {
                        json!({
                            "content": [{ "type": "text", "text": value.to_string() }],
                            "structuredContent": value
                        })
                    }),
                    None => Err(McpError::new(INVALID_PARAMS, "Missing tool name")),
                }
            }
            other => Err(McpError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        Some(match result {
            Ok(value) => McpResponse::success(id, value),
            Err(error) => McpResponse::failure(id, error),
        })
    }

    /// Lists the tools available in this MCP server.
    pub fn list_tools(&self) -> Value {
        json!([
            {
                "name": "get_tree",
                "description": "Returns the whole outline tree",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "add_node",
                "description": "Appends a child node under an existing node",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "parentId": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "edgeLabel": { "type": "string" },
                        "id": { "type": "string" }
                    },
                    "required": ["parentId"]
                }
            },
            {
                "name": "edit_node",
                "description": "Overwrites a node's title and/or description",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["id"]
                }
            },
            {
                "name": "delete_node",
                "description": "Removes a non-root node and its subtree",
                "inputSchema": {
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }
            }
        ])
    }

    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Value, McpError> {
        match tool_name {
            "get_tree" => {
                let tree = self.engine.get_tree().await.map_err(tool_error)?;
                Ok(json!({ "tree": tree }))
            }
            "add_node" => {
                let params: AddNodeParams = parse_args(arguments)?;
                let added = self
                    .engine
                    .add_node(&params.parent_id, params.node)
                    .await
                    .map_err(tool_error)?;
                Ok(json!({ "ok": true, "tree": added.tree, "newId": added.new_id }))
            }
            "edit_node" => {
                let params: EditNodeParams = parse_args(arguments)?;
                let tree = self
                    .engine
                    .edit_node(&params.id, params.edit)
                    .await
                    .map_err(tool_error)?;
                Ok(json!({ "ok": true, "tree": tree }))
            }
            "delete_node" => {
                let params: DeleteNodeParams = parse_args(arguments)?;
                let tree = self.engine.delete_node(&params.id).await.map_err(tool_error)?;
                Ok(json!({ "ok": true, "tree": tree }))
            }
            _ => Err(McpError::new(
                METHOD_NOT_FOUND,
                format!("Tool not found: {}", tool_name),
            )),
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments)
        .map_err(|e| McpError::new(INVALID_PARAMS, format!("Invalid arguments: {}", e)))
}

fn tool_error(err: OutlineError) -> McpError {
    match &err {
        OutlineError::NotFound { .. } | OutlineError::CannotDeleteRoot { .. } => {
            tracing::debug!(error = %err, "outline request rejected");
        }
        _ => tracing::error!(error = %err, "outline request failed"),
    }
    McpError::new(err.rpc_code(), err.to_string())
}
