pub mod model {
    use serde::{Deserialize, Serialize};

    /// Title of the node that always wins root inference.
    pub const START_TITLE: &str = "START";

    /// A labeled outgoing connection, referencing its target by title.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Edge {
        #[serde(default)]
        pub label: String,
        /// Target title. Stored under `next` in the flow format.
        #[serde(rename = "next")]
        pub target: String,
    }

    impl Edge {
        pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
            Self {
                label: label.into(),
                target: target.into(),
            }
        }
    }

    /// One entry of the flat flow format (the durable representation).
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GraphNode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<String>,
        pub title: String,
        #[serde(default)]
        pub description: String,
        #[serde(rename = "next", default)]
        pub edges: Vec<Edge>,
    }

    impl GraphNode {
        pub fn new(title: impl Into<String>) -> Self {
            Self {
                id: None,
                title: title.into(),
                description: String::new(),
                edges: Vec::new(),
            }
        }

        pub fn with_description(mut self, description: impl Into<String>) -> Self {
            self.description = description.into();
            self
        }

        pub fn with_edge(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
            self.edges.push(Edge::new(label, target));
            self
        }

        /// The id a tree node built from this entry receives.
        pub fn tree_id(&self) -> &str {
            self.id.as_deref().unwrap_or(&self.title)
        }
    }

    /// A node of the nested outline. Children are owned exclusively.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TreeNode {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        /// Label of the incoming edge from the parent. Never set on the root.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub edge_label: Option<String>,
        #[serde(default)]
        pub children: Vec<TreeNode>,
    }

    impl TreeNode {
        pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                title: title.into(),
                description: String::new(),
                edge_label: None,
                children: Vec::new(),
            }
        }

        pub fn with_description(mut self, description: impl Into<String>) -> Self {
            self.description = description.into();
            self
        }

        pub fn with_edge_label(mut self, label: impl Into<String>) -> Self {
            self.edge_label = Some(label.into());
            self
        }

        pub fn with_child(mut self, child: TreeNode) -> Self {
            self.children.push(child);
            self
        }

        /// Number of nodes in this subtree, including itself.
        pub fn node_count(&self) -> usize {
            1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
        }

        pub fn is_leaf(&self) -> bool {
            self.children.is_empty()
        }
    }
}

pub mod config;
pub mod convert;
pub mod error;
pub mod mcp;
pub mod mcp_stdio;
pub mod mcp_types;
pub mod outline;
pub mod persistence;
pub mod server;
