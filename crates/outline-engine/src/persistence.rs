use crate::convert::{duplicate_titles, graph_to_tree, tree_to_graph};
use crate::error::{OutlineError, Result};
use crate::model::{GraphNode, TreeNode, START_TITLE};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The two shapes an outline file may take on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredOutline {
    /// Canonical flat flow: a JSON array of graph nodes.
    Flow(Vec<GraphNode>),
    /// A nested tree object, accepted on load and passed through unchanged.
    Tree(TreeNode),
}

impl StoredOutline {
    /// Resolves the shape of a parsed document.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) => Ok(Self::Flow(serde_json::from_value(value)?)),
            Value::Object(_) => Ok(Self::Tree(serde_json::from_value(value)?)),
            Value::Null => Err(OutlineError::UnsupportedFormat("null")),
            Value::Bool(_) => Err(OutlineError::UnsupportedFormat("boolean")),
            Value::Number(_) => Err(OutlineError::UnsupportedFormat("number")),
            Value::String(_) => Err(OutlineError::UnsupportedFormat("string")),
        }
    }

    /// The single-node flow written when no outline exists yet.
    pub fn seed() -> Self {
        Self::Flow(vec![GraphNode::new(START_TITLE)])
    }

    pub fn into_tree(self) -> TreeNode {
        match self {
            Self::Tree(tree) => tree,
            Self::Flow(nodes) => {
                let duplicates = duplicate_titles(&nodes);
                if !duplicates.is_empty() {
                    tracing::warn!(?duplicates, "flow has duplicate titles, first node wins");
                }
                graph_to_tree(&nodes).unwrap_or_else(|| TreeNode::new(START_TITLE, START_TITLE))
            }
        }
    }
}

/// JSON outline file. Every read and write happens under one lock, and writes
/// replace the file atomically through a sibling temp file.
pub struct OutlineFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutlineFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored outline, seeding a `START` flow if the file is absent.
    /// An empty flow is treated like a missing file.
    pub fn read(&self) -> Result<StoredOutline> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        if !self.path.exists() {
            let seed = StoredOutline::seed();
            if let StoredOutline::Flow(nodes) = &seed {
                self.write_unlocked(nodes)?;
            }
            tracing::info!(path = %self.path.display(), "seeded new outline");
            return Ok(seed);
        }

        let data = fs::read_to_string(&self.path)?;
        let stored = StoredOutline::from_value(serde_json::from_str(&data)?)?;
        tracing::info!(path = %self.path.display(), "outline loaded");
        match stored {
            StoredOutline::Flow(nodes) if nodes.is_empty() => Ok(StoredOutline::seed()),
            stored => Ok(stored),
        }
    }

    /// Loads the outline in tree form.
    pub fn load_tree(&self) -> Result<TreeNode> {
        Ok(self.read()?.into_tree())
    }

    /// Flattens `tree` and stores it as a flow.
    pub fn save_tree(&self, tree: &TreeNode) -> Result<()> {
        self.write(&tree_to_graph(tree))
    }

    pub fn write(&self, nodes: &[GraphNode]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_unlocked(nodes)?;
        tracing::info!(path = %self.path.display(), nodes = nodes.len(), "outline saved");
        Ok(())
    }

    fn write_unlocked(&self, nodes: &[GraphNode]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(nodes)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
