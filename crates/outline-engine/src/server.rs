use crate::config::Config;
use crate::error::Result;
use crate::model::TreeNode;
use crate::outline::{self, NewNode, NodeEdit};
use crate::persistence::OutlineFile;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Result of a successful add: the whole tree and the id given to the child.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAdded {
    pub tree: TreeNode,
    pub new_id: String,
}

/// The outline operations offered to transports.
///
/// Each mutation loads the stored outline, applies one edit, writes it back as
/// a flow and broadcasts the new tree. Mutations are serialized end to end;
/// failed ones neither write nor broadcast.
pub struct OutlineEngine {
    pub store: Arc<OutlineFile>,
    updates: broadcast::Sender<TreeNode>,
    write_lock: Arc<Mutex<()>>,
}

impl Clone for OutlineEngine {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            updates: self.updates.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl OutlineEngine {
    pub fn new(config: &Config) -> Self {
        Self::open(config.data_file.clone(), config.broadcast_capacity)
    }

    pub fn open(data_file: impl Into<PathBuf>, broadcast_capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            store: Arc::new(OutlineFile::new(data_file)),
            updates,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Receives every tree produced by a successful mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<TreeNode> {
        self.updates.subscribe()
    }

    pub async fn get_tree(&self) -> Result<TreeNode> {
        self.on_store(OutlineFile::load_tree).await
    }

    pub async fn add_node(&self, parent_id: &str, new: NewNode) -> Result<NodeAdded> {
        let (tree, new_id) = self
            .mutate(|tree| outline::add_node(tree, parent_id, new))
            .await?;
        Ok(NodeAdded { tree, new_id })
    }

    pub async fn edit_node(&self, id: &str, edit: NodeEdit) -> Result<TreeNode> {
        let (tree, ()) = self.mutate(|tree| outline::edit_node(tree, id, edit)).await?;
        Ok(tree)
    }

    pub async fn delete_node(&self, id: &str) -> Result<TreeNode> {
        let (tree, _removed) = self.mutate(|tree| outline::delete_node(tree, id)).await?;
        Ok(tree)
    }

    async fn mutate<T>(
        &self,
        edit: impl FnOnce(&mut TreeNode) -> Result<T>,
    ) -> Result<(TreeNode, T)> {
        let _guard = self.write_lock.lock().await;

        let mut tree = self.on_store(OutlineFile::load_tree).await?;
        let out = edit(&mut tree)?;
        let snapshot = tree.clone();
        self.on_store(move |store| store.save_tree(&snapshot)).await?;

        if self.updates.send(tree.clone()).is_err() {
            tracing::debug!("tree updated with no subscribers");
        }
        Ok((tree, out))
    }

    /// Runs blocking file access off the async workers.
    async fn on_store<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&OutlineFile) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&*store)).await?
    }
}
