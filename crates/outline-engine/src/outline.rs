//! Edits applied to the nested outline.
//!
//! Lookups are depth-first with children visited in order; the first node
//! carrying an id wins.

use crate::error::{OutlineError, Result};
use crate::model::TreeNode;
use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled";

/// A child to append under an existing node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub edge_label: Option<String>,
    pub id: Option<String>,
}

/// Fields to overwrite on an existing node. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeEdit {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Fresh node id: `n` followed by eight hex digits.
pub fn generate_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("n{}", &hex[..8])
}

/// Finds `id` and its parent. The parent is `None` for the root.
pub fn find<'a>(tree: &'a TreeNode, id: &str) -> Option<(&'a TreeNode, Option<&'a TreeNode>)> {
    find_with_parent(tree, id, None)
}

fn find_with_parent<'a>(
    node: &'a TreeNode,
    id: &str,
    parent: Option<&'a TreeNode>,
) -> Option<(&'a TreeNode, Option<&'a TreeNode>)> {
    if node.id == id {
        return Some((node, parent));
    }
    node.children
        .iter()
        .find_map(|child| find_with_parent(child, id, Some(node)))
}

pub fn find_mut<'a>(node: &'a mut TreeNode, id: &str) -> Option<&'a mut TreeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .iter_mut()
        .find_map(|child| find_mut(child, id))
}

/// Appends a child under `parent_id` and returns the child's id.
pub fn add_node(tree: &mut TreeNode, parent_id: &str, new: NewNode) -> Result<String> {
    let parent = find_mut(tree, parent_id).ok_or_else(|| OutlineError::not_found(parent_id))?;

    let id = new.id.filter(|id| !id.is_empty()).unwrap_or_else(generate_id);
    parent.children.push(TreeNode {
        id: id.clone(),
        title: new.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: new.description.unwrap_or_default(),
        edge_label: new.edge_label.filter(|label| !label.is_empty()),
        children: Vec::new(),
    });
    Ok(id)
}

/// Overwrites title and/or description. Children, id and edge label are untouched.
pub fn edit_node(tree: &mut TreeNode, id: &str, edit: NodeEdit) -> Result<()> {
    let node = find_mut(tree, id).ok_or_else(|| OutlineError::not_found(id))?;
    if let Some(title) = edit.title {
        node.title = title;
    }
    if let Some(description) = edit.description {
        node.description = description;
    }
    Ok(())
}

/// Detaches the node `id` with its subtree and returns it. The root cannot be deleted.
pub fn delete_node(tree: &mut TreeNode, id: &str) -> Result<TreeNode> {
    if tree.id == id {
        return Err(OutlineError::CannotDeleteRoot { id: id.to_string() });
    }
    remove_child(tree, id).ok_or_else(|| OutlineError::not_found(id))
}

// Same pre-order walk as `find`, so delete removes the node `find` reports.
fn remove_child(node: &mut TreeNode, id: &str) -> Option<TreeNode> {
    for pos in 0..node.children.len() {
        if node.children[pos].id == id {
            return Some(node.children.remove(pos));
        }
        if let Some(removed) = remove_child(&mut node.children[pos], id) {
            return Some(removed);
        }
    }
    None
}
