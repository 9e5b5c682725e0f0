//! Conversions between the flat flow format and the nested outline tree.
//!
//! The flow format is an adjacency list keyed by title: every [`GraphNode`]
//! lists its outgoing edges by target title. It may contain cycles, dangling
//! targets and nodes unreachable from the root. [`graph_to_tree`] expands it
//! into a single [`TreeNode`]; [`tree_to_graph`] flattens an edited tree back.

use crate::model::{Edge, GraphNode, TreeNode, START_TITLE};
use std::collections::{HashMap, HashSet};

/// Id prefix given to placeholder nodes for edge targets with no graph node.
pub const MISSING_ID_PREFIX: &str = "missing:";

/// Picks the entry point of a flow.
///
/// A node titled `START` always wins. Otherwise the first node (in input order)
/// that no edge points at is chosen, and if every node is referenced the first
/// node is used. Returns `None` only for an empty slice.
pub fn infer_root(nodes: &[GraphNode]) -> Option<&str> {
    if let Some(start) = nodes.iter().find(|n| n.title == START_TITLE) {
        return Some(&start.title);
    }

    let referenced: HashSet<&str> = nodes
        .iter()
        .flat_map(|n| n.edges.iter().map(|e| e.target.as_str()))
        .collect();

    nodes
        .iter()
        .find(|n| !referenced.contains(n.title.as_str()))
        .or_else(|| nodes.first())
        .map(|n| n.title.as_str())
}

/// Titles that occur on more than one node, in first-seen order.
pub fn duplicate_titles(nodes: &[GraphNode]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for node in nodes {
        let title = node.title.as_str();
        if !seen.insert(title) && !duplicates.contains(&title) {
            duplicates.push(title);
        }
    }
    duplicates
}

/// Expands a flow into a tree rooted at [`infer_root`].
///
/// Each title is expanded at most once per root-to-leaf path: a repeat along
/// the current path becomes a childless leaf, so cyclic input terminates.
/// Siblings may each expand the same title down their own branch. Edge targets
/// without a graph node become stubs with a `missing:` id.
///
/// When titles repeat, the first node carrying a title is the one expanded.
pub fn graph_to_tree(nodes: &[GraphNode]) -> Option<TreeNode> {
    let root = infer_root(nodes)?;

    let mut index: HashMap<&str, &GraphNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.entry(node.title.as_str()).or_insert(node);
    }

    let tree = expand(root, &index, &HashSet::new());
    tracing::debug!(root, nodes = tree.node_count(), "expanded flow into tree");
    Some(tree)
}

fn expand<'a>(
    title: &'a str,
    index: &HashMap<&'a str, &'a GraphNode>,
    seen: &HashSet<&'a str>,
) -> TreeNode {
    let Some(&node) = index.get(title) else {
        tracing::warn!(title, "edge references a title with no node");
        return TreeNode::new(format!("{MISSING_ID_PREFIX}{title}"), title);
    };

    let mut tree = TreeNode::new(node.tree_id(), title).with_description(&node.description);
    if seen.contains(title) {
        return tree;
    }

    let mut path = seen.clone();
    path.insert(title);

    for edge in &node.edges {
        let mut child = expand(edge.target.as_str(), index, &path);
        if !edge.label.is_empty() {
            child.edge_label = Some(edge.label.clone());
        }
        tree.children.push(child);
    }
    tree
}

/// Flattens a tree into the flow format, root first.
///
/// Nodes are keyed by title. The first tree node seen with a title defines the
/// graph node's id and description; later nodes with the same title only add
/// edges to it. Children without an edge label produce edges labeled `""`.
pub fn tree_to_graph(root: &TreeNode) -> Vec<GraphNode> {
    let mut flattener = Flattener::default();
    flattener.visit(root);

    let Flattener { order, mut by_title } = flattener;
    let graph: Vec<GraphNode> = order
        .iter()
        .filter_map(|title| by_title.remove(title.as_str()))
        .collect();
    tracing::debug!(nodes = graph.len(), "flattened tree into flow");
    graph
}

#[derive(Default)]
struct Flattener {
    order: Vec<String>,
    by_title: HashMap<String, GraphNode>,
}

impl Flattener {
    fn visit(&mut self, node: &TreeNode) {
        self.ensure(node);

        for child in &node.children {
            let edge = Edge::new(child.edge_label.clone().unwrap_or_default(), &child.title);
            if let Some(parent) = self.by_title.get_mut(&node.title) {
                parent.edges.push(edge);
            }
            self.visit(child);
        }
    }

    fn ensure(&mut self, node: &TreeNode) {
        if self.by_title.contains_key(&node.title) {
            return;
        }
        let id = (node.id != node.title).then(|| node.id.clone());
        self.order.push(node.title.clone());
        self.by_title.insert(
            node.title.clone(),
            GraphNode {
                id,
                title: node.title.clone(),
                description: node.description.clone(),
                edges: Vec::new(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tree: &TreeNode) -> Vec<&str> {
        tree.children.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn start_wins_regardless_of_position() {
        let nodes = vec![
            GraphNode::new("A").with_edge("", "B"),
            GraphNode::new("B"),
            GraphNode::new("START"),
        ];
        assert_eq!(infer_root(&nodes), Some("START"));
    }

    #[test]
    fn unreferenced_node_is_root_without_start() {
        let nodes = vec![GraphNode::new("B"), GraphNode::new("A").with_edge("", "B")];
        assert_eq!(infer_root(&nodes), Some("A"));
    }

    #[test]
    fn falls_back_to_first_node_when_all_referenced() {
        let nodes = vec![GraphNode::new("X").with_edge("", "X")];
        assert_eq!(infer_root(&nodes), Some("X"));
        assert_eq!(infer_root(&[]), None);
    }

    #[test]
    fn expands_edges_in_order_with_labels_on_children() {
        let nodes = vec![
            GraphNode::new("START")
                .with_description("entry")
                .with_edge("yes", "A")
                .with_edge("", "B"),
            GraphNode::new("A").with_description("first"),
            GraphNode::new("B"),
        ];
        let tree = graph_to_tree(&nodes).unwrap();

        assert_eq!(tree.title, "START");
        assert_eq!(tree.id, "START");
        assert_eq!(tree.edge_label, None);
        assert_eq!(titles(&tree), vec!["A", "B"]);
        assert_eq!(tree.children[0].edge_label.as_deref(), Some("yes"));
        assert_eq!(tree.children[0].description, "first");
        assert_eq!(tree.children[1].edge_label, None);
    }

    #[test]
    fn explicit_id_is_kept() {
        let mut node = GraphNode::new("START");
        node.id = Some("root-1".to_string());
        let tree = graph_to_tree(&[node]).unwrap();
        assert_eq!(tree.id, "root-1");
    }

    #[test]
    fn cycle_is_truncated_at_first_repeat() {
        let nodes = vec![
            GraphNode::new("A").with_description("a").with_edge("go", "B"),
            GraphNode::new("B").with_edge("back", "A"),
        ];
        let tree = graph_to_tree(&nodes).unwrap();

        // Both are referenced, so the first node is the root.
        assert_eq!(tree.title, "A");
        let b = &tree.children[0];
        assert_eq!(b.title, "B");
        let repeat = &b.children[0];
        assert_eq!(repeat.title, "A");
        assert_eq!(repeat.description, "a");
        assert_eq!(repeat.edge_label.as_deref(), Some("back"));
        assert!(repeat.is_leaf());
    }

    #[test]
    fn self_loop_terminates() {
        let tree = graph_to_tree(&[GraphNode::new("X").with_edge("", "X")]).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert!(tree.children[0].is_leaf());
    }

    #[test]
    fn siblings_each_expand_a_shared_target() {
        let nodes = vec![
            GraphNode::new("START").with_edge("", "A").with_edge("", "B"),
            GraphNode::new("A").with_edge("", "C"),
            GraphNode::new("B").with_edge("", "C"),
            GraphNode::new("C").with_edge("", "D"),
            GraphNode::new("D"),
        ];
        let tree = graph_to_tree(&nodes).unwrap();
        assert_eq!(tree.children[0].children[0].children[0].title, "D");
        assert_eq!(tree.children[1].children[0].children[0].title, "D");
    }

    #[test]
    fn dangling_edge_becomes_stub() {
        let nodes = vec![GraphNode::new("START").with_edge("maybe", "Ghost")];
        let tree = graph_to_tree(&nodes).unwrap();

        let stub = &tree.children[0];
        assert_eq!(stub.id, "missing:Ghost");
        assert_eq!(stub.title, "Ghost");
        assert_eq!(stub.description, "");
        assert_eq!(stub.edge_label.as_deref(), Some("maybe"));
        assert!(stub.is_leaf());
    }

    #[test]
    fn duplicate_titles_resolve_to_first_node() {
        let nodes = vec![
            GraphNode::new("START").with_edge("", "A"),
            GraphNode::new("A").with_description("first"),
            GraphNode::new("A").with_description("second"),
        ];
        assert_eq!(duplicate_titles(&nodes), vec!["A"]);
        let tree = graph_to_tree(&nodes).unwrap();
        assert_eq!(tree.children[0].description, "first");
    }

    #[test]
    fn flattening_puts_root_first_and_records_edges() {
        let tree = TreeNode::new("r", "Root")
            .with_child(TreeNode::new("a", "A").with_edge_label("yes"))
            .with_child(
                TreeNode::new("B", "B").with_child(TreeNode::new("c", "C").with_description("leaf")),
            );
        let graph = tree_to_graph(&tree);

        let order: Vec<&str> = graph.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(order, vec!["Root", "A", "B", "C"]);
        assert_eq!(graph[0].id.as_deref(), Some("r"));
        assert_eq!(graph[0].edges, vec![Edge::new("yes", "A"), Edge::new("", "B")]);
        // An id equal to the title is implied and not written.
        assert_eq!(graph[2].id, None);
        assert_eq!(graph[3].description, "leaf");
    }

    #[test]
    fn flattening_merges_repeated_titles() {
        let tree = TreeNode::new("r", "Root")
            .with_child(
                TreeNode::new("a1", "A")
                    .with_description("kept")
                    .with_child(TreeNode::new("x", "X")),
            )
            .with_child(
                TreeNode::new("a2", "A")
                    .with_description("dropped")
                    .with_child(TreeNode::new("y", "Y")),
            );
        let graph = tree_to_graph(&tree);

        assert_eq!(graph.len(), 4);
        let a = &graph[1];
        assert_eq!(a.id.as_deref(), Some("a1"));
        assert_eq!(a.description, "kept");
        assert_eq!(a.edges, vec![Edge::new("", "X"), Edge::new("", "Y")]);
        assert_eq!(graph[0].edges, vec![Edge::new("", "A"), Edge::new("", "A")]);
    }

    #[test]
    fn tree_with_unique_titles_survives_round_trip() {
        let tree = TreeNode::new("START", "START")
            .with_description("entry")
            .with_child(
                TreeNode::new("n1", "Plan")
                    .with_description("what to do")
                    .with_edge_label("first")
                    .with_child(TreeNode::new("n2", "Step").with_edge_label("then")),
            )
            .with_child(TreeNode::new("n3", "Review"));

        let back = graph_to_tree(&tree_to_graph(&tree)).unwrap();
        assert_eq!(back, tree);
    }
}
