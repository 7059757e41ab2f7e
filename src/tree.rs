//! Ordered n-ary tree of directory and file nodes.
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other through
//! [`NodeId`] indices: children are an ordered list of ids and the parent is
//! an optional id. Each node caches its full relative path when it is
//! attached; nodes are never re-parented, so the cache never goes stale.

use std::collections::TryReserveError;
use std::fmt;

use log::{trace, warn};
use thiserror::Error;

use crate::constants::{PATH_SEPARATOR, PRINT_INDENT};

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    path: String,
    is_directory: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    /// The path segment this node was created from, without separator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Separator-joined names from the root down to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Reasons a node cannot be attached.
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("node name is empty")]
    EmptyName,

    #[error("tree already has the root '{0}'")]
    RootExists(String),

    #[error("cannot grow node storage: {0}")]
    Allocation(#[from] TryReserveError),
}

#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    /// If `id` was not produced by this tree or the tree has been cleared.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn full_path(&self, id: NodeId) -> &str {
        &self.nodes[id.0].path
    }

    /// Creates the root node. A trailing separator marks it as a directory and
    /// is not kept in its name.
    pub fn add_root(&mut self, name: &str) -> Result<NodeId, AttachError> {
        if let Some(root) = self.root {
            return Err(AttachError::RootExists(self.nodes[root.0].name.clone()));
        }
        let (name, is_directory) = split_separator(name);
        if name.is_empty() {
            return Err(AttachError::EmptyName);
        }
        self.nodes.try_reserve(1)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            path: name.to_string(),
            is_directory,
            children: Vec::new(),
            parent: None,
        });
        self.root = Some(id);
        Ok(id)
    }

    /// Attaches a new node named `name` as the last child of `parent`.
    ///
    /// The parent becomes a directory if it was not one already. Without a
    /// parent, a standalone root is created when the tree is still empty.
    pub fn attach_child(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
    ) -> Result<NodeId, AttachError> {
        let Some(parent) = parent else {
            if self.root.is_none() {
                warn!("no parent given, creating standalone root '{}'", name);
            }
            return self.add_root(name);
        };

        let (name, is_directory) = split_separator(name);
        if name.is_empty() {
            return Err(AttachError::EmptyName);
        }
        self.nodes.try_reserve(1)?;

        let id = NodeId(self.nodes.len());
        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.try_reserve(1)?;
        parent_node.children.push(id);
        if !parent_node.is_directory {
            trace!(
                "'{}' has children, marking it as a directory",
                parent_node.path
            );
            parent_node.is_directory = true;
        }
        let path = format!("{}{}{}", parent_node.path, PATH_SEPARATOR, name);

        self.nodes.push(Node {
            name: name.to_string(),
            path,
            is_directory,
            children: Vec::new(),
            parent: Some(parent),
        });
        Ok(id)
    }

    pub fn mark_directory(&mut self, id: NodeId) {
        self.nodes[id.0].is_directory = true;
    }

    /// Depth-first, parent-before-children traversal from the root.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: self.root.map(|root| (0, root)).into_iter().collect(),
        }
    }

    /// Ids in children-before-parent order.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            let children = self.nodes[id.0].children.iter().rev();
            stack.extend(children.map(|&child| (child, false)));
        }
        order
    }

    /// Releases every node, children before the node that owns them, and
    /// returns how many were released. Clearing an empty tree is a no-op.
    pub fn clear(&mut self) -> usize {
        let order = self.post_order();
        for id in &order {
            let node = std::mem::take(&mut self.nodes[id.0]);
            trace!("releasing '{}'", node.path);
            drop(node);
        }
        self.nodes.clear();
        self.root = None;
        order.len()
    }
}

/// Iterator returned by [`Tree::pre_order`], yielding `(depth, id)` pairs.
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for PreOrder<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let children = self.tree.nodes[id.0].children.iter().rev();
        self.stack.extend(children.map(|&child| (depth + 1, child)));
        Some((depth, id))
    }
}

/// Prints one node per line, indented by depth, directories with a trailing `/`.
/// The output is itself a valid template describing the same tree.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, id) in self.pre_order() {
            let node = &self.nodes[id.0];
            let marker = if node.is_directory { "/" } else { "" };
            writeln!(f, "{}{}{}", PRINT_INDENT.repeat(depth), node.name, marker)?;
        }
        Ok(())
    }
}

fn split_separator(name: &str) -> (&str, bool) {
    match name.strip_suffix(std::path::is_separator) {
        Some(stripped) => (stripped, true),
        None => (name, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(parts: &[&str]) -> String {
        parts.join(&PATH_SEPARATOR.to_string())
    }

    fn sample() -> (Tree, [NodeId; 4]) {
        let mut tree = Tree::new();
        let a = tree.add_root("a/").unwrap();
        let b = tree.attach_child(Some(a), "b").unwrap();
        let c = tree.attach_child(Some(a), "c/").unwrap();
        let d = tree.attach_child(Some(c), "d").unwrap();
        (tree, [a, b, c, d])
    }

    #[test]
    fn test_paths_are_joined_from_ancestors() {
        let (tree, [a, b, c, d]) = sample();
        assert_eq!(tree.full_path(a), "a");
        assert_eq!(tree.full_path(b), join(&["a", "b"]));
        assert_eq!(tree.full_path(c), join(&["a", "c"]));
        assert_eq!(tree.full_path(d), join(&["a", "c", "d"]));
        assert_eq!(tree.node(d).parent(), Some(c));
        assert_eq!(tree.node(a).children(), &[b, c]);
    }

    #[test]
    fn test_trailing_separator_marks_directory() {
        let (tree, [a, b, c, d]) = sample();
        assert!(tree.node(a).is_directory());
        assert!(!tree.node(b).is_directory());
        assert!(tree.node(c).is_directory());
        assert!(!tree.node(d).is_directory());
        assert_eq!(tree.node(c).name(), "c");
    }

    #[test]
    fn test_first_child_makes_parent_a_directory() {
        let mut tree = Tree::new();
        let root = tree.add_root("project").unwrap();
        assert!(!tree.node(root).is_directory());
        tree.attach_child(Some(root), "README.md").unwrap();
        assert!(tree.node(root).is_directory());
    }

    #[test]
    fn test_duplicate_siblings_are_distinct() {
        let mut tree = Tree::new();
        let root = tree.add_root("r/").unwrap();
        let first = tree.attach_child(Some(root), "x").unwrap();
        let second = tree.attach_child(Some(root), "x").unwrap();
        assert_ne!(first, second);
        assert_eq!(tree.node(root).children().len(), 2);
    }

    #[test]
    fn test_attach_without_parent() {
        let mut tree = Tree::new();
        let root = tree.attach_child(None, "standalone/").unwrap();
        assert_eq!(tree.root(), Some(root));
        assert!(tree.node(root).is_directory());

        match tree.attach_child(None, "other") {
            Err(AttachError::RootExists(name)) => assert_eq!(name, "standalone"),
            other => panic!("Expected RootExists, got {:?}", other),
        }
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut tree = Tree::new();
        assert!(matches!(tree.add_root(""), Err(AttachError::EmptyName)));
        assert!(matches!(tree.add_root("/"), Err(AttachError::EmptyName)));
        let root = tree.add_root("r").unwrap();
        assert!(matches!(
            tree.attach_child(Some(root), ""),
            Err(AttachError::EmptyName)
        ));
        assert!(!tree.node(root).is_directory());
    }

    #[test]
    fn test_traversal_orders() {
        let (tree, [a, b, c, d]) = sample();
        let pre: Vec<_> = tree.pre_order().collect();
        assert_eq!(pre, vec![(0, a), (1, b), (1, c), (2, d)]);
        assert_eq!(tree.post_order(), vec![b, d, c, a]);
    }

    #[test]
    fn test_display() {
        let (tree, _) = sample();
        assert_eq!(tree.to_string(), "a/\n    b\n    c/\n        d\n");
        assert_eq!(Tree::new().to_string(), "");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut tree, _) = sample();
        assert_eq!(tree.clear(), 4);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.clear(), 0);
        assert_eq!(tree.pre_order().count(), 0);
    }
}
