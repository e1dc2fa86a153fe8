//! Permission tree: arena storage, incremental building, merge and subsumption
//!
//! Nodes live in a single `Vec` owned by the [`PermTree`]. Children are stored
//! as ordered lists of [`NodeId`]s and each node keeps a non-owning `parent`
//! index, so the parent/child relation never forms an ownership cycle.
//!
//! ```text
//! ~                       (root, index 0)
//! └── hello
//!     ├── sekai
//!     ├── world@abc=123
//!     └── world@xyz=987
//!         └── hey
//! ```

use crate::constraints::Constraints;
use crate::error::TreeError;
use crate::pattern::{Pattern, Segment, ROOT, WILDCARD};
use std::fmt;
use tracing::trace;

/// Index of a node inside its owning [`PermTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single path segment in a permission tree
#[derive(Debug, Clone)]
pub struct Node {
    value: String,
    constraints: Constraints,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(value: String, constraints: Constraints, parent: Option<NodeId>) -> Self {
        Self {
            value,
            constraints,
            parent,
            children: Vec::new(),
        }
    }

    /// Segment value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Constraint set
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is a root
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node is the wildcard
    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Exact match, used to deduplicate nodes while building
    ///
    /// True iff the value is equal and the constraint sets are equal.
    pub fn matches_exact(&self, value: &str, constraints: &Constraints) -> bool {
        self.value == value && self.constraints.matches_exact(constraints)
    }

    /// Asymmetric match, used during subsumption
    ///
    /// True iff the value is equal and every constraint in `constraints` holds on
    /// this node. Constraints carried by this node but not requested are ignored.
    pub fn matches_request(&self, value: &str, constraints: &Constraints) -> bool {
        self.value == value && self.constraints.satisfies(constraints)
    }
}

/// Rooted permission tree
#[derive(Debug, Clone)]
pub struct PermTree {
    nodes: Vec<Node>,
}

impl Default for PermTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PermTree {
    /// Create a tree holding only the `~` root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(ROOT.to_string(), Constraints::new(), None)],
        }
    }

    /// Build a standalone tree with a single path from a parsed pattern
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let mut tree = Self::new();
        tree.append_path(tree.root(), pattern.segments());
        tree
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look up a node that is known to belong to this tree
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Children of `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Distance from the root
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        depth
    }

    /// First child of `id` with the given value, regardless of constraints
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn get_child(&self, id: NodeId, value: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).value == value)
    }

    /// Wildcard child of `id`, if any
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn wildcard_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).is_wildcard())
    }

    /// Whether `id` has a wildcard child
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn has_wildcard_child(&self, id: NodeId) -> bool {
        self.wildcard_child(id).is_some()
    }

    /// Append a child under `parent`, reusing an equivalent one if present
    ///
    /// A child is reused when its value and constraint set are exactly equal to
    /// the arguments. A wildcard is always folded into an existing wildcard
    /// child so that a node never has more than one. On reuse, constraint keys
    /// not yet present on the child are added; existing keys are never
    /// overwritten.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not produced by this tree.
    pub fn append(&mut self, parent: NodeId, value: &str, constraints: &Constraints) -> NodeId {
        let existing = if value == WILDCARD {
            self.wildcard_child(parent)
        } else {
            self.children(parent)
                .iter()
                .copied()
                .find(|&child| self.node(child).matches_exact(value, constraints))
        };

        if let Some(child) = existing {
            let added = self.nodes[child.0].constraints.extend_missing(constraints);
            trace!(node = %child, value, added, "Reusing existing node");
            return child;
        }

        let child = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(value.to_string(), constraints.clone(), Some(parent)));
        self.nodes[parent.0].children.push(child);
        trace!(node = %child, parent = %parent, value, "Appended node");
        child
    }

    /// Append a chain of segments below `from`, returning the deepest node
    ///
    /// # Panics
    ///
    /// Panics if `from` was not produced by this tree.
    pub fn append_path(&mut self, from: NodeId, segments: &[Segment]) -> NodeId {
        segments.iter().fold(from, |current, segment| {
            self.append(current, &segment.value, &segment.constraints)
        })
    }

    /// Move `node` (with its subtree) under `new_parent`
    ///
    /// Detaches `node` from its current parent and links it as the last child
    /// of `new_parent`. This is a raw restructuring primitive: no
    /// deduplication is performed against `new_parent`'s existing children.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        if node.0 >= self.nodes.len() {
            return Err(TreeError::UnknownNode(node));
        }
        if new_parent.0 >= self.nodes.len() {
            return Err(TreeError::UnknownNode(new_parent));
        }
        if node == self.root() {
            return Err(TreeError::RootMove);
        }
        if self.is_ancestor_or_self(node, new_parent) {
            return Err(TreeError::Cycle {
                node,
                parent: new_parent,
            });
        }

        if let Some(old_parent) = self.nodes[node.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != node);
        }

        self.nodes[node.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(node);
        trace!(node = %node, parent = %new_parent, "Re-parented node");
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Structural union of `src`'s subtree at `src_node` into `dst`
    ///
    /// Does nothing unless `dst` and `src_node` are exactly equal (same value,
    /// same constraint set). Otherwise every child of `src_node` is appended
    /// under `dst` and merged recursively.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is not a node of this tree or `src_node` was not produced by this tree.
    pub fn merge(&mut self, dst: NodeId, src: &PermTree, src_node: NodeId) {
        let source = src.node(src_node);
        if !self.node(dst).matches_exact(&source.value, &source.constraints) {
            trace!(dst = %dst, src = %src_node, "Merge skipped: roots differ");
            return;
        }
        self.merge_children(dst, src, src_node);
    }

    /// Merge a whole tree at the root
    pub fn merge_tree(&mut self, src: &PermTree) {
        self.merge(self.root(), src, src.root());
    }

    fn merge_children(&mut self, dst: NodeId, src: &PermTree, src_node: NodeId) {
        for &child in src.children(src_node) {
            let source = src.node(child);
            let target = self.append(dst, &source.value, &source.constraints);
            self.merge_children(target, src, child);
        }
    }

    /// Whether this tree authorizes every path in `request`
    ///
    /// Both trees are compared from their roots.
    pub fn includes(&self, request: &PermTree) -> bool {
        self.includes_at(self.root(), request, request.root())
    }

    /// Whether the grant subtree at `grant` authorizes the request subtree at
    /// `request_node`
    ///
    /// A wildcard grant node authorizes anything beneath it. Otherwise the grant
    /// node must asymmetrically match the request node, and every request child
    /// must be authorized by some grant child: an asymmetrically matching one,
    /// or failing that the wildcard child.
    ///
    /// # Panics
    ///
    /// Panics if `grant` is not a node of this tree or `request_node` was not produced by this tree.
    pub fn includes_at(&self, grant: NodeId, request: &PermTree, request_node: NodeId) -> bool {
        let grant_node = self.node(grant);
        if grant_node.is_wildcard() {
            trace!(grant = %grant, "Wildcard grant absorbs request subtree");
            return true;
        }

        let req = request.node(request_node);
        if !grant_node.matches_request(&req.value, &req.constraints) {
            return false;
        }

        request
            .children(request_node)
            .iter()
            .all(|&req_child| self.child_includes(grant, request, req_child))
    }

    fn child_includes(&self, grant: NodeId, request: &PermTree, req_child: NodeId) -> bool {
        let req = request.node(req_child);

        let matched = self
            .children(grant)
            .iter()
            .copied()
            .filter(|&child| {
                let node = self.node(child);
                !node.is_wildcard() && node.matches_request(&req.value, &req.constraints)
            })
            .any(|child| self.includes_at(child, request, req_child));

        if matched {
            return true;
        }

        match self.wildcard_child(grant) {
            Some(wildcard) => self.includes_at(wildcard, request, req_child),
            None => {
                trace!(grant = %grant, value = %req.value, "No grant child matches request");
                false
            }
        }
    }

    /// One canonical pattern per root-to-leaf path
    ///
    /// An empty tree yields no patterns.
    pub fn patterns(&self) -> Vec<Pattern> {
        let mut patterns = Vec::new();
        let mut path = Vec::new();
        for &child in self.children(self.root()) {
            self.collect_patterns(child, &mut path, &mut patterns);
        }
        patterns
    }

    fn collect_patterns(&self, id: NodeId, path: &mut Vec<Segment>, out: &mut Vec<Pattern>) {
        let node = self.node(id);
        path.push(Segment {
            value: node.value.clone(),
            constraints: node.constraints.clone(),
        });

        if node.children.is_empty() {
            out.push(Pattern::from_segments(path.clone()));
        } else {
            for &child in &node.children {
                self.collect_patterns(child, path, out);
            }
        }

        path.pop();
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        let node = self.node(id);
        write!(f, "{:indent$}{}", "", node.value, indent = indent * 2)?;
        if !node.constraints.is_empty() {
            write!(f, "@{}", node.constraints)?;
        }
        writeln!(f)?;

        for &child in &node.children {
            self.fmt_node(f, child, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for PermTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}
