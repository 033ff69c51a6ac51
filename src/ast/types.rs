//! AST Node Types for Shell Commands
//!
//! The tree is stored in an arena: nodes live in a `Vec` owned by [`Ast`] and
//! refer to each other through [`NodeId`] indices. A node's parent owns it;
//! the `parent` and `utility` links are plain indices used for lookup only.

use std::cmp::Ordering;
use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::grammar::{ArgType, Associativity};

// =============================================================================
// NODE KINDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Pipeline,
    Utility,
    Option,
    Argument,
    BinaryLogicOp,
    UnaryLogicOp,
    Bracket,
    CommandSubstitution,
    ProcessSubstitution,
    /// Non-terminal placeholder
    Nt,
    /// Generic terminal
    T,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Root,
        NodeKind::Pipeline,
        NodeKind::Utility,
        NodeKind::Option,
        NodeKind::Argument,
        NodeKind::BinaryLogicOp,
        NodeKind::UnaryLogicOp,
        NodeKind::Bracket,
        NodeKind::CommandSubstitution,
        NodeKind::ProcessSubstitution,
        NodeKind::Nt,
        NodeKind::T,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Pipeline => "pipeline",
            Self::Utility => "utility",
            Self::Option => "option",
            Self::Argument => "argument",
            Self::BinaryLogicOp => "binarylogicop",
            Self::UnaryLogicOp => "unarylogicop",
            Self::Bracket => "bracket",
            Self::CommandSubstitution => "commandsubstitution",
            Self::ProcessSubstitution => "processsubstitution",
            Self::Nt => "nt",
            Self::T => "t",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|k| k.as_str() == lower)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

// =============================================================================
// NODE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: String,
    /// Set only on argument nodes.
    pub arg_type: Option<ArgType>,
    /// Set only on unary logic operators.
    pub associativity: Option<Associativity>,
    /// Structural qualifier assigned by the normalizer (`find@@-name@@`).
    pub simple_prefix: String,
    /// Ordinal among same-typed positional arguments, when position matters.
    pub index: Option<usize>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    utility: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            arg_type: None,
            associativity: None,
            simple_prefix: String::new(),
            index: None,
            children: Vec::new(),
            parent: None,
            utility: None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Nearest enclosing utility.
    pub fn utility(&self) -> Option<NodeId> {
        self.utility
    }

    pub fn is_utility(&self) -> bool {
        self.kind == NodeKind::Utility
    }

    pub fn is_option(&self) -> bool {
        self.kind == NodeKind::Option
    }

    pub fn is_argument(&self) -> bool {
        self.kind == NodeKind::Argument
    }

    pub fn is_open_vocab(&self) -> bool {
        self.is_argument() && self.arg_type.map_or(false, |t| t.is_open_vocab())
    }
}

// =============================================================================
// AST ARENA
// =============================================================================

/// A command tree. Exactly one root, created with the tree.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, "root")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// The utility node an option or argument belongs to.
    pub fn utility_of(&self, id: NodeId) -> Option<&Node> {
        self.nodes[id.0].utility.map(|u| self.node(u))
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind, value: impl Into<String>) -> NodeId {
        let mut node = Node::new(kind, value);
        if kind == NodeKind::UnaryLogicOp {
            node.associativity = Some(Associativity::Right);
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_argument(&mut self, value: impl Into<String>, arg_type: ArgType) -> NodeId {
        let id = self.create(NodeKind::Argument, value);
        self.nodes[id.0].arg_type = Some(arg_type);
        id
    }

    /// Append `child` under `parent` and refresh the utility links of the
    /// moved subtree.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.refresh_utility(child);
    }

    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, value: impl Into<String>) -> NodeId {
        let id = self.create(kind, value);
        self.attach(parent, id);
        id
    }

    pub fn add_argument(
        &mut self,
        parent: NodeId,
        value: impl Into<String>,
        arg_type: ArgType,
    ) -> NodeId {
        let id = self.create_argument(value, arg_type);
        self.attach(parent, id);
        id
    }

    /// Reorder the children of `id`. `order` must be a permutation of the
    /// current children.
    pub(crate) fn reorder_children(&mut self, id: NodeId, order: Vec<NodeId>) {
        debug_assert_eq!(order.len(), self.nodes[id.0].children.len());
        self.nodes[id.0].children = order;
    }

    /// Unlink `child` from `parent`. The node stays in the arena, unreachable.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|c| *c != child);
        self.nodes[child.0].parent = None;
        self.refresh_utility(child);
    }

    fn refresh_utility(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let utility = self.nodes[current.0].parent.and_then(|p| {
                if self.nodes[p.0].is_utility() {
                    Some(p)
                } else {
                    self.nodes[p.0].utility
                }
            });
            self.nodes[current.0].utility = utility;
            stack.extend(self.nodes[current.0].children.iter().copied());
        }
    }

    /// Node ids of the subtree rooted at `id`, depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Children in emission order: sorted by subtree when flag order is
    /// ignored and `id` is a utility.
    pub fn ordered_children(&self, id: NodeId, ignore_flag_order: bool) -> Vec<NodeId> {
        let mut children = self.nodes[id.0].children.clone();
        if ignore_flag_order && self.nodes[id.0].is_utility() {
            children.sort_by(|a, b| self.cmp_subtrees(*a, *b));
        }
        children
    }

    /// Total order on subtrees: value first, then kind and argument type,
    /// then children in their flag-order-free emission order.
    pub fn cmp_subtrees(&self, a: NodeId, b: NodeId) -> Ordering {
        let (na, nb) = (self.node(a), self.node(b));
        na.value
            .cmp(&nb.value)
            .then_with(|| na.kind.as_str().cmp(nb.kind.as_str()))
            .then_with(|| na.arg_type.map(|t| t.as_str()).cmp(&nb.arg_type.map(|t| t.as_str())))
            .then_with(|| {
                let ca = self.ordered_children(a, true);
                let cb = self.ordered_children(b, true);
                ca.iter()
                    .zip(cb.iter())
                    .map(|(x, y)| self.cmp_subtrees(*x, *y))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or_else(|| ca.len().cmp(&cb.len()))
            })
    }

    /// Structural equality under kind, value, argument type and child order.
    pub fn isomorphic(&self, other: &Ast, ignore_flag_order: bool) -> bool {
        self.subtree_isomorphic(self.root, other, other.root, ignore_flag_order)
    }

    pub fn subtree_isomorphic(
        &self,
        a: NodeId,
        other: &Ast,
        b: NodeId,
        ignore_flag_order: bool,
    ) -> bool {
        let (na, nb) = (self.node(a), other.node(b));
        if na.kind != nb.kind
            || na.value != nb.value
            || na.arg_type != nb.arg_type
            || na.children.len() != nb.children.len()
        {
            return false;
        }
        let ca = self.ordered_children(a, ignore_flag_order);
        let cb = other.ordered_children(b, ignore_flag_order);
        ca.iter()
            .zip(cb.iter())
            .all(|(x, y)| self.subtree_isomorphic(*x, other, *y, ignore_flag_order))
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        write!(
            f,
            "{}{}({})",
            "    ".repeat(depth),
            node.kind.as_str().to_ascii_uppercase(),
            node.value
        )?;
        if let Some(t) = node.arg_type {
            write!(f, "<{}>", t)?;
        }
        writeln!(f)?;
        for child in &node.children {
            self.fmt_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.isomorphic(other, false)
    }
}

/// Indented `KIND(value)<ArgType>` dump of the tree.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}

// =============================================================================
// JSON VIEW
// =============================================================================

struct NodeView<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.ast.node(self.id);
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("kind", &node.kind)?;
        state.serialize_field("value", &node.value)?;
        state.serialize_field("arg_type", &node.arg_type)?;
        let children: Vec<NodeView<'_>> = node
            .children
            .iter()
            .map(|c| NodeView { ast: self.ast, id: *c })
            .collect();
        state.serialize_field("children", &children)?;
        state.end()
    }
}

impl Serialize for Ast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeView { ast: self, id: self.root }.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        let mut ast = Ast::new();
        let root = ast.root();
        let find = ast.add_child(root, NodeKind::Utility, "find");
        ast.add_argument(find, ".", ArgType::Path);
        let name = ast.add_child(find, NodeKind::Option, "-name");
        ast.add_argument(name, "foo", ArgType::Regex);
        ast
    }

    #[test]
    fn test_back_references() {
        let ast = sample();
        let find = ast.children(ast.root())[0];
        let name = ast.children(find)[1];
        let arg = ast.children(name)[0];
        assert_eq!(ast.parent(arg), Some(name));
        assert_eq!(ast.utility_of(arg).map(|n| n.value.as_str()), Some("find"));
        assert_eq!(ast.utility_of(name).map(|n| n.value.as_str()), Some("find"));
        assert!(ast.utility_of(find).is_none());
    }

    #[test]
    fn test_attach_detached_subtree_refreshes_utility() {
        let mut ast = Ast::new();
        let opt = ast.create(NodeKind::Option, "-n");
        let arg = ast.create_argument("5", ArgType::Number);
        ast.attach(opt, arg);
        assert!(ast.node(arg).utility().is_none());
        let head = ast.add_child(ast.root(), NodeKind::Utility, "head");
        ast.attach(head, opt);
        assert_eq!(ast.node(arg).utility(), Some(head));
    }

    #[test]
    fn test_isomorphic_respects_flag_order_policy() {
        let mut a = Ast::new();
        let ls = a.add_child(a.root(), NodeKind::Utility, "ls");
        a.add_child(ls, NodeKind::Option, "-l");
        a.add_child(ls, NodeKind::Option, "-a");

        let mut b = Ast::new();
        let ls = b.add_child(b.root(), NodeKind::Utility, "ls");
        b.add_child(ls, NodeKind::Option, "-a");
        b.add_child(ls, NodeKind::Option, "-l");

        assert_ne!(a, b);
        assert!(a.isomorphic(&b, true));
    }

    #[test]
    fn test_same_flag_ordered_by_argument() {
        let build = |first: &str, second: &str| {
            let mut ast = Ast::new();
            let grep = ast.add_child(ast.root(), NodeKind::Utility, "grep");
            for pattern in [first, second] {
                let e = ast.add_child(grep, NodeKind::Option, "-e");
                ast.add_argument(e, pattern, ArgType::Regex);
            }
            ast
        };
        let (a, b) = (build("foo", "bar"), build("bar", "foo"));
        assert!(a.isomorphic(&b, true));
        assert!(!a.isomorphic(&b, false));
        let grep = a.children(a.root())[0];
        let ordered = a.ordered_children(grep, true);
        assert_eq!(a.node(a.children(ordered[0])[0]).value, "bar");
    }

    #[test]
    fn test_pretty_print() {
        let text = sample().to_string();
        assert_eq!(
            text,
            "ROOT(root)\n    UTILITY(find)\n        ARGUMENT(.)<Path>\n        OPTION(-name)\n            ARGUMENT(foo)<Regex>\n"
        );
    }

    #[test]
    fn test_json_view() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "root");
        assert_eq!(json["children"][0]["value"], "find");
        assert_eq!(json["children"][0]["children"][1]["children"][0]["arg_type"], "Regex");
    }

    #[test]
    fn test_kind_names() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("BINARYLOGICOP"), Some(NodeKind::BinaryLogicOp));
    }
}
