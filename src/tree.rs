//! Tree data structures for pattern matching
//!
//! The matcher only needs a root, the categorical attributes of a node and
//! the ordered `(label, child)` edges below it. That contract is the
//! [`DependencyTree`] trait; [`Tree`] is the arena-backed implementation
//! produced by the CoNLL-U reader.

use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a node
pub type NodeId = usize;

/// Read-only view of a rooted tree with labeled edges
///
/// Node handles are cheap copies (an index, a reference). Attribute order
/// and child order must be stable: the collector reports nodes in
/// depth-first, left-to-right order.
pub trait DependencyTree {
    type NodeRef: Copy;

    /// The single entry point of the tree, `None` for an empty tree
    fn root(&self) -> Option<Self::NodeRef>;

    /// Categorical attributes a node-specifier literal is compared against
    fn attributes(&self, node: Self::NodeRef) -> impl Iterator<Item = &str>;

    /// Outgoing `(edge-label, child)` pairs in tree order
    fn edges(&self, node: Self::NodeRef) -> impl Iterator<Item = (&str, Self::NodeRef)>;
}

/// Node attributes that can be selected for display or lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Tag,
    Pos,
    EntType,
    Lemma,
    Form,
    Deprel,
}

impl Attribute {
    /// The attribute classes a node-specifier literal may match, in probe order
    pub const CATEGORICAL: [Attribute; 4] = [
        Attribute::Tag,
        Attribute::Pos,
        Attribute::EntType,
        Attribute::Lemma,
    ];
}

/// Error for unknown attribute names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    /// Accepts plain names and the spaCy token attribute names (`tag_`, `dep_`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('_') {
            "tag" | "xpos" => Ok(Attribute::Tag),
            "pos" | "upos" => Ok(Attribute::Pos),
            "ent_type" | "entity" => Ok(Attribute::EntType),
            "lemma" => Ok(Attribute::Lemma),
            "form" | "orth" | "text" => Ok(Attribute::Form),
            "dep" | "deprel" => Ok(Attribute::Deprel),
            _ => Err(UnknownAttribute(s.to_string())),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Tag => "tag",
            Attribute::Pos => "pos",
            Attribute::EntType => "ent_type",
            Attribute::Lemma => "lemma",
            Attribute::Form => "form",
            Attribute::Deprel => "deprel",
        };
        f.write_str(name)
    }
}

/// A node (word) in a dependency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub form: String,
    pub lemma: String,
    /// Coarse part of speech (UPOS)
    pub pos: String,
    /// Fine-grained tag (XPOS), empty when unknown
    pub tag: String,
    /// Named entity type, empty outside entities
    pub ent_type: String,
    /// Label of the edge from the parent
    pub deprel: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a new node with the given attributes
    pub fn new(id: NodeId, form: &str, lemma: &str, pos: &str, tag: &str, deprel: &str) -> Self {
        Self {
            id,
            form: form.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            tag: tag.to_string(),
            ent_type: String::new(),
            deprel: deprel.to_string(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the entity type
    pub fn with_ent_type(mut self, ent_type: &str) -> Self {
        self.ent_type = ent_type.to_string();
        self
    }

    pub fn get(&self, attr: Attribute) -> &str {
        match attr {
            Attribute::Tag => &self.tag,
            Attribute::Pos => &self.pos,
            Attribute::EntType => &self.ent_type,
            Attribute::Lemma => &self.lemma,
            Attribute::Form => &self.form,
            Attribute::Deprel => &self.deprel,
        }
    }

    /// Categorical attributes in probe order (tag, pos, entity type, lemma)
    pub fn attributes(&self) -> [&str; 4] {
        Attribute::CATEGORICAL.map(|attr| self.get(attr))
    }
}

/// A dependency tree (sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root_id: Option<NodeId>,
    pub sentence_text: Option<String>,
    pub metadata: FxHashMap<String, String>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree carrying sentence-level comments
    pub fn with_metadata(
        sentence_text: Option<String>,
        metadata: FxHashMap<String, String>,
    ) -> Self {
        Self {
            sentence_text,
            metadata,
            ..Self::default()
        }
    }

    /// Add a node to the tree
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Set the parent of a node
    ///
    /// Children are appended, so calling this in word order keeps every
    /// child list sorted.
    pub fn set_parent(&mut self, child_id: NodeId, parent_id: NodeId) {
        if let Some(child) = self.get_node_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.get_node_mut(parent_id) {
            parent.children.push(child_id);
        }
    }

    /// Get the children of a node
    pub fn children(&self, node_id: NodeId) -> Vec<&Node> {
        if let Some(node) = self.get_node(node_id) {
            node.children
                .iter()
                .filter_map(|&id| self.get_node(id))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get the parent of a node
    pub fn parent(&self, node_id: NodeId) -> Option<&Node> {
        self.get_node(node_id)
            .and_then(|node| node.parent)
            .and_then(|parent_id| self.get_node(parent_id))
    }

    /// Get the root node
    pub fn root_node(&self) -> Option<&Node> {
        self.root_id.and_then(|id| self.get_node(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl DependencyTree for Tree {
    type NodeRef = NodeId;

    fn root(&self) -> Option<NodeId> {
        self.root_id
    }

    fn attributes(&self, node: NodeId) -> impl Iterator<Item = &str> {
        self.get_node(node).into_iter().flat_map(Node::attributes)
    }

    fn edges(&self, node: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.children(node)
            .into_iter()
            .map(|child| (child.deprel.as_str(), child.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> Tree {
        let mut tree = Tree::new();
        tree.add_node(Node::new(0, "runs", "run", "VERB", "VBZ", "root"));
        tree.add_node(Node::new(1, "dog", "dog", "NOUN", "NN", "nsubj"));
        tree.add_node(Node::new(2, "quickly", "quickly", "ADV", "RB", "advmod"));
        tree.set_parent(1, 0);
        tree.set_parent(2, 0);
        tree.root_id = Some(0);
        tree
    }

    #[test]
    fn test_tree_creation() {
        let tree = create_test_tree();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.parent(1).unwrap().id, 0);
        assert_eq!(tree.children(0).len(), 2);
        assert_eq!(tree.root_node().unwrap().form, "runs");
    }

    #[test]
    fn test_attributes_probe_order() {
        let node = Node::new(0, "Paris", "Paris", "PROPN", "NNP", "pobj").with_ent_type("GPE");
        assert_eq!(node.attributes(), ["NNP", "PROPN", "GPE", "Paris"]);
    }

    #[test]
    fn test_edges_in_child_order() {
        let tree = create_test_tree();
        let edges: Vec<_> = tree.edges(0).collect();
        assert_eq!(edges, vec![("nsubj", 1), ("advmod", 2)]);
        assert_eq!(tree.edges(2).count(), 0);
    }

    #[test]
    fn test_attributes_of_missing_node() {
        let tree = create_test_tree();
        assert_eq!(tree.attributes(42).count(), 0);
    }

    #[test]
    fn test_attribute_from_str() {
        assert_eq!("tag_".parse::<Attribute>().unwrap(), Attribute::Tag);
        assert_eq!("ent_type_".parse::<Attribute>().unwrap(), Attribute::EntType);
        assert_eq!("orth_".parse::<Attribute>().unwrap(), Attribute::Form);
        assert_eq!("deprel".parse::<Attribute>().unwrap(), Attribute::Deprel);
        assert!("shape_".parse::<Attribute>().is_err());
    }
}
