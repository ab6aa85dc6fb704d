//! Grammaregex: regex-like path patterns over dependency trees
//!
//! A pattern such as `VBD/prep/IN/pobj/NNP` alternates node-specifiers
//! (matched against a word's tag, part of speech, entity type or lemma) and
//! edge-specifiers (matched against the dependency relation). Trees come from
//! CoNLL-U text or from any type implementing [`DependencyTree`].
//!
//! ```
//! use grammaregex::{CoNLLUReader, find_tokens, match_tree};
//!
//! let conllu = "1\tdogs\tdog\tNOUN\tNNS\t_\t2\tnsubj\t_\t_\n\
//!               2\tbark\tbark\tVERB\tVBP\t_\t0\troot\t_\t_\n";
//! let tree = CoNLLUReader::from_str(conllu).next().unwrap().unwrap();
//!
//! assert!(match_tree(&tree, "VBP/nsubj/NNS").unwrap());
//! assert_eq!(find_tokens(&tree, "VERB/*/*").unwrap(), vec![0]);
//! ```

pub mod conllu; // CoNLL-U file parsing
pub mod matcher; // Existential match and exhaustive collection
pub mod pattern; // Pattern grammar, validation and specifier matching
pub mod print; // Bracketed tree rendering
pub mod tree; // Tree model and the DependencyTree trait

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use conllu::{CoNLLUReader, ConllError, ParseError, read_trees};
pub use matcher::{find_tokens, match_tree};
pub use pattern::{
    PatternSyntaxError, Role, matches_edge, matches_node, matches_specifier, parse_segments,
    validate_pattern,
};
pub use print::{format_tree, print_tree};
pub use tree::{Attribute, DependencyTree, Node, NodeId, Tree};
