//! Path pattern syntax and specifier matching
//!
//! A pattern is a `/`-separated list of segments. Even segments describe
//! nodes, odd segments describe the edge leading to the next node:
//!
//! ```text
//! VBD/prep/IN/pobj/NNP
//! ```
//!
//! Each segment is a specifier: a literal (`NNP`), a negation (`!NNP`), a
//! list of alternatives (`[pobj,prep]`), or a wildcard (`*` for one node or
//! edge, `**` for one or more levels when used on an edge).

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

use crate::tree::DependencyTree;

#[derive(Parser)]
#[grammar = "pattern.pest"]
struct PatternParser;

/// Edge-specifier that descends through any number of levels
pub const DEEP_WILDCARD: &str = "**";

/// The pattern string does not follow the pattern grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error in syntax of provided pattern ({pattern})")]
pub struct PatternSyntaxError {
    pub pattern: String,
}

impl PatternSyntaxError {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }
}

/// Which part of the tree a specifier is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Node,
    Edge,
}

impl Role {
    /// Role of the segment at `index` in a pattern
    pub fn of_segment(index: usize) -> Self {
        if index % 2 == 0 { Role::Node } else { Role::Edge }
    }
}

/// Check that every segment of a pattern is well formed
pub fn validate_pattern(pattern: &str) -> bool {
    PatternParser::parse(Rule::pattern, pattern).is_ok()
}

/// Validate a pattern and split it into its segments
pub fn parse_segments(pattern: &str) -> Result<Vec<&str>, PatternSyntaxError> {
    let mut pairs = PatternParser::parse(Rule::pattern, pattern).map_err(|err| {
        debug!(pattern, error = %err, "rejected pattern");
        PatternSyntaxError::new(pattern)
    })?;

    let Some(pattern_pair) = pairs.next() else {
        return Err(PatternSyntaxError::new(pattern));
    };

    Ok(pattern_pair
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::segment)
        .map(|pair| pair.as_str())
        .collect())
}

/// Evaluate a validated specifier
///
/// `literal_matches` decides the literal case; negation, alternation and
/// wildcards are handled here. Malformed specifiers give unspecified results.
pub fn matches_specifier<F>(specifier: &str, literal_matches: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    let specifier = specifier.trim();

    if let Some(inner) = specifier.strip_prefix('!') {
        return !matches_specifier(inner, literal_matches);
    }

    if let Some(list) = specifier.strip_prefix('[') {
        let list = list.strip_suffix(']').unwrap_or(list);
        return list
            .split(',')
            .any(|member| matches_specifier(member, literal_matches));
    }

    match specifier {
        "*" | DEEP_WILDCARD => true,
        literal => literal_matches(literal),
    }
}

/// Does a node-specifier match the node?
///
/// A literal matches if it equals any categorical attribute of the node.
pub fn matches_node<T>(tree: &T, node: T::NodeRef, specifier: &str) -> bool
where
    T: DependencyTree + ?Sized,
{
    matches_specifier(specifier, &|literal: &str| {
        tree.attributes(node).any(|value| value == literal)
    })
}

/// Does an edge-specifier match the edge label?
pub fn matches_edge(label: &str, specifier: &str) -> bool {
    matches_specifier(specifier, &|literal: &str| literal == label)
}

/// Evaluate a specifier in either role
pub fn matches_role<T>(tree: &T, node: T::NodeRef, label: &str, specifier: &str, role: Role) -> bool
where
    T: DependencyTree + ?Sized,
{
    match role {
        Role::Node => matches_node(tree, node, specifier),
        Role::Edge => matches_edge(label, specifier),
    }
}
