//! Matching path patterns against trees
//!
//! Both entry points validate the pattern, then walk the tree depth-first
//! from the root:
//! 1. A node segment must match the current node
//! 2. An edge segment must match the label of an edge to a child
//! 3. `**` on an edge also retries itself one level further down
//!
//! [`match_tree`] stops at the first path that realizes the whole pattern,
//! [`find_tokens`] explores every path and collects where they end.

use tracing::trace;

use crate::pattern::{DEEP_WILDCARD, PatternSyntaxError, matches_edge, matches_node, parse_segments};
use crate::tree::DependencyTree;

/// Does any path from the root realize the pattern?
///
/// Fails only when the pattern is malformed. An empty tree never matches.
pub fn match_tree<T>(tree: &T, pattern: &str) -> Result<bool, PatternSyntaxError>
where
    T: DependencyTree + ?Sized,
{
    let segments = parse_segments(pattern)?;
    let matched = tree
        .root()
        .is_some_and(|root| match_node(tree, root, &segments));

    trace!(pattern, matched, "match_tree");
    Ok(matched)
}

/// Collect every node at which a path realizing the pattern ends
///
/// Nodes are returned in depth-first, left-to-right discovery order. A node
/// reached by several matching paths appears once per path.
pub fn find_tokens<T>(tree: &T, pattern: &str) -> Result<Vec<T::NodeRef>, PatternSyntaxError>
where
    T: DependencyTree + ?Sized,
{
    let segments = parse_segments(pattern)?;
    let mut found = Vec::new();
    if let Some(root) = tree.root() {
        collect_node(tree, root, &segments, &mut found);
    }

    trace!(pattern, found = found.len(), "find_tokens");
    Ok(found)
}

fn match_node<T>(tree: &T, node: T::NodeRef, segments: &[&str]) -> bool
where
    T: DependencyTree + ?Sized,
{
    let Some((specifier, rest)) = segments.split_first() else {
        return true;
    };
    matches_node(tree, node, specifier) && match_edges(tree, node, rest)
}

fn match_edges<T>(tree: &T, node: T::NodeRef, segments: &[&str]) -> bool
where
    T: DependencyTree + ?Sized,
{
    let Some((&specifier, rest)) = segments.split_first() else {
        return true;
    };
    let deep = specifier == DEEP_WILDCARD;

    tree.edges(node).any(|(label, child)| {
        (matches_edge(label, specifier) && match_node(tree, child, rest))
            // keep `**` in front and descend one more level
            || (deep && match_edges(tree, child, segments))
    })
}

fn collect_node<T>(tree: &T, node: T::NodeRef, segments: &[&str], found: &mut Vec<T::NodeRef>)
where
    T: DependencyTree + ?Sized,
{
    match segments.split_first() {
        None => found.push(node),
        Some((specifier, rest)) => {
            if !matches_node(tree, node, specifier) {
                return;
            }
            if rest.is_empty() {
                found.push(node);
            } else {
                collect_edges(tree, node, rest, found);
            }
        }
    }
}

fn collect_edges<T>(tree: &T, node: T::NodeRef, segments: &[&str], found: &mut Vec<T::NodeRef>)
where
    T: DependencyTree + ?Sized,
{
    let Some((&specifier, rest)) = segments.split_first() else {
        return;
    };
    let deep = specifier == DEEP_WILDCARD;

    for (label, child) in tree.edges(node) {
        if matches_edge(label, specifier) {
            collect_node(tree, child, rest, found);
        }
        // Deeper levels are explored even when the current level matched
        if deep {
            collect_edges(tree, child, segments, found);
        }
    }
}
