//! Bracketed rendering of trees for debugging and fixtures
//!
//! Every subtree is written as `{ ` + its left dependents + `form->deprel(attr)`
//! + its right dependents + `} `, so a verb with a subject and a period looks
//! like `{ { Robinson->nsubj(NNP)} graduated->ROOT(VBD){ .->punct(.)} }`.

use std::fmt::Write;

use crate::tree::{Attribute, NodeId, Tree};

/// Render a tree, labelling every word with `attr` (the tag by default)
///
/// An empty tree renders as an empty string.
pub fn format_tree(tree: &Tree, attr: Option<Attribute>) -> String {
    let mut out = String::new();
    if let Some(root) = tree.root_id {
        write_subtree(tree, root, attr.unwrap_or(Attribute::Tag), &mut out);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Print a tree to stdout in bracketed form
pub fn print_tree(tree: &Tree, attr: Option<Attribute>) {
    println!("{}", format_tree(tree, attr));
}

fn write_subtree(tree: &Tree, id: NodeId, attr: Attribute, out: &mut String) {
    let Some(node) = tree.get_node(id) else {
        return;
    };
    let (lefts, rights): (Vec<NodeId>, Vec<NodeId>) =
        node.children.iter().partition(|&&child| child < id);

    out.push_str("{ ");
    for child in lefts {
        write_subtree(tree, child, attr, out);
    }
    // Writing to a String cannot fail
    let _ = write!(out, "{}->{}({})", node.form, node.deprel, node.get(attr));
    for child in rights {
        write_subtree(tree, child, attr, out);
    }
    out.push_str("} ");
}
