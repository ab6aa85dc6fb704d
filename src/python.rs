//! Python bindings for grammaregex
//!
//! This module provides PyO3-based Python bindings for the Rust core.

use pyo3::create_exception;
use pyo3::exceptions::{PyIOError, PyIndexError, PyValueError};
use pyo3::prelude::*;
use std::path::Path;
use std::sync::Arc;

use crate::conllu::{CoNLLUReader, ConllError, ParseError};
use crate::matcher::{find_tokens, match_tree};
use crate::pattern::{PatternSyntaxError, validate_pattern};
use crate::print::format_tree;
use crate::tree::{Attribute, NodeId, Tree as RustTree};

create_exception!(
    grammaregex,
    PatternSyntaxException,
    PyValueError,
    "Raised when a pattern does not follow the pattern grammar."
);

impl From<PatternSyntaxError> for PyErr {
    fn from(err: PatternSyntaxError) -> PyErr {
        PatternSyntaxException::new_err(err.to_string())
    }
}

impl From<ConllError> for PyErr {
    fn from(err: ConllError) -> PyErr {
        match err {
            ConllError::Parse(e) => e.into(),
            other => PyIOError::new_err(other.to_string()),
        }
    }
}

impl From<ParseError> for PyErr {
    fn from(err: ParseError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[pyclass(name = "Tree")]
#[derive(Clone)]
pub struct PyTree {
    pub(crate) inner: Arc<RustTree>,
}

impl PyTree {
    fn word(&self, id: NodeId) -> PyWord {
        PyWord {
            id,
            tree: Arc::clone(&self.inner),
        }
    }
}

#[pymethods]
impl PyTree {
    /// The root word, or None for an empty tree
    #[getter]
    fn root(&self) -> Option<PyWord> {
        self.inner.root_id.map(|id| self.word(id))
    }

    #[getter]
    fn sentence_text(&self) -> Option<String> {
        self.inner.sentence_text.clone()
    }

    #[getter]
    fn metadata(&self) -> std::collections::HashMap<String, String> {
        self.inner
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn __getitem__(&self, id: usize) -> PyResult<PyWord> {
        if id < self.inner.nodes.len() {
            Ok(self.word(id))
        } else {
            Err(PyIndexError::new_err(format!(
                "word index out of range: {}",
                id
            )))
        }
    }

    fn __len__(&self) -> usize {
        self.inner.nodes.len()
    }

    fn __repr__(&self) -> String {
        let n = self.inner.nodes.len();
        if n == 0 {
            return "<Tree (empty)>".to_string();
        }

        let words: Vec<&str> = self
            .inner
            .nodes
            .iter()
            .take(3)
            .map(|node| node.form.as_str())
            .collect();
        if n > 3 {
            format!("<Tree len={} words='{} ...'>", n, words.join(" "))
        } else {
            format!("<Tree len={} words='{}'>", n, words.join(" "))
        }
    }
}

#[pyclass(name = "Word")]
pub struct PyWord {
    id: NodeId,
    tree: Arc<RustTree>,
}

impl PyWord {
    fn attr(&self, attr: Attribute) -> String {
        self.tree
            .get_node(self.id)
            .map(|node| node.get(attr).to_string())
            .unwrap_or_default()
    }
}

#[pymethods]
impl PyWord {
    #[getter]
    fn i(&self) -> usize {
        self.id
    }

    #[getter]
    fn form(&self) -> String {
        self.attr(Attribute::Form)
    }

    #[getter]
    fn lemma(&self) -> String {
        self.attr(Attribute::Lemma)
    }

    #[getter]
    fn pos(&self) -> String {
        self.attr(Attribute::Pos)
    }

    #[getter]
    fn tag(&self) -> String {
        self.attr(Attribute::Tag)
    }

    #[getter]
    fn ent_type(&self) -> String {
        self.attr(Attribute::EntType)
    }

    #[getter]
    fn dep(&self) -> String {
        self.attr(Attribute::Deprel)
    }

    fn children(&self) -> Vec<PyWord> {
        self.tree
            .children(self.id)
            .into_iter()
            .map(|node| PyWord {
                id: node.id,
                tree: Arc::clone(&self.tree),
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "<Word i={} form='{}' tag='{}' dep='{}'>",
            self.id,
            self.form(),
            self.tag(),
            self.dep()
        )
    }
}

/// Verify that a pattern has proper syntax.
///
/// Returns:
///     True if the pattern is well formed, False otherwise
#[pyfunction(name = "verify_pattern")]
fn py_verify_pattern(pattern: &str) -> bool {
    validate_pattern(pattern)
}

/// Match a tree against a pattern.
///
/// Raises:
///     PatternSyntaxException: If the pattern is malformed
#[pyfunction(name = "match_tree")]
fn py_match_tree(tree: &PyTree, pattern: &str) -> PyResult<bool> {
    Ok(match_tree(tree.inner.as_ref(), pattern)?)
}

/// Find the words at which the pattern ends, in depth-first order.
///
/// Raises:
///     PatternSyntaxException: If the pattern is malformed
#[pyfunction(name = "find_tokens")]
fn py_find_tokens(tree: &PyTree, pattern: &str) -> PyResult<Vec<PyWord>> {
    let found = find_tokens(tree.inner.as_ref(), pattern)?;
    Ok(found.into_iter().map(|id| tree.word(id)).collect())
}

/// Render a tree in bracketed form.
///
/// Args:
///     attr: Word attribute shown in parentheses (e.g. "tag_", "lemma_"),
///           the tag by default
#[pyfunction(name = "print_tree")]
#[pyo3(signature = (tree, attr=None))]
fn py_print_tree(tree: &PyTree, attr: Option<&str>) -> PyResult<String> {
    let attr = attr
        .map(str::parse::<Attribute>)
        .transpose()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(format_tree(&tree.inner, attr))
}

/// Parse every sentence of a CoNLL-U string.
#[pyfunction]
fn parse_conllu(text: &str) -> PyResult<Vec<PyTree>> {
    let mut trees = Vec::new();
    for tree in CoNLLUReader::from_str(text) {
        trees.push(PyTree {
            inner: Arc::new(tree?),
        });
    }
    Ok(trees)
}

/// Read every sentence of a CoNLL-U file (plain or gzip).
#[pyfunction]
fn read_trees(path: &str) -> PyResult<Vec<PyTree>> {
    let trees = crate::conllu::read_trees(Path::new(path))?;
    Ok(trees
        .into_iter()
        .map(|tree| PyTree {
            inner: Arc::new(tree),
        })
        .collect())
}

#[pymodule]
fn grammaregex(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTree>()?;
    m.add_class::<PyWord>()?;
    m.add(
        "PatternSyntaxException",
        m.py().get_type::<PatternSyntaxException>(),
    )?;

    m.add_function(wrap_pyfunction!(py_verify_pattern, m)?)?;
    m.add_function(wrap_pyfunction!(py_match_tree, m)?)?;
    m.add_function(wrap_pyfunction!(py_find_tokens, m)?)?;
    m.add_function(wrap_pyfunction!(py_print_tree, m)?)?;
    m.add_function(wrap_pyfunction!(parse_conllu, m)?)?;
    m.add_function(wrap_pyfunction!(read_trees, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
