//! CoNLL-U file parsing
//!
//! Parses CoNLL-U format files into Tree structures the matcher can walk.
//! Multiword tokens and empty nodes are skipped; the entity type of a word
//! is taken from the `NER` or `Entity` key of its MISC column.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Node, NodeId, Tree};
use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines, Read};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// MISC keys holding the named entity type, in lookup order
const ENTITY_KEYS: [&str; 2] = ["NER", "Entity"];

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

/// Error while reading trees from a file
#[derive(Debug, Error)]
pub enum ConllError {
    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Token ID column: single word, multiword range, or empty node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    Single(usize),
    Range(usize, usize),
    Decimal(usize, usize),
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl CoNLLUReader<BufReader<Box<dyn Read>>> {
    /// Create a reader from a file path
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let inner: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(BufReader::new(inner)))
    }
}

impl CoNLLUReader<BufReader<Cursor<String>>> {
    /// Create a reader from a string
    pub fn from_str(text: &str) -> Self {
        Self::new(BufReader::new(Cursor::new(text.to_string())))
    }
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Tree, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tree_lines = Vec::new();
        let mut metadata = FxHashMap::default();
        let mut sentence_text = None;

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if tree_lines.is_empty() {
                        return None;
                    }
                    // Last sentence without trailing blank line
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(ParseError {
                        line_num: self.line_num,
                        message: format!("IO error: {}", e),
                    }));
                }
                Some(Ok(line)) => {
                    let line = line.trim();

                    if line.is_empty() {
                        if !tree_lines.is_empty() {
                            break;
                        }
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        parse_comment(comment, &mut metadata, &mut sentence_text);
                        continue;
                    }

                    tree_lines.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_tree(tree_lines, sentence_text, metadata))
    }
}

/// Read every sentence of a CoNLL-U file (plain or gzip)
pub fn read_trees(path: &Path) -> Result<Vec<Tree>, ConllError> {
    let reader = CoNLLUReader::from_file(path).map_err(|source| ConllError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;
    Ok(reader.collect::<Result<Vec<_>, _>>()?)
}

/// Parse a comment line (starts with #)
fn parse_comment(
    comment: &str,
    metadata: &mut FxHashMap<String, String>,
    sentence_text: &mut Option<String>,
) {
    if let Some((key, value)) = comment.split_once('=') {
        let key = key.trim();
        let value = value.trim();

        if key == "text" {
            *sentence_text = Some(value.to_string());
        } else {
            metadata.insert(key.to_string(), value.to_string());
        }
    }
}

/// Parse accumulated lines into a Tree
fn parse_tree(
    lines: Vec<(usize, String)>,
    sentence_text: Option<String>,
    metadata: FxHashMap<String, String>,
) -> Result<Tree, ParseError> {
    let mut tree = Tree::with_metadata(sentence_text, metadata);

    for (line_num, line) in lines {
        if let Some(node) = parse_line(&line, line_num, tree.nodes.len())? {
            tree.add_node(node);
        }
    }

    // Set up parent-child relationships in word order
    let node_count = tree.nodes.len();
    for i in 0..node_count {
        match tree.nodes[i].parent {
            Some(parent_id) if parent_id < node_count => tree.set_parent(i, parent_id),
            Some(parent_id) => {
                warn!(word = i + 1, head = parent_id + 1, "HEAD outside sentence, word left detached");
                tree.nodes[i].parent = None;
            }
            None => {
                if tree.root_id.is_none() {
                    tree.root_id = Some(i);
                } else {
                    warn!(word = i + 1, "extra root word ignored");
                }
            }
        }
    }

    if tree.root_id.is_none() && !tree.nodes.is_empty() {
        warn!(words = node_count, "sentence has no root");
    }

    Ok(tree)
}

/// Parse a single CoNLL-U line into a Node
/// Returns None for multiword tokens and empty nodes
fn parse_line(line: &str, line_num: usize, node_id: NodeId) -> Result<Option<Node>, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError {
            line_num,
            message: format!("Expected 10 fields, found {}", fields.len()),
        });
    }

    let token_id = parse_id(fields[0]).map_err(|message| ParseError { line_num, message })?;
    match token_id {
        TokenId::Range(_, _) | TokenId::Decimal(_, _) => return Ok(None),
        TokenId::Single(_) => {}
    }

    let form = fields[1];
    // Default to form if lemma not specified
    let lemma = if fields[2] == "_" { form } else { fields[2] };
    let pos = fields[3];
    let tag = if fields[4] == "_" { "" } else { fields[4] };
    let head = parse_head(fields[6]).map_err(|message| ParseError { line_num, message })?;
    let deprel = fields[7];

    let mut node = Node::new(node_id, form, lemma, pos, tag, deprel);
    if let Some(ent_type) = parse_entity(fields[9]) {
        node.ent_type = ent_type.to_string();
    }
    node.parent = head;

    Ok(Some(node))
}

/// Parse ID field (can be integer, range, or decimal)
fn parse_id(s: &str) -> Result<TokenId, String> {
    let number = |part: &str| {
        part.parse::<usize>()
            .map_err(|_| format!("Invalid ID: {}", s))
    };

    if let Some((start, end)) = s.split_once('-') {
        Ok(TokenId::Range(number(start)?, number(end)?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Ok(TokenId::Decimal(number(main)?, number(sub)?))
    } else {
        Ok(TokenId::Single(number(s)?))
    }
}

/// Parse HEAD field (0 or integer)
fn parse_head(s: &str) -> Result<Option<NodeId>, String> {
    if s == "0" || s == "_" {
        return Ok(None);
    }
    let head: usize = s.parse().map_err(|_| format!("Invalid HEAD: {}", s))?;
    // HEAD is 1-indexed in CoNLL-U, but we use 0-indexed NodeIds
    Ok(head.checked_sub(1))
}

/// Find the entity type in the MISC field (key=value|key=value)
fn parse_entity(misc: &str) -> Option<&str> {
    if misc == "_" {
        return None;
    }
    let pairs: Vec<(&str, &str)> = misc.split('|').filter_map(|pair| pair.split_once('=')).collect();
    ENTITY_KEYS.iter().find_map(|key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, value)| value)
            .filter(|value| !value.is_empty() && *value != "O")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SIMPLE: &str = "# sent_id = 1
# text = The dog runs.
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tdog\tdog\tNOUN\tNN\t_\t3\tnsubj\t_\t_
3\truns\trun\tVERB\tVBZ\t_\t0\troot\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_

";

    #[test]
    fn test_parse_simple_sentence() {
        let mut reader = CoNLLUReader::from_str(SIMPLE);
        let tree = reader.next().unwrap().unwrap();

        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(tree.sentence_text, Some("The dog runs.".to_string()));
        assert_eq!(tree.metadata.get("sent_id").map(String::as_str), Some("1"));
        assert_eq!(tree.root_id, Some(2)); // "runs" is root

        assert_eq!(tree.nodes[0].form, "The");
        assert_eq!(tree.nodes[0].lemma, "the");
        assert_eq!(tree.nodes[0].pos, "DET");
        assert_eq!(tree.nodes[0].tag, "DT");
        assert_eq!(tree.nodes[0].deprel, "det");

        assert_eq!(tree.nodes[2].parent, None);
        assert_eq!(tree.nodes[2].children, vec![1, 3]);
        assert_eq!(tree.nodes[1].children, vec![0]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_parse_multiple_sentences() {
        let text = "1\tCats\tcat\tNOUN\tNNS\t_\t2\tnsubj\t_\t_
2\tsleep\tsleep\tVERB\tVBP\t_\t0\troot\t_\t_


1\tHi\thi\tINTJ\tUH\t_\t0\troot\t_\t_";
        let trees: Vec<_> = CoNLLUReader::from_str(text)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].nodes.len(), 2);
        assert_eq!(trees[1].nodes.len(), 1);
    }

    #[test]
    fn test_defaults_and_entities() {
        let text = "1\tParis\t_\tPROPN\t_\t_\t0\troot\t_\tNER=GPE|SpaceAfter=No\n\
                    2\tsleeps\tsleep\tVERB\tVBZ\t_\t1\tacl\t_\tEntity=O\n";
        let tree = CoNLLUReader::from_str(text).next().unwrap().unwrap();

        assert_eq!(tree.nodes[0].lemma, "Paris");
        assert_eq!(tree.nodes[0].tag, "");
        assert_eq!(tree.nodes[0].ent_type, "GPE");
        assert_eq!(tree.nodes[1].ent_type, "");
    }

    #[test]
    fn test_skips_multiword_and_empty_nodes() {
        let text = "1-2\tdel\t_\t_\t_\t_\t_\t_\t_\t_
1\tde\tde\tADP\t_\t_\t2\tcase\t_\t_
2\tel\tel\tDET\t_\t_\t0\troot\t_\t_
2.1\tvisto\tver\tVERB\t_\t_\t_\t_\t2:conj\t_
";
        let tree = CoNLLUReader::from_str(text).next().unwrap().unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.root_id, Some(1));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = CoNLLUReader::from_str("# c\n1\tonly\tthree\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.line_num, 2);
        assert!(err.message.contains("Expected 10 fields"));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1").unwrap(), TokenId::Single(1));
        assert_eq!(parse_id("5-7").unwrap(), TokenId::Range(5, 7));
        assert_eq!(parse_id("10.5").unwrap(), TokenId::Decimal(10, 5));
        assert!(parse_id("x").is_err());
    }

    #[test]
    fn test_parse_head() {
        assert_eq!(parse_head("0").unwrap(), None);
        assert_eq!(parse_head("1").unwrap(), Some(0)); // 1-indexed to 0-indexed
        assert_eq!(parse_head("5").unwrap(), Some(4));
        assert!(parse_head("root").is_err());
    }

    #[test]
    fn test_read_trees_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("simple.conllu");
        std::fs::write(&plain, SIMPLE).unwrap();

        let gzipped = dir.path().join("simple.conllu.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            File::create(&gzipped).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(SIMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        for path in [plain, gzipped] {
            let trees = read_trees(&path).unwrap();
            assert_eq!(trees.len(), 1);
            assert_eq!(trees[0].nodes[2].form, "runs");
        }
    }

    #[test]
    fn test_read_trees_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_trees(&dir.path().join("missing.conllu")).unwrap_err();
        assert!(matches!(err, ConllError::FileOpen { .. }));
    }
}
