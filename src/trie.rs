//! Gordian - Row prefix tree
//!
//! Every row is inserted value by value in column order, so rows sharing a
//! leading run of values share the nodes for that run. Nodes live in a flat
//! arena and refer to their children by index; the tree is read-only once
//! built.
//!
//! ```text
//!            (root)
//!           /      \
//!        A=1        A=2
//!         |          |
//!        B=x        B=x        one terminal node per distinct row
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::dataset::{check_row_widths, normalize_value, Dataset, Row};
use crate::error::{AnalysisError, Result};

/// Index of a node inside the trie arena.
pub type NodeId = usize;

/// The root always sits at slot 0.
pub const ROOT: NodeId = 0;

/// One `(column position, value)` pair shared by every row agreeing on the
/// prefix that leads here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrieNode {
    /// Normalized cell value; `None` only for the root.
    value: Option<String>,
    /// Column position; `None` only for the root.
    position: Option<usize>,
    /// Set when some row ends at this node.
    terminal: bool,
    /// Child value -> child node. Ordered so traversals are deterministic.
    children: BTreeMap<String, NodeId>,
}

impl TrieNode {
    fn root() -> Self {
        Self {
            value: None,
            position: None,
            terminal: false,
            children: BTreeMap::new(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Distance from the root (root = 0, first column = 1).
    pub fn depth(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(value, &id)| (value.as_str(), id))
    }

    pub fn child(&self, value: &str) -> Option<NodeId> {
        self.children.get(value).copied()
    }
}

/// Prefix tree over the rows of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trie {
    columns: Vec<String>,
    nodes: Vec<TrieNode>,
    rows_inserted: usize,
}

impl Trie {
    /// Build the trie for a dataset.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Self::build(dataset.columns(), dataset.rows())
    }

    /// Build the trie from rows aligned to `columns`.
    ///
    /// All rows are validated before the first insertion, so a mismatched
    /// row never leaves a partially built trie behind.
    pub fn build(columns: &[String], rows: &[Row]) -> Result<Self> {
        if rows.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }
        check_row_widths(columns.len(), rows)?;

        let mut trie = Self {
            columns: columns.to_vec(),
            nodes: vec![TrieNode::root()],
            rows_inserted: 0,
        };
        for row in rows {
            trie.insert(row);
        }

        debug!(
            rows = trie.rows_inserted,
            distinct_rows = trie.distinct_rows(),
            nodes = trie.node_count(),
            height = trie.height(),
            "trie built"
        );
        Ok(trie)
    }

    fn insert(&mut self, row: &Row) {
        let mut current = ROOT;
        for (position, value) in row.values().iter().enumerate() {
            current = match self.nodes[current].children.get(value) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode {
                        value: Some(value.clone()),
                        position: Some(position),
                        terminal: false,
                        children: BTreeMap::new(),
                    });
                    self.nodes[current].children.insert(value.clone(), next);
                    next
                }
            };
        }
        self.nodes[current].terminal = true;
        self.rows_inserted += 1;
    }

    /// True when `values`, normalized, is exactly one inserted row.
    ///
    /// A strict prefix, an extension, or any altered value of an inserted
    /// row is not a member.
    pub fn contains<S: AsRef<str>>(&self, values: &[S]) -> bool {
        let mut current = ROOT;
        for value in values {
            match self.nodes[current].child(&normalize_value(value.as_ref())) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.nodes[current].terminal
    }

    /// Deepest level reached by any node. Equals the column count for a
    /// dataset with equal-length rows.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(TrieNode::depth).max().unwrap_or(0)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn root(&self) -> &TrieNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&TrieNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Rows passed to [`Trie::build`], duplicates included.
    pub fn rows_inserted(&self) -> usize {
        self.rows_inserted
    }

    /// Number of terminal nodes, i.e. distinct rows.
    pub fn distinct_rows(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal).count()
    }
}
