//! Gordian - Trie path extraction
//!
//! Walks the trie depth-first and decodes every root-to-terminal path back
//! into the `column -> value` pairs of the row that produced it. Duplicate
//! rows share one path, so this yields distinct rows only; multiplicity has
//! to come from the original row sequence.

use crate::trie::{NodeId, Trie, ROOT};

/// One decoded trie path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    /// Order in which the path was reached (lexicographic by value).
    pub index: usize,
    /// `(column name, normalized value)` in column order.
    pub cells: Vec<(String, String)>,
}

impl DecodedRow {
    /// Value stored under `column`, if the path has one.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.iter().map(|(_, value)| value.as_str())
    }
}

/// Lazy depth-first iterator over the decoded rows of a trie.
///
/// Cloning the iterator (or calling [`Trie::paths`] again) restarts the
/// traversal from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct Paths<'a> {
    trie: &'a Trie,
    /// Pending `(node, depth)` pairs.
    stack: Vec<(NodeId, usize)>,
    /// `(column position, value)` along the current branch.
    branch: Vec<(usize, &'a str)>,
    emitted: usize,
}

impl<'a> Paths<'a> {
    fn new(trie: &'a Trie) -> Self {
        Self {
            trie,
            stack: vec![(ROOT, 0)],
            branch: Vec::with_capacity(trie.height()),
            emitted: 0,
        }
    }

    fn decode(&self) -> DecodedRow {
        let columns = self.trie.columns();
        DecodedRow {
            index: self.emitted,
            cells: self
                .branch
                .iter()
                .map(|&(position, value)| (columns[position].clone(), value.to_string()))
                .collect(),
        }
    }
}

impl Iterator for Paths<'_> {
    type Item = DecodedRow;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        while let Some((id, depth)) = self.stack.pop() {
            let Some(node) = trie.node(id) else {
                continue;
            };

            self.branch.truncate(depth.saturating_sub(1));
            if let (Some(position), Some(value)) = (node.position(), node.value()) {
                self.branch.push((position, value));
            }

            // Reverse so the smallest child value is visited first
            for (_, child) in node.children().rev() {
                self.stack.push((child, depth + 1));
            }

            if node.is_terminal() {
                let row = self.decode();
                self.emitted += 1;
                return Some(row);
            }
        }
        None
    }
}

impl Trie {
    /// Decoded rows, one per distinct inserted row.
    pub fn paths(&self) -> Paths<'_> {
        Paths::new(self)
    }
}

/// Free-function form of [`Trie::paths`].
pub fn extract_paths(trie: &Trie) -> Paths<'_> {
    trie.paths()
}
