//! Gordian - Candidate-key search
//!
//! Classifies every column combination of a dataset as unique (no two rows
//! share its value tuple) or non-unique, sweeping arities from the full
//! column count down to single columns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │   Dataset   │────▶│  Trie build  │────▶│  height = #columns │
//! └─────────────┘     └──────────────┘     └─────────┬──────────┘
//!                                                    │  k = height ..= 1
//!                    ┌────────────────┐     ┌────────▼──────────┐
//!                    │ Classification │◀────│  rayon par tally  │
//!                    │  (merge per k) │     │  per k-subset     │
//!                    └────────────────┘     └───────────────────┘
//! ```
//!
//! Each k-subset is judged independently from the original row sequence, so
//! all subsets of one arity run in parallel against read-only data. Their
//! verdicts are merged into the result at a single point before moving on to
//! the next smaller arity.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::combinations::combinations;
use crate::dataset::{Dataset, Row};
use crate::error::{AnalysisError, Result};
use crate::trie::Trie;

// ─── ColumnCombination ──────────────────────────────────────────────────────

/// A non-empty set of column positions, kept in ascending order.
///
/// Ordered by size first, then by positions, so result sets list narrow keys
/// before wide ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnCombination(Vec<usize>);

impl ColumnCombination {
    /// Build from positions in any order; duplicates are dropped.
    pub fn new<I: IntoIterator<Item = usize>>(positions: I) -> Self {
        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        Self(positions)
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.0.iter().all(|p| other.0.binary_search(p).is_ok())
    }

    /// Column names for these positions, looked up in `schema`.
    pub fn names<'a>(&self, schema: &'a [String]) -> Vec<&'a str> {
        self.0
            .iter()
            .filter_map(|&p| schema.get(p).map(String::as_str))
            .collect()
    }
}

impl Ord for ColumnCombination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ColumnCombination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ─── Classification ─────────────────────────────────────────────────────────

/// Unique and non-unique column combinations found for one dataset.
///
/// A combination is never in both sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    columns: Vec<String>,
    row_count: usize,
    /// Widest arity evaluated, when narrower than the column count.
    arity_cap: Option<usize>,
    unique: BTreeSet<ColumnCombination>,
    non_unique: BTreeSet<ColumnCombination>,
}

impl Classification {
    fn new(columns: Vec<String>, row_count: usize, arity_cap: Option<usize>) -> Self {
        Self {
            columns,
            row_count,
            arity_cap,
            unique: BTreeSet::new(),
            non_unique: BTreeSet::new(),
        }
    }

    fn record_unique(&mut self, combo: ColumnCombination) {
        if !self.non_unique.contains(&combo) {
            self.unique.insert(combo);
        }
    }

    fn record_non_unique(&mut self, combo: ColumnCombination) {
        self.unique.remove(&combo);
        self.non_unique.insert(combo);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// `Some(n)` when combinations wider than `n` columns were skipped.
    pub fn arity_cap(&self) -> Option<usize> {
        self.arity_cap
    }

    pub fn unique(&self) -> &BTreeSet<ColumnCombination> {
        &self.unique
    }

    pub fn non_unique(&self) -> &BTreeSet<ColumnCombination> {
        &self.non_unique
    }

    pub fn is_unique(&self, combo: &ColumnCombination) -> bool {
        self.unique.contains(combo)
    }

    /// False when no evaluated column combination identifies every row.
    pub fn has_candidate_key(&self) -> bool {
        !self.unique.is_empty()
    }

    /// Unique combinations of the smallest size present. Ties are all kept.
    pub fn minimal_unique(&self) -> Vec<&ColumnCombination> {
        match self.unique.iter().map(ColumnCombination::len).min() {
            Some(size) => self.unique.iter().filter(|c| c.len() == size).collect(),
            None => Vec::new(),
        }
    }

    /// Non-unique combinations of the largest size present.
    pub fn maximal_non_unique(&self) -> Vec<&ColumnCombination> {
        match self.non_unique.iter().map(ColumnCombination::len).max() {
            Some(size) => self
                .non_unique
                .iter()
                .filter(|c| c.len() == size)
                .collect(),
            None => Vec::new(),
        }
    }
}

// ─── Strategy ───────────────────────────────────────────────────────────────

/// Key discovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Frequency-counting sweep over column combinations.
    #[default]
    Gordian,
    /// Hierarchical clustering. Not implemented.
    Hca,
    /// Clustering followed by the Gordian sweep. Not implemented.
    HcaGordian,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gordian => write!(f, "gordian"),
            Self::Hca => write!(f, "hca"),
            Self::HcaGordian => write!(f, "hca-gordian"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gordian" => Ok(Self::Gordian),
            "hca" => Ok(Self::Hca),
            "hca-gordian" | "hca_gordian" => Ok(Self::HcaGordian),
            other => Err(format!(
                "unknown strategy '{}' (expected gordian, hca or hca-gordian)",
                other
            )),
        }
    }
}

// ─── KeySearch ──────────────────────────────────────────────────────────────

/// The candidate-key search engine.
#[derive(Debug, Clone)]
pub struct KeySearch {
    strategy: Strategy,
    parallel: bool,
    max_arity: Option<usize>,
}

impl Default for KeySearch {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl KeySearch {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            parallel: true,
            max_arity: None,
        }
    }

    /// Evaluate the combinations of one arity on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Never evaluate combinations wider than `max_arity` columns.
    ///
    /// `Some(0)` is rejected by [`KeySearch::run`].
    pub fn with_max_arity(mut self, max_arity: Option<usize>) -> Self {
        self.max_arity = max_arity;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Classify every column combination of `dataset`.
    pub fn run(&self, dataset: &Dataset) -> Result<Classification> {
        if self.max_arity == Some(0) {
            return Err(AnalysisError::InvalidMaxArity { max_arity: 0 });
        }
        match self.strategy {
            Strategy::Gordian => self.sweep(dataset),
            Strategy::Hca | Strategy::HcaGordian => Err(AnalysisError::StrategyUnavailable {
                strategy: self.strategy.to_string(),
            }),
        }
    }

    fn sweep(&self, dataset: &Dataset) -> Result<Classification> {
        let trie = Trie::from_dataset(dataset)?;
        let height = trie.height();
        let top = self.max_arity.map_or(height, |cap| cap.min(height));
        let rows = dataset.rows();
        let positions: Vec<usize> = (0..dataset.column_count()).collect();

        let arity_cap = (top < height).then_some(top);
        let mut result = Classification::new(dataset.columns().to_vec(), rows.len(), arity_cap);

        for k in (1..=top).rev() {
            let candidates = combinations(&positions, k);
            let verdicts: Vec<(Vec<usize>, bool)> = if self.parallel {
                candidates
                    .into_par_iter()
                    .map(|combo| {
                        let unique = is_unique_over(rows, &combo);
                        (combo, unique)
                    })
                    .collect()
            } else {
                candidates
                    .into_iter()
                    .map(|combo| {
                        let unique = is_unique_over(rows, &combo);
                        (combo, unique)
                    })
                    .collect()
            };

            // Single merge point per arity
            let mut unique_count = 0usize;
            for (combo, unique) in verdicts {
                let combo = ColumnCombination::new(combo);
                if unique {
                    unique_count += 1;
                    result.record_unique(combo);
                } else {
                    result.record_non_unique(combo);
                }
            }
            debug!(arity = k, unique = unique_count, "arity swept");
        }

        info!(
            rows = rows.len(),
            distinct_rows = trie.distinct_rows(),
            columns = height,
            unique = result.unique.len(),
            non_unique = result.non_unique.len(),
            "classification complete"
        );
        Ok(result)
    }
}

/// True when no two rows share the same value tuple over `positions`.
fn is_unique_over(rows: &[Row], positions: &[usize]) -> bool {
    let mut tally: HashMap<Vec<&str>, usize> = HashMap::with_capacity(rows.len());
    for row in rows {
        let values = row.values();
        let key: Vec<&str> = positions.iter().map(|&p| values[p].as_str()).collect();
        let count = tally.entry(key).or_insert(0);
        *count += 1;
        if *count > 1 {
            return false;
        }
    }
    true
}

/// Run the default search (Gordian sweep, parallel, no arity cap).
pub fn classify(dataset: &Dataset) -> Result<Classification> {
    KeySearch::default().run(dataset)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
