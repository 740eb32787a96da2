//! Scenario scripts: ordered insert/remove steps replayed against a tree.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "address": "0x01", "amount": 50 },
//!   { "address": "0x01", "amount": -50 }
//! ]
//! ```
//!
//! A positive `amount` inserts `(address, amount)`, a negative one removes
//! `(address, -amount)`. Replay keeps its own running total and, unless disabled,
//! checks it against [`OSRBTree::total_entries`] after every step.

use std::io::Read;

use log::{debug, info, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::OSRBTree;

/// One scripted mutation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Step<K> {
    pub address: K,
    pub amount: i128,
}

/// An ordered list of [`Step`]s.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct Script<K> {
    steps: Vec<Step<K>>,
}

/// Switches for [`Script::replay`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReplayConfig {
    /// Compare the expected running total with the tree's after each step.
    pub check_counts: bool,
    /// Log every node at `trace` level after each step.
    pub dump_tree: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            check_counts: true,
            dump_tree: false,
        }
    }
}

/// Summary of a successful replay.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplayReport {
    pub steps: usize,
    pub inserts: usize,
    pub removes: usize,
    /// Expected (and, when checked, reported) total after the last step.
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("step {step}: amount must not be zero")]
    ZeroAmount { step: usize },

    #[error("step {step}: {source}")]
    Tree {
        step: usize,
        #[source]
        source: crate::Error,
    },

    #[error("step {step}: expected {expected} entries, tree reports {reported}")]
    CountMismatch {
        step: usize,
        expected: usize,
        reported: usize,
    },
}

impl<K> Script<K> {
    #[must_use]
    pub fn new(steps: Vec<Step<K>>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step<K>] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<K: for<'de> Deserialize<'de>> Script<K> {
    /// Parses a script from a JSON string.
    ///
    /// # Errors
    ///
    /// [`ScriptError::Json`] if the input is not an array of steps.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::script::Script;
    ///
    /// let script: Script<String> =
    ///     Script::from_json(r#"[{"address": "0xa1", "amount": 7}]"#).unwrap();
    /// assert_eq!(script.len(), 1);
    /// assert_eq!(script.steps()[0].amount, 7);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a script from a reader, such as an open fixture file.
    ///
    /// # Errors
    ///
    /// [`ScriptError::Json`] for malformed input, [`ScriptError::Io`] if reading fails.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ScriptError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }
}

impl<K: Ord + Clone> Script<K> {
    /// Applies every step to `tree` in order.
    ///
    /// Stops at the first failing step; earlier steps stay applied.
    ///
    /// # Errors
    ///
    /// - [`ScriptError::ZeroAmount`] for a step with `amount == 0`.
    /// - [`ScriptError::Tree`] when the tree rejects a step.
    /// - [`ScriptError::CountMismatch`] when `check_counts` is set and the totals diverge.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    /// use osrb_tree::script::{ReplayConfig, Script};
    ///
    /// let script: Script<String> = Script::from_json(
    ///     r#"[{"address": "a", "amount": 5}, {"address": "b", "amount": 5},
    ///         {"address": "a", "amount": -5}]"#,
    /// )
    /// .unwrap();
    ///
    /// let mut tree = OSRBTree::new();
    /// let report = script.replay(&mut tree, &ReplayConfig::default()).unwrap();
    /// assert_eq!((report.inserts, report.removes, report.total), (2, 1, 1));
    /// assert_eq!(tree.keys(&5).unwrap(), ["b"]);
    /// ```
    pub fn replay(
        &self,
        tree: &mut OSRBTree<u128, K>,
        config: &ReplayConfig,
    ) -> Result<ReplayReport, ScriptError> {
        let mut report = ReplayReport {
            total: tree.total_entries(),
            ..ReplayReport::default()
        };

        for (step, Step { address, amount }) in self.steps.iter().enumerate() {
            let value = amount.unsigned_abs();
            if *amount > 0 {
                debug!("script: step {step} insert {value}");
                tree.insert(address.clone(), value)
                    .map_err(|source| ScriptError::Tree { step, source })?;
                report.inserts += 1;
                report.total += 1;
            } else if *amount < 0 {
                debug!("script: step {step} remove {value}");
                tree.remove(address, &value)
                    .map_err(|source| ScriptError::Tree { step, source })?;
                report.removes += 1;
                report.total -= 1;
            } else {
                return Err(ScriptError::ZeroAmount { step });
            }
            report.steps += 1;

            if config.check_counts && tree.total_entries() != report.total {
                return Err(ScriptError::CountMismatch {
                    step,
                    expected: report.total,
                    reported: tree.total_entries(),
                });
            }
            if config.dump_tree {
                dump(tree);
            }
        }

        info!(
            "script: replayed {} steps ({} inserts, {} removes), {} entries",
            report.steps, report.inserts, report.removes, report.total
        );
        Ok(report)
    }
}

fn dump<K: Ord>(tree: &OSRBTree<u128, K>) {
    trace!(
        "tree: total {} first {:?} last {:?} root {:?}",
        tree.total_entries(),
        tree.first_value().ok(),
        tree.last_value().ok(),
        tree.root_value()
    );
    for value in tree.values() {
        if let Ok(node) = tree.node(value) {
            trace!(
                "node {value}: parent {:?} left {:?} right {:?} {:?} keys {} count {}",
                node.parent, node.left, node.right, node.color, node.key_count, node.count
            );
        }
    }
}
