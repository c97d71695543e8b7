//! Greedy similarity-based rename pairing over score-ordered edges.

use crate::errors::{Result, TfbreakError};
use crate::similarity::similarity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default minimum similarity for a rename pairing
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Rename detection settings shared by the input and output rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameDetection {
    pub enabled: bool,
    pub similarity_threshold: f64,
}

impl Default for RenameDetection {
    fn default() -> Self {
        Self {
            enabled: false,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl RenameDetection {
    pub fn enabled(similarity_threshold: f64) -> Self {
        Self {
            enabled: true,
            similarity_threshold,
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidThreshold` unless the threshold is within `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.similarity_threshold) {
            Ok(())
        } else {
            Err(TfbreakError::InvalidThreshold {
                value: self.similarity_threshold,
            })
        }
    }
}

/// A removed name paired with an added one.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePair {
    pub old_name: String,
    pub new_name: String,
    pub similarity: f64,
}

/// Pair removed names with added names.
///
/// Every (removed, added) pair scoring at least `threshold` is an edge. Edges
/// are taken by descending score, ties by old name then new name, and an edge
/// is accepted only while both of its names are unclaimed. The edges above a
/// higher threshold are a prefix of the same order, so raising the threshold
/// can only drop pairs.
pub fn pair_renames<'a, R, A>(removed: R, added: A, threshold: f64) -> Vec<RenamePair>
where
    R: IntoIterator<Item = &'a str>,
    A: IntoIterator<Item = &'a str>,
{
    let removed: BTreeSet<&str> = removed.into_iter().collect();
    let added: BTreeSet<&str> = added.into_iter().collect();

    let mut edges: Vec<(f64, &str, &str)> = removed
        .iter()
        .flat_map(|old| added.iter().map(move |new| (similarity(old, new), *old, *new)))
        .filter(|(score, _, _)| *score >= threshold)
        .collect();
    edges.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(b.1))
            .then_with(|| a.2.cmp(b.2))
    });

    let mut claimed_old = BTreeSet::new();
    let mut claimed_new = BTreeSet::new();
    let mut pairs = Vec::new();
    for (score, old_name, new_name) in edges {
        if claimed_old.contains(old_name) || claimed_new.contains(new_name) {
            continue;
        }
        claimed_old.insert(old_name);
        claimed_new.insert(new_name);
        pairs.push(RenamePair {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            similarity: score,
        });
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_claimed_once() {
        let pairs = pair_renames(["subnet_id", "subnet_ids"], ["subnet_idz"], 0.8);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].old_name, "subnet_id");
        assert_eq!(pairs[0].new_name, "subnet_idz");
    }

    #[test]
    fn test_stronger_pair_wins_over_earlier_name() {
        let pairs = pair_renames(["subnet", "subnet_id"], ["subnet_ids"], 0.5);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].old_name, "subnet_id");
        assert_eq!(pairs[0].new_name, "subnet_ids");
    }

    #[test]
    fn test_validate_threshold() {
        assert!(RenameDetection::enabled(0.0).validate().is_ok());
        assert!(RenameDetection::enabled(1.0).validate().is_ok());
        assert!(RenameDetection::enabled(1.2).validate().is_err());
        assert!(RenameDetection::enabled(-0.1).validate().is_err());
    }
}
