//! Name similarity used by rename detection.

use strsim::normalized_levenshtein;

/// A candidate selected by [`best_match`].
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub candidate: String,
    pub score: f64,
}

/// Normalized Levenshtein similarity in `0.0..=1.0`; equal strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

/// Highest-scoring candidate with `score >= threshold`.
///
/// Ties on score go to the lexicographically smallest candidate, so the
/// result does not depend on candidate order.
pub fn best_match<'a, I>(name: &str, candidates: I, threshold: f64) -> Option<Match>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<Match> = None;
    for candidate in candidates {
        let score = similarity(name, candidate);
        if score < threshold {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                score > current.score
                    || (score == current.score && candidate < current.candidate.as_str())
            }
        };
        if better {
            best = Some(Match {
                candidate: candidate.to_string(),
                score,
            });
        }
    }
    best
}
