//! Interval analysis of version constraint strings.
//!
//! A constraint such as `>= 1.2, < 2.0, != 1.5.0` is reduced to a lower bound,
//! an upper bound and a set of excluded versions. Comparing two reductions
//! tells whether a newer requirement admits fewer versions than an older one.

use std::collections::BTreeSet;
use std::fmt;

/// A release version. Missing components are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1`, `1.2`, `1.2.3` or `v1.2.3`, returning the number of components given.
    fn parse_counted(text: &str) -> Option<(Version, usize)> {
        let text = text.trim();
        let text = text.strip_prefix('v').unwrap_or(text);
        let parts: Vec<&str> = text.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }
        let mut nums = [0u64; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }
        Some((Version::new(nums[0], nums[1], nums[2]), parts.len()))
    }

    pub fn parse(text: &str) -> Option<Version> {
        Self::parse_counted(text).map(|(v, _)| v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bound {
    version: Version,
    inclusive: bool,
}

/// A reduced constraint: `lower .. upper` minus `excluded`.
///
/// `None` bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionConstraint {
    lower: Option<Bound>,
    upper: Option<Bound>,
    excluded: BTreeSet<Version>,
}

impl VersionConstraint {
    /// Parse a comma-separated constraint list. Returns `None` if any clause is malformed.
    pub fn parse(text: &str) -> Option<VersionConstraint> {
        let mut constraint = VersionConstraint::default();
        for clause in text.split(',') {
            let clause = clause.trim();
            if clause.is_empty() {
                return None;
            }
            constraint.apply_clause(clause)?;
        }
        Some(constraint)
    }

    fn apply_clause(&mut self, clause: &str) -> Option<()> {
        let (op, rest) = split_operator(clause);
        let (version, components) = Version::parse_counted(rest)?;
        match op {
            "=" => {
                self.raise_lower(version, true);
                self.cap_upper(version, true);
            }
            "!=" => {
                self.excluded.insert(version);
            }
            ">" => self.raise_lower(version, false),
            ">=" => self.raise_lower(version, true),
            "<" => self.cap_upper(version, false),
            "<=" => self.cap_upper(version, true),
            "~>" => {
                self.raise_lower(version, true);
                let ceiling = match components {
                    1 | 2 => Version::new(version.major + 1, 0, 0),
                    _ => Version::new(version.major, version.minor + 1, 0),
                };
                self.cap_upper(ceiling, false);
            }
            _ => return None,
        }
        Some(())
    }

    fn raise_lower(&mut self, version: Version, inclusive: bool) {
        let candidate = Bound { version, inclusive };
        let tighter = match self.lower {
            None => true,
            Some(current) => lower_at_most(current, candidate),
        };
        if tighter {
            self.lower = Some(candidate);
        }
    }

    fn cap_upper(&mut self, version: Version, inclusive: bool) {
        let candidate = Bound { version, inclusive };
        let tighter = match self.upper {
            None => true,
            Some(current) => upper_at_least(current, candidate),
        };
        if tighter {
            self.upper = Some(candidate);
        }
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above = match self.lower {
            None => true,
            Some(b) => *version > b.version || (b.inclusive && *version == b.version),
        };
        let below = match self.upper {
            None => true,
            Some(b) => *version < b.version || (b.inclusive && *version == b.version),
        };
        above && below && !self.excluded.contains(version)
    }

    /// Every version admitted by `other` is admitted by `self`.
    pub fn is_superset_of(&self, other: &VersionConstraint) -> bool {
        let lower_ok = match (self.lower, other.lower) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => lower_at_most(mine, theirs),
        };
        let upper_ok = match (self.upper, other.upper) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => upper_at_least(mine, theirs),
        };
        let exclusions_ok = self.excluded.iter().all(|v| !other.contains(v));
        lower_ok && upper_ok && exclusions_ok
    }
}

/// `a` admits everything above `b` admits (a is the looser lower bound).
fn lower_at_most(a: Bound, b: Bound) -> bool {
    a.version < b.version || (a.version == b.version && (a.inclusive || !b.inclusive))
}

/// `a` admits everything below `b` admits (a is the looser upper bound).
fn upper_at_least(a: Bound, b: Bound) -> bool {
    a.version > b.version || (a.version == b.version && (a.inclusive || !b.inclusive))
}

fn split_operator(clause: &str) -> (&str, &str) {
    for op in ["~>", ">=", "<=", "!=", ">", "<", "="] {
        if let Some(rest) = clause.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("=", clause)
}

/// How a requirement changed between two versions of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintChange {
    /// No requirement before, one now
    Added,
    /// The new requirement admits fewer versions
    Tightened,
}

/// Classify a requirement change. Unparsable constraints yield `None`.
pub fn classify_change(old: Option<&str>, new: Option<&str>) -> Option<ConstraintChange> {
    let old = old.map(str::trim).filter(|s| !s.is_empty());
    let new = new.map(str::trim).filter(|s| !s.is_empty());
    match (old, new) {
        (None, Some(_)) => Some(ConstraintChange::Added),
        (Some(old), Some(new)) if old != new => {
            let old = VersionConstraint::parse(old)?;
            let new = VersionConstraint::parse(new)?;
            (!new.is_superset_of(&old)).then_some(ConstraintChange::Tightened)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tightened(old: &str, new: &str) -> bool {
        classify_change(Some(old), Some(new)) == Some(ConstraintChange::Tightened)
    }

    #[test]
    fn test_pessimistic_operator() {
        let c = VersionConstraint::parse("~> 1.2").unwrap();
        assert!(c.contains(&Version::new(1, 9, 0)));
        assert!(!c.contains(&Version::new(2, 0, 0)));

        let c = VersionConstraint::parse("~> 1.2.3").unwrap();
        assert!(c.contains(&Version::new(1, 2, 9)));
        assert!(!c.contains(&Version::new(1, 3, 0)));

        let c = VersionConstraint::parse("~> 1").unwrap();
        assert!(c.contains(&Version::new(1, 5, 0)));
        assert!(!c.contains(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_raising_minimum_is_tightening() {
        assert!(tightened(">= 1.0", ">= 1.5"));
        assert!(!tightened(">= 1.5", ">= 1.0"));
        assert!(tightened(">= 1.0", ">= 1.0, < 2.0"));
        assert!(!tightened(">= 1.0, < 2.0", ">= 1.0"));
    }

    #[test]
    fn test_inclusive_to_exclusive() {
        assert!(tightened(">= 1.0", "> 1.0"));
        assert!(!tightened("> 1.0", ">= 1.0"));
    }

    #[test]
    fn test_new_exclusion_is_tightening() {
        assert!(tightened(">= 1.0", ">= 1.0, != 1.4.0"));
        assert!(!tightened(">= 1.0", ">= 1.0, != 0.9.0"));
    }

    #[test]
    fn test_added_and_unparsable() {
        assert_eq!(classify_change(None, Some(">= 1.0")), Some(ConstraintChange::Added));
        assert_eq!(classify_change(Some(""), Some(">= 1.0")), Some(ConstraintChange::Added));
        assert_eq!(classify_change(Some(">= 1.0"), None), None);
        assert_eq!(classify_change(Some(">= 1.0"), Some(">= banana")), None);
        assert_eq!(classify_change(Some("1.0,"), Some("2.0")), None);
    }

    #[test]
    fn test_bare_version_is_exact() {
        let c = VersionConstraint::parse("1.4.2").unwrap();
        assert!(c.contains(&Version::new(1, 4, 2)));
        assert!(!c.contains(&Version::new(1, 4, 3)));
    }
}
