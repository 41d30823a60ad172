//! Queries across all rules owned by one host.
//!
//! A multi-weekday request fans out into independent rules; these helpers
//! treat such a set as the union of its members. No deduplication or
//! priority between unrelated rules is attempted beyond merging identical
//! instants in [`enumerate_all`].

use std::iter::{FusedIterator, Peekable};

use chrono::{DateTime, Utc};

use crate::rule::Rule;
use crate::search::{self, Occurrences};

/// Every rule in `rules` that occurs on the local day of `instant`.
pub fn matching_rules(rules: &[Rule], instant: DateTime<Utc>) -> Vec<&Rule> {
    rules
        .iter()
        .filter(|rule| search::occurs_on(rule, instant))
        .collect()
}

pub fn occurs_on_any(rules: &[Rule], instant: DateTime<Utc>) -> bool {
    rules.iter().any(|rule| search::occurs_on(rule, instant))
}

pub fn occurs_between_any(rules: &[Rule], from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    rules
        .iter()
        .any(|rule| search::occurs_between(rule, from, to))
}

/// The earliest next occurrence across all rules.
pub fn next_occurrence_in(rules: &[Rule], after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    rules
        .iter()
        .filter_map(|rule| search::next_occurrence(rule, after))
        .min()
}

/// Merge the occurrence sequences of all rules into one ascending sequence.
///
/// Instants produced by more than one rule appear once.
pub fn enumerate_all(rules: &[Rule]) -> MergedOccurrences {
    MergedOccurrences {
        sources: rules
            .iter()
            .map(|rule| search::enumerate(rule).peekable())
            .collect(),
    }
}

/// Lazy k-way merge produced by [`enumerate_all`].
#[derive(Debug, Clone)]
pub struct MergedOccurrences {
    sources: Vec<Peekable<Occurrences>>,
}

impl Iterator for MergedOccurrences {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let earliest = self
            .sources
            .iter_mut()
            .filter_map(|source| source.peek().copied())
            .min()?;

        for source in &mut self.sources {
            // Each source is strictly ascending, so at most one item per source matches.
            let _ = source.next_if_eq(&earliest);
        }
        Some(earliest)
    }
}

impl FusedIterator for MergedOccurrences {}
