//! Strict boolean retrieval.

use crate::index::{DocId, IndexView};
use crate::tokenizer::normalize_term;
use std::collections::BTreeSet;

fn docset<I: IndexView + ?Sized>(index: &I, term: &str) -> BTreeSet<DocId> {
    normalize_term(term)
        .and_then(|t| index.postings(&t).map(|p| p.keys().copied().collect()))
        .unwrap_or_default()
}

/// Documents containing any of `terms`.
pub fn or<I: IndexView + ?Sized, S: AsRef<str>>(index: &I, terms: &[S]) -> BTreeSet<DocId> {
    terms.iter().flat_map(|t| docset(index, t.as_ref())).collect()
}

/// Documents containing every one of `terms`. An empty term list matches nothing.
pub fn and<I: IndexView + ?Sized, S: AsRef<str>>(index: &I, terms: &[S]) -> BTreeSet<DocId> {
    let mut normalized = Vec::with_capacity(terms.len());
    for t in terms {
        match normalize_term(t.as_ref()) {
            Some(t) => normalized.push(t),
            None => return BTreeSet::new(),
        }
    }
    if normalized.is_empty() { return BTreeSet::new(); }
    // rarest term first keeps the running intersection small
    normalized.sort_by_key(|t| index.document_frequency(t));

    let mut result: Option<BTreeSet<DocId>> = None;
    for term in &normalized {
        let Some(plist) = index.postings(term) else { return BTreeSet::new() };
        let next: BTreeSet<DocId> = match result {
            None => plist.keys().copied().collect(),
            Some(acc) => acc.into_iter().filter(|d| plist.contains_key(d)).collect(),
        };
        if next.is_empty() { return next; }
        result = Some(next);
    }
    result.unwrap_or_default()
}

/// `and(left)` minus `or(right)`.
pub fn but<I: IndexView + ?Sized, S: AsRef<str>>(index: &I, left: &[S], right: &[S]) -> BTreeSet<DocId> {
    let mut docs = and(index, left);
    if docs.is_empty() { return docs; }
    let excluded = or(index, right);
    docs.retain(|d| !excluded.contains(d));
    docs
}
