//! Query expansion by pseudo-relevance feedback.
//!
//! The top of the first ranking is taken as relevant, terms from those documents are
//! scored by tf-idf co-occurrence with the query terms, and the best ones are appended
//! to the query before ranking again.

use crate::index::{DocId, IndexView};
use crate::rank::{rank, Ranked};
use crate::tokenizer::tokenize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy)]
pub struct ReformulateOptions {
    /// Documents from the head of the first ranking used as feedback.
    pub feedback_depth: usize,
    pub max_expansion_terms: usize,
    pub top_k: usize,
}

impl Default for ReformulateOptions {
    fn default() -> Self { Self { feedback_depth: 5, max_expansion_terms: 5, top_k: 40 } }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reformulation {
    pub expanded_query: String,
    pub added_terms: Vec<String>,
    /// Ranking of the original query.
    pub original: Ranked,
    /// Ranking of the expanded query. Equal to `original` when nothing was added.
    pub expanded: Ranked,
}

impl Reformulation {
    pub fn was_expanded(&self) -> bool { !self.added_terms.is_empty() }

    /// Hits of the expanded ranking that the original ranking did not contain.
    pub fn new_in_expanded(&self) -> Vec<DocId> {
        let before: HashSet<DocId> = self.original.iter().map(|(d, _)| *d).collect();
        self.expanded.iter().map(|(d, _)| *d).filter(|d| !before.contains(d)).collect()
    }
}

/// `Σ_d weight(t1, d) * weight(t2, d)`, walking the shorter postings list.
pub fn correlation<I: IndexView + ?Sized>(index: &I, t1: &str, t2: &str) -> f32 {
    let (Some(mut p1), Some(mut p2)) = (index.postings(t1), index.postings(t2)) else { return 0.0 };
    if p1.len() > p2.len() { std::mem::swap(&mut p1, &mut p2); }
    p1.iter()
        .filter_map(|(doc, a)| p2.get(doc).map(|b| a.weight * b.weight))
        .sum()
}

pub fn reformulate<I: IndexView + ?Sized>(index: &I, query: &str, opts: &ReformulateOptions) -> Reformulation {
    let original = rank(index, query, opts.top_k);
    if original.is_empty() {
        return Reformulation { expanded_query: query.to_string(), added_terms: Vec::new(), original, expanded: Vec::new() };
    }

    let query_terms: BTreeSet<String> = tokenize(query).into_iter().collect();
    let mut candidates: BTreeSet<&str> = BTreeSet::new();
    for (doc, _) in original.iter().take(opts.feedback_depth) {
        for (term, weight) in index.document_terms(*doc) {
            if weight != 0.0 && !query_terms.contains(term) { candidates.insert(term); }
        }
    }

    let mut scored: Vec<(&str, f32)> = candidates
        .into_iter()
        .map(|k| (k, query_terms.iter().map(|q| correlation(index, q, k)).sum::<f32>()))
        .filter(|(_, s)| *s > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(b.0)));
    let added_terms: Vec<String> = scored.into_iter().take(opts.max_expansion_terms).map(|(t, _)| t.to_string()).collect();
    tracing::debug!(query, added = ?added_terms, "query expansion");

    if added_terms.is_empty() {
        let expanded = original.clone();
        return Reformulation { expanded_query: query.to_string(), added_terms, original, expanded };
    }

    let expanded_query = format!("{} {}", query.trim(), added_terms.join(" "));
    let expanded = rank(index, &expanded_query, opts.top_k);
    Reformulation { expanded_query, added_terms, original, expanded }
}
