//! Cosine ranking against a tf-idf query vector.

use crate::index::{DocId, IndexView};
use crate::tokenizer::tokenize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub type Ranked = Vec<(DocId, f32)>;

/// Normalized query weights keyed by term. Unknown terms are dropped; an all-zero vector
/// comes back empty.
pub fn query_vector<I: IndexView + ?Sized>(index: &I, query: &str) -> BTreeMap<String, f32> {
    let mut tf_q: BTreeMap<String, u32> = BTreeMap::new();
    for term in tokenize(query) {
        *tf_q.entry(term).or_insert(0) += 1;
    }
    let mut q_weights: BTreeMap<String, f32> = tf_q
        .into_iter()
        .filter_map(|(term, tf)| {
            let idf = index.idf(&term)?;
            Some((term, (1.0 + (tf as f32).log10()) * idf))
        })
        .collect();
    let norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm == 0.0 { return BTreeMap::new(); }
    for w in q_weights.values_mut() { *w /= norm; }
    q_weights
}

/// Top `top_k` documents by cosine similarity, best first, ties by ascending id.
pub fn rank<I: IndexView + ?Sized>(index: &I, query: &str, top_k: usize) -> Ranked {
    let q_weights = query_vector(index, query);
    if q_weights.is_empty() { return Vec::new(); }

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for (term, q_w) in &q_weights {
        let Some(postings) = index.postings(term) else { continue };
        for (&doc_id, p) in postings {
            let norm = index.document(doc_id).map_or(0.0, |d| d.vector_norm);
            if norm == 0.0 { continue; }
            *scores.entry(doc_id).or_insert(0.0) += (p.weight / norm) * q_w;
        }
    }

    let mut scored: Ranked = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    scored.truncate(top_k);
    scored
}
