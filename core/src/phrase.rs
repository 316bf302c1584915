//! Exact phrase matching over term positions.
//!
//! The phrase goes through the shared tokenizer, so stop words inside quotes are dropped
//! and the remaining content words must be adjacent in the indexed token stream.

use crate::boolean;
use crate::index::{DocId, IndexView};
use crate::tokenizer::tokenize;
use std::collections::BTreeSet;

pub fn search<I: IndexView + ?Sized>(index: &I, phrase: &str) -> BTreeSet<DocId> {
    let words = tokenize(phrase);
    if words.is_empty() { return BTreeSet::new(); }
    let Some(plists) = words.iter().map(|w| index.postings(w)).collect::<Option<Vec<_>>>() else {
        return BTreeSet::new();
    };

    let mut out = boolean::and(index, words.as_slice());
    out.retain(|doc| {
        let Some(positions) = plists.iter().map(|p| p.get(doc).map(|p| &p.positions)).collect::<Option<Vec<_>>>() else {
            return false;
        };
        positions[0].iter().any(|&p0| {
            positions[1..]
                .iter()
                .enumerate()
                .all(|(i, later)| later.binary_search(&(p0 + i as u32 + 1)).is_ok())
        })
    });
    out
}
