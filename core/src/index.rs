use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    /// Archive-relative path, e.g. `rhf/index.html`.
    pub path: String,
    pub title: Option<String>,
    /// Visible body text, kept for snippets.
    pub text: String,
    pub term_count: u32,
    pub vector_norm: f32,
}

impl Document {
    pub fn new(id: DocId, path: impl Into<String>) -> Self {
        Self { id, path: path.into(), title: None, text: String::new(), term_count: 0, vector_norm: 0.0 }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self { self.title = title; self }

    pub fn with_text(mut self, text: impl Into<String>) -> Self { self.text = text.into(); self }

    /// Title if the page had one, else its path.
    pub fn label(&self) -> &str { self.title.as_deref().unwrap_or(&self.path) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub term_frequency: u32,
    /// Ascending offsets into the document's indexed token stream.
    pub positions: Vec<u32>,
    pub weight: f32, // tf-idf
}

/// Read-only view the query engines work against.
pub trait IndexView {
    fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, Posting>>;
    fn document(&self, id: DocId) -> Option<&Document>;
    fn document_count(&self) -> u32;
    /// Terms of a document paired with their weights.
    fn document_terms(&self, id: DocId) -> Vec<(&str, f32)>;

    fn document_frequency(&self, term: &str) -> u32 {
        self.postings(term).map_or(0, |p| p.len() as u32)
    }

    /// `log10(N / df)`, or `None` for a term that is not indexed.
    fn idf(&self, term: &str) -> Option<f32> {
        let df = self.document_frequency(term);
        if df == 0 { return None; }
        Some((self.document_count() as f32 / df as f32).log10())
    }
}

/// Accumulates documents. [`IndexBuilder::finalize`] turns it into a queryable [`InvertedIndex`].
#[derive(Default)]
pub struct IndexBuilder {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    postings: Vec<BTreeMap<DocId, Posting>>,
    docs: BTreeMap<DocId, Document>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Index `tokens` followed by the anchor text credited to the document.
    ///
    /// Returns `Ok(false)` and records nothing when both token lists are empty.
    pub fn add_document(&mut self, mut doc: Document, tokens: &[String], anchor_tokens: &[String]) -> Result<bool> {
        if self.docs.contains_key(&doc.id) {
            return Err(SearchError::DuplicateDocument(doc.id));
        }
        let stream = tokens.iter().chain(anchor_tokens);
        let mut count = 0u32;
        for (pos, term) in stream.enumerate() {
            let tid = match self.dictionary.get(term) {
                Some(&tid) => tid,
                None => {
                    let tid = self.terms.len() as TermId;
                    self.dictionary.insert(term.clone(), tid);
                    self.terms.push(term.clone());
                    self.postings.push(BTreeMap::new());
                    tid
                }
            };
            let posting = self.postings[tid as usize]
                .entry(doc.id)
                .or_insert_with(|| Posting { term_frequency: 0, positions: Vec::new(), weight: 0.0 });
            posting.term_frequency += 1;
            posting.positions.push(pos as u32);
            count += 1;
        }
        if count == 0 { return Ok(false); }
        doc.term_count = count;
        self.docs.insert(doc.id, doc);
        Ok(true)
    }

    /// Compute tf-idf weights and document norms.
    pub fn finalize(self) -> InvertedIndex {
        let IndexBuilder { dictionary, terms, mut postings, mut docs } = self;
        let n = docs.len() as f32;
        let mut norms: BTreeMap<DocId, f32> = BTreeMap::new();
        let mut df = Vec::with_capacity(postings.len());
        for plist in postings.iter_mut() {
            df.push(plist.len() as u32);
            let idf = (n / plist.len() as f32).log10();
            for (doc_id, p) in plist.iter_mut() {
                let tf = if p.term_frequency > 0 { 1.0 + (p.term_frequency as f32).log10() } else { 0.0 };
                p.weight = tf * idf;
                *norms.entry(*doc_id).or_insert(0.0) += p.weight * p.weight;
            }
        }
        for (doc_id, sq) in norms {
            if let Some(d) = docs.get_mut(&doc_id) { d.vector_norm = sq.sqrt(); }
        }
        let num_docs = docs.len() as u32;
        tracing::info!(num_docs, num_terms = terms.len(), "index finalized");
        InvertedIndex { dictionary, terms, df, postings, docs, num_docs }
    }
}

/// Finalized positional index. Immutable; share it by reference across threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    pub terms: Vec<String>,
    pub df: Vec<u32>,
    pub postings: Vec<BTreeMap<DocId, Posting>>, // by term id, keyed by doc id
    pub docs: BTreeMap<DocId, Document>,
    pub num_docs: u32,
}

impl InvertedIndex {
    pub fn num_terms(&self) -> usize { self.terms.len() }

    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.docs.values() }

    pub fn document_by_path(&self, path: &str) -> Option<&Document> {
        self.docs.values().find(|d| d.path == path)
    }
}

impl IndexView for InvertedIndex {
    fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, Posting>> {
        let tid = *self.dictionary.get(term)?;
        self.postings.get(tid as usize)
    }

    fn document(&self, id: DocId) -> Option<&Document> { self.docs.get(&id) }

    fn document_count(&self) -> u32 { self.num_docs }

    fn document_terms(&self, id: DocId) -> Vec<(&str, f32)> {
        self.postings
            .iter()
            .enumerate()
            .filter_map(|(tid, plist)| plist.get(&id).map(|p| (self.terms[tid].as_str(), p.weight)))
            .collect()
    }

    fn document_frequency(&self, term: &str) -> u32 {
        self.dictionary.get(term).and_then(|&tid| self.df.get(tid as usize).copied()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn build(docs: &[&str]) -> InvertedIndex {
        let mut b = IndexBuilder::new();
        for (i, text) in docs.iter().enumerate() {
            let id = b.len() as DocId;
            b.add_document(Document::new(id, format!("doc{i}.html")), &tokenize(text), &[]).unwrap();
        }
        b.finalize()
    }

    #[test]
    fn positions_and_frequencies() {
        let idx = build(&["cat dog cat", "dog rat"]);
        let cat = idx.postings("cat").unwrap();
        assert_eq!(cat[&0].term_frequency, 2);
        assert_eq!(cat[&0].positions, vec![0, 2]);
        assert_eq!(idx.document_frequency("dog"), 2);
        assert_eq!(idx.document(0).unwrap().term_count, 3);
    }

    #[test]
    fn weights_follow_log_tf_idf() {
        let idx = build(&["cat dog cat", "dog rat"]);
        let idf_cat = 2f32.log10();
        let w = idx.postings("cat").unwrap()[&0].weight;
        assert!((w - (1.0 + 2f32.log10()) * idf_cat).abs() < 1e-6);
        // dog is everywhere: idf 0, weight 0
        assert_eq!(idx.postings("dog").unwrap()[&1].weight, 0.0);
        let rat = idx.postings("rat").unwrap()[&1].weight;
        assert!((idx.document(1).unwrap().vector_norm - rat).abs() < 1e-6);
    }

    #[test]
    fn anchor_tokens_follow_body_positions() {
        let mut b = IndexBuilder::new();
        let body = tokenize("alpha beta");
        let anchors = tokenize("gamma page");
        b.add_document(Document::new(0, "a.html"), &body, &anchors).unwrap();
        let idx = b.finalize();
        assert_eq!(idx.postings("gamma").unwrap()[&0].positions, vec![2]);
        assert_eq!(idx.document(0).unwrap().term_count, 4);
    }

    #[test]
    fn empty_documents_and_duplicate_ids() {
        let mut b = IndexBuilder::new();
        assert!(!b.add_document(Document::new(0, "empty.html"), &[], &[]).unwrap());
        assert!(b.is_empty());
        assert!(b.add_document(Document::new(0, "a.html"), &tokenize("word"), &[]).unwrap());
        let err = b.add_document(Document::new(0, "b.html"), &tokenize("word"), &[]).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateDocument(0)));
    }

    #[test]
    fn document_terms_lists_weighted_terms() {
        let idx = build(&["cat dog", "dog rat", "rat owl"]);
        let mut terms: Vec<&str> = idx.document_terms(1).into_iter().map(|(t, _)| t).collect();
        terms.sort();
        assert_eq!(terms, vec!["dog", "rat"]);
    }
}
