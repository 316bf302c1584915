//! The query string dialect: `"quoted phrase"`, `a or b`, `a and b`, `a but b`, or free text.

use crate::index::{DocId, IndexView};
use crate::rank::{rank, Ranked};
use crate::{boolean, phrase};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Phrase(String),
    Or(Vec<String>),
    And(Vec<String>),
    But { left: Vec<String>, right: Vec<String> },
    Ranked(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Matches(BTreeSet<DocId>),
    Ranked(Ranked),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Matches(docs) => docs.len(),
            QueryResult::Ranked(hits) => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Ids in result order (ascending for set matches, best first for rankings).
    pub fn doc_ids(&self) -> Vec<DocId> {
        match self {
            QueryResult::Matches(docs) => docs.iter().copied().collect(),
            QueryResult::Ranked(hits) => hits.iter().map(|(d, _)| *d).collect(),
        }
    }
}

impl Query {
    pub fn parse(input: &str) -> Query {
        let q = input.trim();
        if q.len() > 1 && q.starts_with('"') && q.ends_with('"') {
            return Query::Phrase(q[1..q.len() - 1].to_string());
        }
        let toks: Vec<String> = q.to_lowercase().split_whitespace().map(str::to_string).collect();
        let without = |op: &str| toks.iter().filter(|t| *t != op).cloned().collect::<Vec<_>>();
        if toks.iter().any(|t| t == "or") {
            Query::Or(without("or"))
        } else if toks.iter().any(|t| t == "and") {
            Query::And(without("and"))
        } else if let Some(i) = toks.iter().position(|t| t == "but") {
            Query::But { left: toks[..i].to_vec(), right: toks[i + 1..].to_vec() }
        } else {
            Query::Ranked(q.to_string())
        }
    }

    /// Run against `index`. `top_k` only bounds ranked queries.
    pub fn execute<I: IndexView + ?Sized>(&self, index: &I, top_k: usize) -> QueryResult {
        match self {
            Query::Phrase(p) => QueryResult::Matches(phrase::search(index, p)),
            Query::Or(terms) => QueryResult::Matches(boolean::or(index, terms.as_slice())),
            Query::And(terms) => QueryResult::Matches(boolean::and(index, terms.as_slice())),
            Query::But { left, right } => QueryResult::Matches(boolean::but(index, left.as_slice(), right.as_slice())),
            Query::Ranked(text) => QueryResult::Ranked(rank(index, text, top_k)),
        }
    }

    /// Words worth highlighting in snippets.
    pub fn highlight_terms(&self) -> Vec<String> {
        match self {
            Query::Phrase(text) | Query::Ranked(text) => crate::tokenizer::tokenize(text),
            Query::Or(terms) | Query::And(terms) => terms.clone(),
            Query::But { left, .. } => left.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> { ws.iter().map(|w| w.to_string()).collect() }

    #[test]
    fn parses_each_form() {
        assert_eq!(Query::parse("\"Cat Sat\""), Query::Phrase("Cat Sat".into()));
        assert_eq!(Query::parse("cat OR dog"), Query::Or(words(&["cat", "dog"])));
        assert_eq!(Query::parse("cat and dog and rat"), Query::And(words(&["cat", "dog", "rat"])));
        assert_eq!(
            Query::parse("cat dog but rat but owl"),
            Query::But { left: words(&["cat", "dog"]), right: words(&["rat", "but", "owl"]) }
        );
        assert_eq!(Query::parse("  credit card "), Query::Ranked("credit card".into()));
    }

    #[test]
    fn operator_precedence_and_edge_cases() {
        assert_eq!(Query::parse("a and b or c"), Query::Or(words(&["a", "and", "b", "c"])));
        assert_eq!(Query::parse("\""), Query::Ranked("\"".into()));
        assert_eq!(Query::parse("orange android"), Query::Ranked("orange android".into()));
        assert_eq!(Query::parse(""), Query::Ranked(String::new()));
    }
}
