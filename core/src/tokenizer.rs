use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[A-Za-z']+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","the","of","and","or","but","to","in","on","for",
            "with","at","by","from","this","that","is","it","as",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Lowercase a raw word and trim apostrophes from both ends. Returns `None` when nothing is left.
pub fn normalize_term(raw: &str) -> Option<String> {
    let term = raw.trim().to_ascii_lowercase();
    let term = term.trim_matches('\'');
    if term.is_empty() { None } else { Some(term.to_string()) }
}

/// Tokenize text into lowercase ASCII terms (letters and inner apostrophes) with stop words removed.
///
/// Offsets into the returned vector are the positions recorded in the index, so stop words
/// never occupy a position.
pub fn tokenize(text: &str) -> Vec<String> {
    RE.find_iter(text)
        .filter_map(|m| normalize_term(m.as_str()))
        .filter(|t| !is_stopword(t))
        .collect()
}
