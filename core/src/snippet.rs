use crate::extract::collapse_ws;

/// Excerpt of roughly `width` characters around the first occurrence of any of `terms`
/// (case-insensitive), or the start of the text when none occurs.
pub fn make_snippet<S: AsRef<str>>(text: &str, terms: &[S], width: usize) -> Option<String> {
    let text = collapse_ws(text);
    if text.is_empty() { return None; }
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars.iter().map(|c| c.to_ascii_lowercase()).collect();

    let first_idx = terms
        .iter()
        .filter_map(|t| {
            let needle: Vec<char> = t.as_ref().trim().to_ascii_lowercase().chars().collect();
            if needle.is_empty() { return None; }
            lower.windows(needle.len()).position(|w| w == needle.as_slice())
        })
        .min();

    let (start, end) = match first_idx {
        Some(idx) => {
            let start = idx.saturating_sub(width / 3);
            (start, (start + width).min(chars.len()))
        }
        None => (0, width.min(chars.len())),
    };
    let mut s: String = chars[start..end].iter().collect();
    if start > 0 { s.insert_str(0, "..."); }
    if end < chars.len() { s.push_str("..."); }
    Some(s)
}

/// Wrap every case-insensitive occurrence of `terms` in `open`/`close`. Terms are matched
/// in one pass, longest first, so a term inside another never splits a highlight.
pub fn highlight_terms<S: AsRef<str>>(snippet: &str, terms: &[S], open: &str, close: &str) -> String {
    let mut words: Vec<&str> = terms.iter().map(|t| t.as_ref().trim()).filter(|t| !t.is_empty()).collect();
    if words.is_empty() {
        return snippet.to_string();
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    let Ok(pat) = regex::RegexBuilder::new(&alternation).case_insensitive(true).build() else {
        return snippet.to_string();
    };
    pat.replace_all(snippet, |caps: &regex::Captures| format!("{open}{}{close}", &caps[0])).into_owned()
}
