use zipsearch_core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_keeps_apostrophes() {
    let words = tokenize("Running RUNNERS don't 'quote' O'Brien's café");
    assert_eq!(words, vec!["running", "runners", "don't", "quote", "o'brien's", "caf"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_drops_digits_and_punctuation() {
    assert_eq!(tokenize("R2-D2 says: 42!"), vec!["r", "d", "says"]);
    assert!(tokenize("1234 -- ''").is_empty());
}

#[test]
fn it_is_deterministic() {
    let text = "Information retrieval; the retrieval of information.";
    assert_eq!(tokenize(text), tokenize(text));
}
