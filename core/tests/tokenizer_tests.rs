use core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_stems() {
    let toks = tokenize("Running Runners RUN! The menu.");
    assert!(toks.contains(&"run".to_string()));
    assert!(toks.contains(&"menu".to_string()));
}

#[test]
fn it_does_not_filter_stopwords() {
    // Unlike a general-purpose search tokenizer, spec's Tokenizer has no
    // stopword list: the writer and reader must agree on every token,
    // including function words, so important-word boosting on phrases like
    // "the the the" stays well defined.
    let toks = tokenize("the and of");
    assert_eq!(toks.len(), 3);
}

#[test]
fn non_alphanumeric_punctuation_is_stripped_to_whitespace() {
    let toks = tokenize("hello, world! 123-abc");
    assert!(toks.contains(&"hello".to_string()));
    assert!(toks.contains(&"world".to_string()));
    assert!(toks.iter().any(|t| t.contains("123")));
}
