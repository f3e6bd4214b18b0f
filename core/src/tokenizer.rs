use crate::error::{Result, SearchError};

/// Split text into terms on runs of the space character. Other whitespace is
/// part of a term.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.is_empty()).collect()
}

/// True if `text` contains an ASCII control character (0..=31).
pub fn has_control_chars(text: &str) -> bool {
    text.bytes().any(|b| b <= 31)
}

pub fn validate_text(text: &str) -> Result<()> {
    if has_control_chars(text) {
        return Err(SearchError::invalid(format!("invalid symbols in '{}'", text.escape_debug())));
    }
    Ok(())
}

/// Split and validate in one pass, keeping only terms for which `keep` is true.
pub fn tokenize<'a>(text: &'a str, keep: impl Fn(&str) -> bool) -> Result<Vec<&'a str>> {
    let mut words = Vec::new();
    for word in split_into_words(text) {
        if has_control_chars(word) {
            return Err(SearchError::invalid(format!("invalid symbols in '{}'", text.escape_debug())));
        }
        if keep(word) {
            words.push(word);
        }
    }
    Ok(words)
}
