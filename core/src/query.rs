use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::tokenizer::{has_control_chars, split_into_words};

/// A parsed query: terms that must contribute and terms that exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub plus_words: BTreeSet<String>,
    pub minus_words: BTreeSet<String>,
}

enum QueryWord<'a> {
    Plus(&'a str),
    Minus(&'a str),
}

fn parse_query_word(word: &str) -> Result<QueryWord<'_>> {
    if has_control_chars(word) {
        return Err(SearchError::invalid(format!("invalid symbols in query word '{}'", word.escape_debug())));
    }
    match word.strip_prefix('-') {
        None => Ok(QueryWord::Plus(word)),
        Some("") => Err(SearchError::invalid("empty minus word '-'")),
        Some(rest) if rest.starts_with('-') => {
            Err(SearchError::invalid(format!("malformed minus word '{word}'")))
        }
        Some(rest) => Ok(QueryWord::Minus(rest)),
    }
}

impl Query {
    /// Parse space-separated query text. Stop words are dropped silently,
    /// whether they appear as plus or minus terms.
    pub fn parse(text: &str, is_stop_word: impl Fn(&str) -> bool) -> Result<Query> {
        let mut query = Query::default();
        for word in split_into_words(text) {
            match parse_query_word(word)? {
                QueryWord::Plus(w) if !is_stop_word(w) => {
                    query.plus_words.insert(w.to_string());
                }
                QueryWord::Minus(w) if !is_stop_word(w) => {
                    query.minus_words.insert(w.to_string());
                }
                _ => {}
            }
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        self.plus_words.is_empty() && self.minus_words.is_empty()
    }
}

/// Raw query text to parsed query, shared by the workers of one index.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, Arc<Query>>>,
    capacity: Option<usize>,
}

impl QueryCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), capacity }
    }

    /// Return the cached parse of `text`, parsing and storing it on a miss.
    /// Failed parses are not cached.
    pub fn get_or_parse(&self, text: &str, parse: impl FnOnce(&str) -> Result<Query>) -> Result<Arc<Query>> {
        if let Some(hit) = self.entries.read().get(text) {
            return Ok(Arc::clone(hit));
        }
        let parsed = Arc::new(parse(text)?);
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(text) {
            return Ok(Arc::clone(existing));
        }
        if self.capacity.map_or(true, |cap| entries.len() < cap) {
            entries.insert(text.to_string(), Arc::clone(&parsed));
        } else {
            tracing::trace!(capacity = ?self.capacity, "query cache full, not storing parse");
        }
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
