use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::config::{ExecutionPolicy, IndexConfig};
use crate::document::{average_rating, DocId, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::query::QueryCache;
use crate::tokenizer::{has_control_chars, split_into_words, tokenize};

/// Postings of one term: document id to term frequency.
pub type Postings = BTreeMap<DocId, f64>;
/// Forward row of one document: term to term frequency.
pub type WordFrequencies = BTreeMap<String, f64>;

static EMPTY_FREQUENCIES: WordFrequencies = BTreeMap::new();

#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentData {
    pub(crate) rating: i32,
    pub(crate) status: DocumentStatus,
}

/// In-memory inverted and forward index over a set of documents.
#[derive(Debug)]
pub struct SearchIndex {
    pub(crate) stop_words: BTreeSet<String>,
    pub(crate) word_to_document_freqs: BTreeMap<String, Postings>,
    pub(crate) document_to_word_freqs: BTreeMap<DocId, WordFrequencies>,
    pub(crate) documents: BTreeMap<DocId, DocumentData>,
    pub(crate) query_cache: QueryCache,
    config: IndexConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    pub fn new() -> Self {
        Self {
            stop_words: BTreeSet::new(),
            word_to_document_freqs: BTreeMap::new(),
            document_to_word_freqs: BTreeMap::new(),
            documents: BTreeMap::new(),
            query_cache: QueryCache::default(),
            config: IndexConfig::default(),
            pool: None,
        }
    }

    /// Build an index with a dedicated worker pool when `parallelism` is set.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        let pool = match config.parallelism {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("search-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };
        tracing::debug!(parallelism = ?config.parallelism, cache_capacity = ?config.query_cache_capacity, "index configured");
        Ok(Self {
            query_cache: QueryCache::new(config.query_cache_capacity),
            config,
            pool,
            ..Self::new()
        })
    }

    /// Index with stop words given as space-separated text.
    pub fn with_stop_words(text: &str) -> Result<Self> {
        let mut index = Self::new();
        index.set_stop_words(text)?;
        Ok(index)
    }

    pub fn from_stop_words<I>(words: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index = Self::new();
        for item in words {
            index.set_stop_words(item.as_ref())?;
        }
        Ok(index)
    }

    /// Add space-separated stop words. All words are validated before any is
    /// stored. Cached query parses are discarded.
    pub fn set_stop_words(&mut self, text: &str) -> Result<()> {
        let words = split_into_words(text);
        if let Some(bad) = words.iter().find(|w| has_control_chars(w)) {
            return Err(SearchError::invalid(format!("invalid stop word '{}'", bad.escape_debug())));
        }
        self.stop_words.extend(words.into_iter().map(str::to_string));
        self.query_cache.clear();
        Ok(())
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of workers the parallel path splits its work into.
    pub fn parallelism(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside the index's worker pool, or rayon's global pool.
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    pub fn add_document(&mut self, document_id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        if document_id < 0 {
            return Err(SearchError::invalid(format!("document id {document_id} is negative")));
        }
        if self.documents.contains_key(&document_id) {
            return Err(SearchError::invalid(format!("document id {document_id} already exists")));
        }
        let words = tokenize(text, |w| !self.is_stop_word(w))?;

        let mut frequencies = WordFrequencies::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in words {
                *frequencies.entry(word.to_string()).or_insert(0.0) += inv_word_count;
            }
        }
        for (word, tf) in &frequencies {
            self.word_to_document_freqs
                .entry(word.clone())
                .or_default()
                .insert(document_id, *tf);
        }
        tracing::debug!(document_id, terms = frequencies.len(), ?status, "document added");
        self.document_to_word_freqs.insert(document_id, frequencies);
        self.documents.insert(document_id, DocumentData { rating: average_rating(ratings), status });
        Ok(())
    }

    pub fn remove_document(&mut self, document_id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id)
    }

    /// Remove a document from both indexes. Absent ids are ignored.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocId) {
        let Some(frequencies) = self.document_to_word_freqs.remove(&document_id) else {
            return;
        };
        match policy {
            ExecutionPolicy::Sequential => {
                for word in frequencies.keys() {
                    if let Some(postings) = self.word_to_document_freqs.get_mut(word) {
                        postings.remove(&document_id);
                        if postings.is_empty() {
                            self.word_to_document_freqs.remove(word);
                        }
                    }
                }
            }
            ExecutionPolicy::Parallel => {
                // Detach the affected posting lists so each can be edited by its own worker.
                let mut detached: Vec<(String, Postings)> = frequencies
                    .keys()
                    .filter_map(|word| self.word_to_document_freqs.remove_entry(word))
                    .collect();
                self.install(|| {
                    detached.par_iter_mut().for_each(|(_, postings)| {
                        postings.remove(&document_id);
                    });
                });
                self.word_to_document_freqs
                    .extend(detached.into_iter().filter(|(_, postings)| !postings.is_empty()));
            }
        }
        self.documents.remove(&document_id);
        tracing::debug!(document_id, ?policy, "document removed");
    }

    /// Term frequencies of a document; empty if the id is unknown.
    pub fn word_frequencies(&self, document_id: DocId) -> &WordFrequencies {
        self.document_to_word_freqs
            .get(&document_id)
            .unwrap_or(&EMPTY_FREQUENCIES)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn contains(&self, document_id: DocId) -> bool {
        self.documents.contains_key(&document_id)
    }

    pub fn status(&self, document_id: DocId) -> Option<DocumentStatus> {
        self.documents.get(&document_id).map(|d| d.status)
    }

    pub fn rating(&self, document_id: DocId) -> Option<i32> {
        self.documents.get(&document_id).map(|d| d.rating)
    }

    /// The `index`-th live id in ascending order.
    pub fn document_id_at(&self, index: usize) -> Option<DocId> {
        self.documents.keys().nth(index).copied()
    }

    pub fn iter(&self) -> DocumentIds<'_> {
        DocumentIds(self.documents.keys())
    }

    pub fn term_count(&self) -> usize {
        self.word_to_document_freqs.len()
    }

    pub fn postings(&self, word: &str) -> Option<&Postings> {
        self.word_to_document_freqs.get(word)
    }

    /// `ln(N / df)`. Only called for terms with at least one posting.
    pub(crate) fn inverse_document_freq(&self, postings: &Postings) -> f64 {
        (self.document_count() as f64 / postings.len() as f64).ln()
    }
}

/// Live document ids in ascending order.
pub struct DocumentIds<'a>(btree_map::Keys<'a, DocId, DocumentData>);

impl Iterator for DocumentIds<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        self.0.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for DocumentIds<'_> {}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> DocumentIds<'a> {
        self.iter()
    }
}
