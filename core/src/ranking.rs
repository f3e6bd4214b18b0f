//! TF-IDF ranking and document matching.
//!
//! Relevance of a document is the sum over plus terms of `tf * ln(N / df)`.
//! Documents containing any minus term are dropped. Results are sorted by
//! [`sort_by_relevance`] and cut to [`MAX_RESULT_DOCUMENT_COUNT`].
//!
//! The parallel path splits the plus terms into chunks that write into a
//! [`ConcurrentMap`] keyed by document id. Every plus chunk joins before the
//! minus chunks start erasing, and every minus chunk joins before the map is
//! drained, so an erase can never be overtaken by a late plus write.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::concurrent_map::{ConcurrentMap, KeyedAccumulator};
use crate::config::ExecutionPolicy;
use crate::document::{sort_by_relevance, DocId, Document, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::{Postings, SearchIndex};
use crate::query::Query;

pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Contributions to one document's relevance, tagged with the ordinal of the
/// plus term that produced them so they can be summed in term order.
type Contributions = Vec<(usize, f64)>;

fn chunk_size(len: usize, workers: usize) -> usize {
    len.div_ceil(workers.max(1)).max(1)
}

impl SearchIndex {
    /// Top documents with status [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_with_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_by(raw_query, move |_, s, _| s == status)
    }

    pub fn find_top_documents_by<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, predicate)
    }

    /// Rank documents matching `predicate(id, status, rating)`.
    ///
    /// Both policies return the same documents, in the same order, with
    /// bit-identical relevances.
    pub fn find_top_documents_with<P>(&self, policy: ExecutionPolicy, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = self.parse_query(policy, raw_query)?;
        let relevance = match policy {
            ExecutionPolicy::Sequential => self.relevance_sequential(&query, &predicate),
            ExecutionPolicy::Parallel => self.relevance_parallel(&query, &predicate),
        };

        let mut matched: Vec<Document> = relevance
            .into_iter()
            .map(|(id, relevance)| Document::new(id, relevance, self.documents[&id].rating))
            .collect();
        sort_by_relevance(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        tracing::trace!(query = raw_query, ?policy, hits = matched.len(), "ranked");
        Ok(matched)
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Plus terms of the query present in the document, or nothing if any
    /// minus term is present. Terms come back in ascending order.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let status = self.status(document_id).ok_or(SearchError::NotFound(document_id))?;
        let query = self.parse_query(policy, raw_query)?;

        let contains = |word: &String| {
            self.word_to_document_freqs
                .get_key_value(word)
                .filter(|(_, postings)| postings.contains_key(&document_id))
                .map(|(key, _)| key.as_str())
        };

        let words = match policy {
            ExecutionPolicy::Sequential => {
                if query.minus_words.iter().any(|w| contains(w).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.iter().filter_map(contains).collect()
                }
            }
            ExecutionPolicy::Parallel => self.install(|| {
                if query.minus_words.par_iter().any(|w| contains(w).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.par_iter().filter_map(contains).collect()
                }
            }),
        };
        Ok((words, status))
    }

    /// Fresh parse on the sequential path; cached parse on the parallel path.
    fn parse_query(&self, policy: ExecutionPolicy, raw_query: &str) -> Result<Arc<Query>> {
        let parse = |text: &str| Query::parse(text, |w| self.is_stop_word(w));
        match policy {
            ExecutionPolicy::Sequential => parse(raw_query).map(Arc::new),
            ExecutionPolicy::Parallel => self.query_cache.get_or_parse(raw_query, parse),
        }
    }

    fn passes<P>(&self, document_id: DocId, predicate: &P) -> bool
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let data = &self.documents[&document_id];
        predicate(document_id, data.status, data.rating)
    }

    fn relevance_sequential<P>(&self, query: &Query, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut document_to_relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.word_to_document_freqs.get(word) else {
                continue;
            };
            let idf = self.inverse_document_freq(postings);
            for (&id, &tf) in postings {
                if self.passes(id, predicate) {
                    *document_to_relevance.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }
        for word in &query.minus_words {
            if let Some(postings) = self.word_to_document_freqs.get(word) {
                for id in postings.keys() {
                    document_to_relevance.remove(id);
                }
            }
        }
        document_to_relevance
    }

    fn relevance_parallel<P>(&self, query: &Query, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let workers = self.parallelism();
        let accumulator: ConcurrentMap<DocId, Contributions> = ConcurrentMap::new(workers);
        self.accumulate(&accumulator, query, predicate, workers);

        accumulator
            .drain()
            .into_iter()
            .map(|(id, mut contributions)| {
                contributions.sort_by_key(|&(ordinal, _)| ordinal);
                let relevance = contributions.iter().fold(0.0, |sum, &(_, c)| sum + c);
                (id, relevance)
            })
            .collect()
    }

    fn accumulate<A, P>(&self, accumulator: &A, query: &Query, predicate: &P, workers: usize)
    where
        A: KeyedAccumulator<DocId, Contributions>,
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let plus: Vec<(usize, &Postings)> = query
            .plus_words
            .iter()
            .enumerate()
            .filter_map(|(ordinal, w)| self.word_to_document_freqs.get(w).map(|p| (ordinal, p)))
            .collect();
        let minus: Vec<&Postings> = query
            .minus_words
            .iter()
            .filter_map(|w| self.word_to_document_freqs.get(w))
            .collect();

        self.install(|| {
            plus.par_chunks(chunk_size(plus.len(), workers)).for_each(|chunk| {
                for &(ordinal, postings) in chunk {
                    let idf = self.inverse_document_freq(postings);
                    for (&id, &tf) in postings {
                        if self.passes(id, predicate) {
                            accumulator.update(id, |c| c.push((ordinal, tf * idf)));
                        }
                    }
                }
            });
            // plus phase has joined
            minus.par_chunks(chunk_size(minus.len(), workers)).for_each(|chunk| {
                for postings in chunk {
                    for id in postings.keys() {
                        accumulator.remove(id);
                    }
                }
            });
        });
    }
}
