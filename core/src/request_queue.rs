use std::collections::VecDeque;

use crate::document::{DocId, Document, DocumentStatus};
use crate::error::Result;
use crate::index::SearchIndex;

/// One slot per minute of a day.
pub const MIN_IN_DAY: usize = 1440;

/// Sliding window over the outcomes of recent searches.
///
/// Only the hit count of each request is kept; the number of requests that
/// found nothing is maintained incrementally.
pub struct RequestQueue<'a> {
    index: &'a SearchIndex,
    requests: VecDeque<usize>,
    capacity: usize,
    no_result_requests: usize,
}

impl<'a> RequestQueue<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_capacity(index, MIN_IN_DAY)
    }

    pub fn with_capacity(index: &'a SearchIndex, capacity: usize) -> Self {
        Self { index, requests: VecDeque::with_capacity(capacity), capacity, no_result_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let documents = self.index.find_top_documents(raw_query)?;
        self.record(&documents);
        Ok(documents)
    }

    pub fn add_find_request_with_status(&mut self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        let documents = self.index.find_top_documents_with_status(raw_query, status)?;
        self.record(&documents);
        Ok(documents)
    }

    pub fn add_find_request_by<P>(&mut self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let documents = self.index.find_top_documents_by(raw_query, predicate)?;
        self.record(&documents);
        Ok(documents)
    }

    /// Push an outcome to the front, evicting from the back past capacity.
    pub fn record(&mut self, documents: &[Document]) {
        if documents.is_empty() {
            self.no_result_requests += 1;
        }
        self.requests.push_front(documents.len());
        while self.requests.len() > self.capacity {
            if self.requests.pop_back() == Some(0) {
                self.no_result_requests -= 1;
            }
        }
    }

    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest_outcomes() {
        let index = SearchIndex::new();
        let mut queue = RequestQueue::new(&index);
        for _ in 0..MIN_IN_DAY + 1 {
            queue.record(&[]);
        }
        assert_eq!(queue.no_result_requests(), MIN_IN_DAY);
        queue.record(&[Document::new(1, 0.5, 1)]);
        assert_eq!(queue.no_result_requests(), 1439);
        assert_eq!(queue.len(), MIN_IN_DAY);
    }

    #[test]
    fn searches_are_recorded() {
        let mut index = SearchIndex::with_stop_words("and in at").unwrap();
        index.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        index.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        index.add_document(3, "big cat fancy collar ", DocumentStatus::Irrelevant, &[1, 2, 8]).unwrap();

        let mut queue = RequestQueue::with_capacity(&index, 2);
        assert!(queue.add_find_request("empty request").unwrap().is_empty());
        assert_eq!(queue.add_find_request("curly dog").unwrap().len(), 2);
        assert_eq!(queue.no_result_requests(), 1);
        assert_eq!(queue.add_find_request_with_status("big collar", DocumentStatus::Irrelevant).unwrap().len(), 1);
        assert_eq!(queue.no_result_requests(), 0);
        assert!(queue.add_find_request_by("sparrow", |_, _, _| true).unwrap().is_empty());
        assert_eq!(queue.no_result_requests(), 1);

        assert!(queue.add_find_request("--oops").is_err());
        assert_eq!(queue.len(), 2);
    }
}
