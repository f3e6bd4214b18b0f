//! In-memory TF-IDF search index.
//!
//! Documents are indexed with a status and a rating; queries are plain
//! space-separated terms where a `-` prefix excludes documents. Ranking can run
//! on the calling thread or fan out over a rayon worker pool.

pub mod batch;
pub mod concurrent_map;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod index;
pub mod paginate;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod tokenizer;

pub use batch::{process_queries, process_queries_joined};
pub use concurrent_map::{ConcurrentMap, KeyedAccumulator, ShardKey};
pub use config::{ExecutionPolicy, IndexConfig};
pub use dedup::remove_duplicates;
pub use document::{DocId, Document, DocumentStatus};
pub use error::{Result, SearchError};
pub use index::SearchIndex;
pub use paginate::{paginate, Paginator};
pub use query::Query;
pub use ranking::MAX_RESULT_DOCUMENT_COUNT;
pub use request_queue::RequestQueue;
