use rayon::prelude::*;

use crate::document::Document;
use crate::error::Result;
use crate::index::SearchIndex;

/// Run every query with the default status filter, concurrently.
///
/// `out[i]` holds the results of `queries[i]`. All queries run to completion;
/// if any failed, the error of the first failing query is returned.
pub fn process_queries<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    let results: Vec<Result<Vec<Document>>> = index.install(|| {
        queries
            .par_iter()
            .map(|query| index.find_top_documents(query.as_ref()))
            .collect()
    });
    tracing::debug!(queries = queries.len(), "batch processed");
    results.into_iter().collect()
}

/// Like [`process_queries`], flattened in query order.
pub fn process_queries_joined<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(index, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;
    use crate::error::SearchError;

    fn index() -> SearchIndex {
        let mut index = SearchIndex::with_stop_words("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (i, text) in texts.iter().enumerate() {
            index.add_document(i as i32 + 1, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        index
    }

    #[test]
    fn results_align_with_queries() {
        let index = index();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let batched = process_queries(&index, &queries).unwrap();
        assert_eq!(batched.len(), 3);
        for (query, got) in queries.iter().zip(&batched) {
            assert_eq!(got, &index.find_top_documents(query).unwrap());
        }
        assert_eq!(batched[0].len(), 3);
        assert_eq!(batched[1].len(), 5);
        assert_eq!(batched[2].len(), 2);
    }

    #[test]
    fn joined_keeps_query_then_rank_order() {
        let index = index();
        let queries = vec!["curly hair".to_string(), "nasty rat -not".to_string()];
        let joined = process_queries_joined(&index, &queries).unwrap();
        let expected: Vec<Document> = queries
            .iter()
            .flat_map(|q| index.find_top_documents(q).unwrap())
            .collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn first_error_is_reported() {
        let index = index();
        let err = process_queries(&index, &["rat", "--bad", "-"]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(msg) if msg.contains("--bad")));
        assert!(process_queries::<&str>(&index, &[]).unwrap().is_empty());
    }
}
