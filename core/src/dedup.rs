use std::collections::HashSet;

use crate::document::DocId;
use crate::index::SearchIndex;

/// Remove documents whose set of terms equals that of a smaller id.
/// Term frequencies and order do not matter. Returns the removed ids,
/// ascending.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocId> {
    let duplicates: Vec<DocId> = {
        let mut seen: HashSet<Vec<&str>> = HashSet::new();
        index
            .iter()
            .filter(|&id| {
                let words = index.word_frequencies(id).keys().map(String::as_str).collect();
                !seen.insert(words)
            })
            .collect()
    };
    for &document_id in &duplicates {
        tracing::info!(document_id, "found duplicate document id");
        index.remove_document(document_id);
    }
    duplicates
}
