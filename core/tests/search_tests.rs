use search_core::{
    process_queries, remove_duplicates, DocId, Document, DocumentStatus, ExecutionPolicy, IndexConfig, RequestQueue,
    SearchError, SearchIndex, MAX_RESULT_DOCUMENT_COUNT,
};

fn ids(docs: &[Document]) -> Vec<DocId> {
    docs.iter().map(|d| d.id).collect()
}

fn assert_close(got: f64, want: f64) {
    let tolerance = 1e-6 * want.abs().max(1e-12);
    assert!((got - want).abs() <= tolerance, "got {got}, want {want}");
}

#[test]
fn dog_outranks_cat_for_dog_city() {
    let mut index = SearchIndex::new();
    index.add_document(10, "dog in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    index.add_document(11, "cat in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();

    let found = index.find_top_documents("dog city").unwrap();
    assert_eq!(ids(&found), vec![10, 11]);
    assert_eq!(found[0].rating, 2);
}

#[test]
fn tf_idf_relevance_values() {
    let mut index = SearchIndex::new();
    let docs = [
        (10, "irrelevant dog is not", [1, 2, 3]),
        (11, "dog in the city not the great idea", [4, 4, 3]),
        (12, "dog in the city in great", [4, 1, 3]),
        (13, "dog in the city", [1, 1, 2]),
    ];
    for (id, text, ratings) in docs {
        index.add_document(id, text, DocumentStatus::Actual, &ratings).unwrap();
    }

    let found = index.find_top_documents("dog not").unwrap();
    assert_eq!(ids(&found), vec![10, 11, 12, 13]);
    let expected = [0.17328679513998632, 0.08664339756999316, 0.0, 0.0];
    for (doc, want) in found.iter().zip(expected) {
        assert_close(doc.relevance, want);
    }
}

#[test]
fn empty_query_finds_nothing() {
    let mut index = SearchIndex::new();
    index.add_document(1, "cat city", DocumentStatus::Actual, &[]).unwrap();
    assert!(index.find_top_documents("").unwrap().is_empty());
    assert!(index.find_top_documents("   ").unwrap().is_empty());
}

#[test]
fn stop_words_never_match() {
    let mut index = SearchIndex::with_stop_words("in the").unwrap();
    index.add_document(42, "cat in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();

    assert!(index.find_top_documents("in").unwrap().is_empty());
    assert!(index.find_top_documents("the -city").unwrap().is_empty());
    let (words, _) = index.match_document("cat in the city", 42).unwrap();
    assert_eq!(words, vec!["cat", "city"]);
    // "-in" is a stop word and must not exclude anything
    assert_eq!(ids(&index.find_top_documents("cat -in").unwrap()), vec![42]);
}

#[test]
fn minus_words_exclude_in_both_modes() {
    let mut index = SearchIndex::new();
    index.add_document(1, "white cat fancy collar", DocumentStatus::Actual, &[8, -3]).unwrap();
    index.add_document(2, "fluffy cat fluffy tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
    index.add_document(3, "groomed dog expressive eyes", DocumentStatus::Actual, &[5, -12, 2, 1]).unwrap();

    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let found = index
            .find_top_documents_with(policy, "fluffy groomed cat -collar", |_, s, _| s == DocumentStatus::Actual)
            .unwrap();
        assert_eq!(ids(&found), vec![2, 3]);
        let (words, status) = index.match_document_with(policy, "cat -collar", 1).unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Actual);
    }
}

#[test]
fn results_are_capped_and_sorted() {
    let mut index = SearchIndex::new();
    for id in 0..20 {
        let text = format!("common {}", "rare ".repeat(id as usize % 4));
        index.add_document(id, &text, DocumentStatus::Actual, &[id]).unwrap();
    }
    let found = index.find_top_documents("rare common").unwrap();
    assert_eq!(found.len(), MAX_RESULT_DOCUMENT_COUNT);
    for pair in found.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let tie = (a.relevance - b.relevance).abs() < 1e-6 * a.relevance.abs().max(b.relevance.abs());
        if tie {
            assert!(a.rating >= b.rating);
        } else {
            assert!(a.relevance > b.relevance);
        }
    }
    // three "rare" words give the highest tf; ties broken by the larger rating
    assert_eq!(ids(&found)[..3], [19, 15, 11]);
}

#[test]
fn invalid_input_is_rejected_without_mutation() {
    let mut index = SearchIndex::new();
    index.add_document(1, "cat", DocumentStatus::Actual, &[]).unwrap();

    for (id, text) in [(-1, "dog"), (1, "dog"), (2, "d\x10og")] {
        let err = index.add_document(id, text, DocumentStatus::Actual, &[5]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }
    assert_eq!(index.document_count(), 1);
    assert!(index.word_frequencies(2).is_empty());

    for query in ["-", "cat --dog", "c\x07at"] {
        assert!(matches!(index.find_top_documents(query), Err(SearchError::InvalidArgument(_))));
        assert!(matches!(
            index.find_top_documents_with(ExecutionPolicy::Parallel, query, |_, _, _| true),
            Err(SearchError::InvalidArgument(_))
        ));
    }
}

#[test]
fn sequential_and_parallel_agree_on_larger_corpus() {
    let words = ["alpha", "beta", "gamma", "delta", "eps", "zeta", "eta", "theta", "iota", "kappa"];
    let mut index = SearchIndex::with_config(IndexConfig::new().parallelism(3)).unwrap();
    index.set_stop_words("eta").unwrap();
    for id in 0..500 {
        let text: Vec<&str> = (0..6).map(|k| words[(id as usize * 7 + k * k) % words.len()]).collect();
        let status = if id % 11 == 0 { DocumentStatus::Banned } else { DocumentStatus::Actual };
        index.add_document(id, &text.join(" "), status, &[id % 5, 3]).unwrap();
    }
    let queries = ["alpha beta -gamma", "delta eps zeta theta", "kappa -iota eta", "beta gamma delta -alpha -zeta"];
    for query in queries {
        let predicate = |id: DocId, status: DocumentStatus, rating: i32| status == DocumentStatus::Actual && (id + rating) % 3 != 0;
        let seq = index.find_top_documents_with(ExecutionPolicy::Sequential, query, predicate).unwrap();
        let par = index.find_top_documents_with(ExecutionPolicy::Parallel, query, predicate).unwrap();
        assert_eq!(seq, par, "{query}");
    }
}

#[test]
fn many_near_tied_documents_rank_without_panicking() {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: u64| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed % bound
    };
    for round in 0..20 {
        let mut index = SearchIndex::with_config(IndexConfig::new().parallelism(2)).unwrap();
        for id in 0..60 {
            let len = 2000 + next(6) as usize;
            let hits = len / 2 + next(3) as usize;
            let text = format!("{}{}", "x ".repeat(hits), "f ".repeat(len - hits));
            index.add_document(id, &text, DocumentStatus::Actual, &[next(10) as i32]).unwrap();
        }
        index.add_document(60, "filler only", DocumentStatus::Actual, &[]).unwrap();

        let seq = index.find_top_documents("x").unwrap();
        let par = index.find_top_documents_with(ExecutionPolicy::Parallel, "x", |_, s, _| s == DocumentStatus::Actual).unwrap();
        assert_eq!(seq.len(), MAX_RESULT_DOCUMENT_COUNT, "round {round}");
        assert_eq!(seq, par, "round {round}");
    }
}

#[test]
fn batch_queue_and_dedup_work_together() {
    let mut index = SearchIndex::with_stop_words("and with").unwrap();
    index.add_document(1, "funny pet and nasty rat", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
    index.add_document(2, "nasty rat and funny pet", DocumentStatus::Actual, &[1, 2]).unwrap();
    index.add_document(3, "curly hair", DocumentStatus::Actual, &[1]).unwrap();

    let removed = remove_duplicates(&mut index);
    assert_eq!(removed, vec![2]);

    let batched = process_queries(&index, &["rat", "hair", "sparrow"]).unwrap();
    assert_eq!(batched.iter().map(|r| ids(r)).collect::<Vec<_>>(), vec![vec![1], vec![3], vec![]]);

    let mut queue = RequestQueue::new(&index);
    for query in ["rat", "sparrow", "owl"] {
        queue.add_find_request(query).unwrap();
    }
    assert_eq!(queue.no_result_requests(), 2);
}
