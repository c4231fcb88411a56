use kissearch::{Document, Entry, EntryId, ErrorKind, FieldValue, MatchType, Schema, SearchOptions};

const ARTICLES: [(&str, &str); 7] = [
    ("The Hilltop algorithm is an algorithm used to find documents relevant to a particular keyword topic in news search", "https://en.wikipedia.org/wiki/Hilltop_algorithm"),
    ("VisualRank is a system for finding and ranking images by analysing and comparing their content, rather than searching image names, Web links or other text", "https://en.wikipedia.org/wiki/VisualRank"),
    ("TrustRank is an algorithm that conducts link analysis to separate useful webpages from spam and helps search engine rank pages in SERPs (Search Engine Results Pages)", "https://en.wikipedia.org/wiki/TrustRank"),
    ("The CheiRank is an eigenvector with a maximal real eigenvalue of the Google matrix constructed for a directed network with the inverted directions of links", "https://en.wikipedia.org/wiki/CheiRank"),
    ("PageRank (PR) is an algorithm used by Google Search to rank web pages in their search engine results", "https://en.wikipedia.org/wiki/PageRank"),
    ("Okapi BM25 (BM is an abbreviation of best matching) is a ranking function used by search engines to estimate the relevance of documents to a given search query", "https://en.wikipedia.org/wiki/Okapi_BM25"),
    ("term frequency–inverse document frequency", "https://en.wikipedia.org/wiki/Tf%E2%80%93idf"),
];

fn articles(rounds: usize) -> Document {
    let schema = Schema::new()
        .add_number_field("id")
        .add_text_field("title")
        .add_keyword_field("url");
    let document = Document::new("example", schema);

    for _ in 0..rounds {
        for (title, url) in ARTICLES {
            let id = document.compute_next_number_value("id").unwrap();
            document.add(Entry::new().with_number("id", id).with_text("title", title).with_keyword("url", url));
        }
    }

    document.index_text_field("title").unwrap();
    document
}

fn weather() -> Document {
    let document = Document::new("weather", Schema::new().add_text_field("title"));
    for title in ["hello good man", "quite windy windy london", "weather windy today"] {
        document.add(Entry::new().with_text("title", title));
    }
    document.index_text_field("title").unwrap();
    document
}

#[test]
fn test_article_corpus() {
    let document = articles(20);
    assert_eq!(document.len(), 140);
    assert_eq!(document.entry(EntryId(0)).unwrap().len(), 3);

    let results = document.search("5", &SearchOptions::new(["id"])).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.hits[0].entry.find_field("id"), &FieldValue::Number(5));

    let results = document.search("algorithms link", &SearchOptions::new(["title"])).unwrap();
    assert_eq!(results.len(), 10);
    assert!(results.total_hits > 10);

    let results = document
        .search("https://en.wikipedia.org/wiki/Hilltop_algorithm", &SearchOptions::new(["url"]))
        .unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(results.total_hits, 20);
}

#[test]
fn test_ids_count_up_from_one() {
    let document = articles(1);
    let ids: Vec<u64> = document
        .entries()
        .iter()
        .filter_map(|entry| entry.find_field("id").as_number())
        .collect();
    assert_eq!(ids, (1..=7).collect::<Vec<u64>>());
    assert_eq!(document.compute_next_number_value("id").unwrap(), 8);
}

#[test]
fn test_repeated_term_ranks_first() {
    let document = weather();
    let results = document.search("windy", &SearchOptions::new(["title"])).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results.hits[0].entry.find_field("title").as_text().unwrap().raw, "quite windy windy london");
    assert_eq!(results.hits[1].entry.find_field("title").as_text().unwrap().raw, "weather windy today");
    assert!(results.hits[0].score >= results.hits[1].score);
}

#[test]
fn test_unknown_and_missing_matches() {
    let document = weather();

    let err = document.search("windy", &SearchOptions::new(["body"])).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownField);

    let results = document.search("zzzzzzzz", &SearchOptions::new(["title"])).unwrap();
    assert!(results.is_empty());

    let results = document.search("windy", &SearchOptions::new(Vec::<String>::new())).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_pagination() {
    let document = Document::new("pages", Schema::new().add_number_field("id").add_text_field("body"));
    for i in 0..20u64 {
        // decreasing term frequency gives a strict ranking
        let body = vec!["storm"; 20 - i as usize].join(" ") + " calm";
        document.add(Entry::new().with_number("id", i).with_text("body", &body));
    }
    document.index_text_field("body").unwrap();

    let all = document.search_scored("storm", &SearchOptions::new(["body"]), true).unwrap();
    assert_eq!(all.len(), 20);

    let first = document.search("storm", &SearchOptions::new(["body"]).with_page(1, 10)).unwrap();
    let second = document.search("storm", &SearchOptions::new(["body"]).with_page(2, 10)).unwrap();
    let third = document.search("storm", &SearchOptions::new(["body"]).with_page(3, 10)).unwrap();

    let first_ids: Vec<EntryId> = first.hits.iter().map(|hit| hit.entry_id).collect();
    let second_ids: Vec<EntryId> = second.hits.iter().map(|hit| hit.entry_id).collect();
    assert_eq!(first_ids, all[..10].iter().map(|(id, _)| *id).collect::<Vec<_>>());
    assert_eq!(second_ids, all[10..].iter().map(|(id, _)| *id).collect::<Vec<_>>());
    assert!(third.is_empty());
    assert_eq!(third.total_hits, 20);

    let err = document.search("storm", &SearchOptions::new(["body"]).with_page(0, 10)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn test_unsorted_results_follow_arrival_order() {
    let document = weather();
    let options = SearchOptions::new(["title"]).with_sort_by_score(false);
    let ids: Vec<EntryId> = document
        .search_scored("windy", &options, false)
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec![EntryId(1), EntryId(2)]);
}

#[test]
fn test_strict_matching() {
    let document = weather();
    let strict = SearchOptions::new(["title"]).with_match_type(MatchType::Strict);
    assert!(document.search("windo", &strict).unwrap().is_empty());
    assert_eq!(document.search("windo", &SearchOptions::new(["title"])).unwrap().len(), 2);
}

#[test]
fn test_remove_matching_leaves_no_matches() {
    let document = articles(3);
    let before = document.len();

    let removed = document.remove_matching("algorithms", ["title"]).unwrap();
    assert!(removed > 0);
    assert_eq!(document.len(), before - removed);

    document.index_text_field("title").unwrap();
    assert!(document.search_scored("algorithms", &SearchOptions::new(["title"]), true).unwrap().is_empty());
}

#[test]
fn test_index_is_a_snapshot() {
    let document = weather();
    document.add(Entry::new().with_text("title", "windy windy windy"));

    // not visible until the field is indexed again
    assert_eq!(document.search("windy", &SearchOptions::new(["title"])).unwrap().len(), 2);
    document.index_text_field("title").unwrap();
    let results = document.search("windy", &SearchOptions::new(["title"])).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.hits[0].entry_id, EntryId(3));
}
