use std::sync::Arc;
use kissearch::{Collection, Config, Document, Entry, Schema, SearchOptions, SearchRequest};
use kissearch::storage::layout::StorageLayout;

fn main() -> kissearch::Result<()> {
    let schema = Schema::new()
        .add_number_field("id")
        .add_text_field("title")
        .add_keyword_field("url");

    let document = Arc::new(Document::new("wiki", schema));

    let articles = [
        ("PageRank is an algorithm used by Google Search to rank web pages", "https://en.wikipedia.org/wiki/PageRank"),
        ("TrustRank conducts link analysis to separate useful webpages from spam", "https://en.wikipedia.org/wiki/TrustRank"),
        ("Okapi BM25 is a ranking function used by search engines", "https://en.wikipedia.org/wiki/Okapi_BM25"),
    ];

    for (title, url) in articles {
        let id = document.compute_next_number_value("id")?;
        document.add(Entry::new().with_number("id", id).with_text("title", title).with_keyword("url", url));
    }

    document.index_text_field("title")?;

    let results = document.search("algorithms links", &SearchOptions::new(["title"]))?;
    println!("'algorithms links': {} hits in {}ms", results.total_hits, results.took_ms);
    for hit in &results.hits {
        println!("  {:.4}  {}", hit.score, hit.entry.to_json());
    }

    let request = SearchRequest::from_json(r#"{"q": "2", "field_names": "id"}"#)?;
    println!("id = 2: {}", document.search_request(request)?.to_json());

    let dir = std::env::temp_dir().join("kissearch-demo");
    let layout = StorageLayout::new(&dir)?;

    let collection = Collection::new();
    collection.add(document)?;
    collection.save_all(&layout)?;

    let reopened = Collection::open(&layout, &Config::default())?;
    println!("Reopened {:?} from {:?}", reopened.names(), dir);

    Ok(())
}
