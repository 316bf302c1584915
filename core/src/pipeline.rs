use crate::crawl::{crawl, Crawl, CrawlOptions};
use crate::error::Result;
use crate::index::{DocId, Document, IndexBuilder, InvertedIndex};
use crate::tokenizer::tokenize;
use std::path::Path;

/// Crawl `archive` from `seed` and index every reachable page.
pub fn build_index(archive: &Path, seed: &str, opts: &CrawlOptions) -> Result<InvertedIndex> {
    let crawled = crawl(archive, seed, opts)?;
    index_crawl(crawled)
}

/// Index crawled pages in visit order, crediting incoming anchor text to each target.
/// Pages without a single indexable token are left out and consume no id.
pub fn index_crawl(crawled: Crawl) -> Result<InvertedIndex> {
    let Crawl { pages, incoming_anchors } = crawled;
    let mut builder = IndexBuilder::new();
    let mut skipped = 0usize;
    for page in pages {
        let tokens = tokenize(&page.text);
        let anchor_tokens: Vec<String> = incoming_anchors
            .get(&page.path)
            .map(|anchors| anchors.iter().flat_map(|a| tokenize(a)).collect())
            .unwrap_or_default();
        let id = builder.len() as DocId;
        let doc = Document::new(id, page.path).with_title(page.title).with_text(page.text);
        if !builder.add_document(doc, &tokens, &anchor_tokens)? {
            skipped += 1;
        }
    }
    tracing::info!(indexed = builder.len(), skipped, "pages indexed");
    Ok(builder.finalize())
}
