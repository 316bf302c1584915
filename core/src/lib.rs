//! Search over an archive of HTML pages: crawl the archive's link graph, build a
//! positional tf-idf index, and answer boolean, phrase, ranked and expanded queries.

pub mod boolean;
pub mod cache;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod phrase;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod reformulate;
pub mod snippet;
pub mod tokenizer;

pub use cache::IndexCache;
pub use crawl::CrawlOptions;
pub use error::{Result, SearchError};
pub use index::{DocId, Document, IndexBuilder, IndexView, InvertedIndex, Posting, TermId};
pub use query::{Query, QueryResult};
pub use reformulate::{reformulate, ReformulateOptions, Reformulation};
