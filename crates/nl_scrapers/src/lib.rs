pub mod extract;
pub mod fetch;

pub use extract::{clean_text, extract_articles, MAX_ARTICLES_PER_SOURCE};
pub use fetch::SourceScraper;
