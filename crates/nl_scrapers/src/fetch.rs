use crate::extract::extract_articles;
use futures::future::join_all;
use nl_core::{Article, Result};
use reqwest::header::USER_AGENT;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

const BOT_USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsletterBot/1.0)";

/// Default ceiling on simultaneous outbound fetches.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Fetches source pages and turns them into candidate articles. Each source
/// is independently fallible: a broken source contributes nothing instead of
/// aborting the batch.
pub struct SourceScraper {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl SourceScraper {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Fetch every source concurrently through the worker pool and flatten
    /// the results in source-list order.
    pub async fn scrape_all_sources(&self, sources: &[String]) -> Vec<Article> {
        info!("scraping {} sources", sources.len());
        let futures: Vec<_> = sources
            .iter()
            .map(|source| self.scrape_source(source))
            .collect();
        join_all(futures).await.into_iter().flatten().collect()
    }

    /// Scrape a single source, absorbing any failure into an empty list.
    pub async fn scrape_source(&self, url: &str) -> Vec<Article> {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Vec::new(),
        };
        match self.fetch_source(url).await {
            Ok(articles) => {
                info!("found {} articles at {}", articles.len(), url);
                articles
            }
            Err(e) => {
                warn!("failed to scrape {}: {}", url, e);
                Vec::new()
            }
        }
    }

    async fn fetch_source(&self, url: &str) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BOT_USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            // The body may still carry usable markup, so keep going.
            warn!("fetching {} returned {}", url, response.status());
        }
        let html = response.text().await?;
        Ok(extract_articles(&html, url))
    }
}

impl Default for SourceScraper {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
