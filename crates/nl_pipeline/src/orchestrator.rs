use crate::render::render_newsletter;
use crate::retry::RetryPolicy;
use crate::score::score_articles;
use crate::select::select_top;
use nl_core::{
    Article, ArtifactStore, Error, Newsletter, NewsletterParams, Result, RunRegistry, RunStatus,
    ScoredArticle, StepStore, TextGenerator,
};
use nl_scrapers::fetch::{SourceScraper, DEFAULT_CONCURRENCY};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// How long a finished newsletter stays retrievable.
pub const ARTIFACT_TTL: Duration = Duration::from_secs(3600);

pub fn artifact_key(run_id: &str) -> String {
    format!("run:{}", run_id)
}

/// Everything the pipeline needs from the outside world, injected
/// explicitly instead of reaching for ambient bindings.
#[derive(Clone)]
pub struct PipelineContext {
    pub generator: Arc<dyn TextGenerator>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub steps: Arc<dyn StepStore>,
    pub runs: Arc<dyn RunRegistry>,
}

/// Runs the scrape → score → select → render → persist pipeline for one run
/// at a time, checkpointing each step's output so a resumed run only
/// executes the remaining suffix.
pub struct Orchestrator {
    ctx: PipelineContext,
    scraper: SourceScraper,
    policy: RetryPolicy,
}

impl Orchestrator {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            scraper: SourceScraper::new(DEFAULT_CONCURRENCY),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drive a run to a terminal status. Never returns an error: failures
    /// land in the run registry instead.
    pub async fn execute(&self, run_id: &str, params: &NewsletterParams) {
        info!("starting newsletter run {}", run_id);
        match self.run(run_id, params).await {
            Ok(newsletter) => {
                info!(
                    "run {} complete with {} articles",
                    run_id,
                    newsletter.articles.len()
                );
                if let Err(e) = self.ctx.runs.set_status(run_id, RunStatus::Complete).await {
                    error!("failed to mark run {} complete: {}", run_id, e);
                }
            }
            Err(e) => {
                error!("run {} failed: {}", run_id, e);
                if let Err(e) = self.ctx.runs.set_status(run_id, RunStatus::Failed).await {
                    error!("failed to mark run {} failed: {}", run_id, e);
                }
            }
        }
    }

    /// Execute the pipeline steps in order, replaying any step already in
    /// the ledger.
    pub async fn run(&self, run_id: &str, params: &NewsletterParams) -> Result<Newsletter> {
        let scraper = &self.scraper;
        let generator = &self.ctx.generator;
        let sources = &params.sources;
        let interests = &params.interests;

        let articles: Vec<Article> = self
            .step(run_id, "scrape-articles", || async move {
                Ok(scraper.scrape_all_sources(sources).await)
            })
            .await?;
        info!("found {} articles", articles.len());

        let articles_ref = &articles;
        let scored: Vec<ScoredArticle> = self
            .step(run_id, "score-articles", || async move {
                Ok(score_articles(generator, articles_ref, interests).await)
            })
            .await?;

        let scored_ref = &scored;
        let top: Vec<ScoredArticle> = self
            .step(run_id, "select-top", || async move {
                Ok(select_top(scored_ref.clone()))
            })
            .await?;

        let top_ref = &top;
        let newsletter: Newsletter = self
            .step(run_id, "generate-newsletter", || async move {
                Ok(render_newsletter(generator, top_ref, interests).await)
            })
            .await?;

        let artifacts = &self.ctx.artifacts;
        let key = artifact_key(run_id);
        let key_ref: &str = &key;
        let newsletter_ref = &newsletter;
        let () = self
            .step(run_id, "store-result", || async move {
                debug!("storing result under key {}", key_ref);
                let json = serde_json::to_string(newsletter_ref)?;
                artifacts.put(key_ref, &json, ARTIFACT_TTL).await
            })
            .await?;

        Ok(newsletter)
    }

    /// Checkpointed step execution: consult the ledger, otherwise run the
    /// closure under the retry policy and record its output before moving
    /// on.
    async fn step<T, F, Fut>(&self, run_id: &str, name: &str, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(recorded) = self.ctx.steps.load_step(run_id, name).await? {
            debug!("step {} already recorded for run {}, replaying", name, run_id);
            return Ok(serde_json::from_value(recorded)?);
        }
        info!("running step {} for run {}", name, run_id);
        let output = self.with_retry(name, f).await?;
        self.ctx
            .steps
            .save_step(run_id, name, serde_json::to_value(&output)?)
            .await?;
        Ok(output)
    }

    async fn with_retry<T, F, Fut>(&self, step: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;
        for attempt in 0..self.policy.max_attempts {
            match f().await {
                Ok(output) => return Ok(output),
                Err(e) => {
                    warn!(
                        "step {} attempt {}/{} failed: {}",
                        step,
                        attempt + 1,
                        self.policy.max_attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < self.policy.max_attempts {
                        sleep(self.policy.delay_for(attempt)).await;
                    }
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| Error::Workflow(format!("step {} produced no result", step))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nl_inference::DummyModel;
    use nl_storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context(storage: Arc<MemoryStorage>, generator: Arc<dyn TextGenerator>) -> PipelineContext {
        PipelineContext {
            generator,
            artifacts: storage.clone(),
            steps: storage.clone(),
            runs: storage,
        }
    }

    fn params() -> NewsletterParams {
        NewsletterParams {
            interests: vec!["rust".to_string()],
            sources: Vec::new(),
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("generated".to_string())
        }
    }

    struct FailingArtifactStore;

    #[async_trait]
    impl ArtifactStore for FailingArtifactStore {
        async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(Error::Storage("store unavailable".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_run_with_no_sources_completes() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(storage.clone(), Arc::new(DummyModel::new()));
        let run = storage.create_run().await.unwrap();
        let orchestrator = Orchestrator::new(ctx);

        orchestrator.execute(&run.id, &params()).await;

        let run = storage.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Complete);

        let stored = storage.get(&artifact_key(&run.id)).await.unwrap().unwrap();
        let newsletter: Newsletter = serde_json::from_str(&stored).unwrap();
        assert!(newsletter.articles.is_empty());
        assert!(!newsletter.intro.is_empty());
    }

    #[tokio::test]
    async fn test_checkpointed_scrape_feeds_later_steps() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(storage.clone(), Arc::new(DummyModel::new()));
        let run = storage.create_run().await.unwrap();

        let articles = vec![
            Article {
                title: "First recorded headline".to_string(),
                url: "https://example.com/1".to_string(),
                source: "example.com".to_string(),
            },
            Article {
                title: "Second recorded headline".to_string(),
                url: "https://example.com/2".to_string(),
                source: "example.com".to_string(),
            },
        ];
        storage
            .save_step(
                &run.id,
                "scrape-articles",
                serde_json::to_value(&articles).unwrap(),
            )
            .await
            .unwrap();

        let orchestrator = Orchestrator::new(ctx);
        orchestrator.execute(&run.id, &params()).await;

        let run = storage.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Complete);

        // dummy model scores 7, above the selection threshold
        let stored = storage.get(&artifact_key(&run.id)).await.unwrap().unwrap();
        let newsletter: Newsletter = serde_json::from_str(&stored).unwrap();
        assert_eq!(newsletter.articles.len(), 2);
        assert_eq!(newsletter.articles[0].title, "First recorded headline");
    }

    #[tokio::test]
    async fn test_resume_skips_recorded_steps() {
        let storage = Arc::new(MemoryStorage::new());
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let ctx = context(storage.clone(), generator.clone());
        let run = storage.create_run().await.unwrap();

        let scored = vec![ScoredArticle {
            article: Article {
                title: "Recorded".to_string(),
                url: "https://example.com/1".to_string(),
                source: "example.com".to_string(),
            },
            score: 8,
            reasoning: "r".to_string(),
        }];
        let newsletter = Newsletter {
            intro: "intro".to_string(),
            articles: Vec::new(),
            generated_at: chrono::Utc::now(),
        };
        for (name, value) in [
            ("scrape-articles", serde_json::json!([])),
            ("score-articles", serde_json::to_value(&scored).unwrap()),
            ("select-top", serde_json::to_value(&scored).unwrap()),
            (
                "generate-newsletter",
                serde_json::to_value(&newsletter).unwrap(),
            ),
        ] {
            storage.save_step(&run.id, name, value).await.unwrap();
        }

        let orchestrator = Orchestrator::new(ctx);
        orchestrator.execute(&run.id, &params()).await;

        assert_eq!(
            storage.get_run(&run.id).await.unwrap().unwrap().status,
            RunStatus::Complete
        );
        // every model-facing step was replayed from the ledger
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_store_marks_run_failed() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = PipelineContext {
            generator: Arc::new(DummyModel::new()),
            artifacts: Arc::new(FailingArtifactStore),
            steps: storage.clone(),
            runs: storage.clone(),
        };
        let run = storage.create_run().await.unwrap();
        let orchestrator = Orchestrator::new(ctx).with_retry_policy(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
        });

        orchestrator.execute(&run.id, &params()).await;

        assert_eq!(
            storage.get_run(&run.id).await.unwrap().unwrap().status,
            RunStatus::Failed
        );
        assert!(storage.get(&artifact_key(&run.id)).await.unwrap().is_none());
    }
}
