use futures::future::join_all;
use nl_core::{Article, ScoredArticle, TextGenerator};
use nl_inference::parse::{parse_relevance, DEFAULT_SCORE};
use std::sync::Arc;
use tracing::{info, warn};

/// Articles are scored in batches this size: concurrent within a batch,
/// sequential across batches, so a long candidate list never floods the
/// model endpoint.
pub const SCORING_BATCH_SIZE: usize = 5;

const SCORING_MAX_TOKENS: u32 = 150;

/// Score every article against the reader's interests. Infallible by
/// contract: each input produces exactly one output, with score 5 standing
/// in wherever the model was unhelpful.
pub async fn score_articles(
    generator: &Arc<dyn TextGenerator>,
    articles: &[Article],
    interests: &[String],
) -> Vec<ScoredArticle> {
    info!("scoring {} articles", articles.len());
    let mut scored = Vec::with_capacity(articles.len());
    for batch in articles.chunks(SCORING_BATCH_SIZE) {
        let futures: Vec<_> = batch
            .iter()
            .map(|article| score_article(generator, article, interests))
            .collect();
        scored.extend(join_all(futures).await);
    }
    scored
}

async fn score_article(
    generator: &Arc<dyn TextGenerator>,
    article: &Article,
    interests: &[String],
) -> ScoredArticle {
    let prompt = scoring_prompt(article, interests);
    match generator.generate(&prompt, SCORING_MAX_TOKENS).await {
        Ok(text) => match parse_relevance(&text) {
            Some(verdict) => ScoredArticle {
                article: article.clone(),
                score: verdict.score,
                reasoning: verdict.reasoning,
            },
            None => ScoredArticle {
                article: article.clone(),
                score: DEFAULT_SCORE,
                reasoning: "Could not determine relevance".to_string(),
            },
        },
        Err(e) => {
            warn!("scoring failed for \"{}\": {}", article.title, e);
            ScoredArticle {
                article: article.clone(),
                score: DEFAULT_SCORE,
                reasoning: "Scoring failed".to_string(),
            }
        }
    }
}

fn scoring_prompt(article: &Article, interests: &[String]) -> String {
    format!(
        "You are evaluating article relevance for a personalized newsletter.\n\n\
         User Interests: {}\n\n\
         Article:\n\
         Title: {}\n\
         Source: {}\n\n\
         Rate this article's relevance to the user's interests on a scale of 1-10, where:\n\
         - 10 = Extremely relevant, must-read for this user\n\
         - 7-9 = Highly relevant\n\
         - 4-6 = Somewhat relevant\n\
         - 1-3 = Not relevant\n\n\
         Respond ONLY with valid JSON in this exact format:\n\
         {{\"score\": 8, \"reasoning\": \"Brief explanation of why this matters to the user\"}}",
        interests.join(", "),
        article.title,
        article.source
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nl_core::{Error, Result};

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            Err(Error::Inference("model unavailable".to_string()))
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                title: format!("Article number {}", i),
                url: format!("https://example.com/article/{}", i),
                source: "example.com".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_every_article_scored() {
        let generator: Arc<dyn TextGenerator> = Arc::new(CannedGenerator(
            r#"{"score": 8, "reasoning": "On topic"}"#,
        ));
        let input = articles(12);
        let scored = score_articles(&generator, &input, &["ai".to_string()]).await;
        assert_eq!(scored.len(), 12);
        for (scored, article) in scored.iter().zip(&input) {
            assert_eq!(scored.article, *article);
            assert_eq!(scored.score, 8);
            assert_eq!(scored.reasoning, "On topic");
        }
    }

    #[tokio::test]
    async fn test_unparseable_output_defaults() {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(CannedGenerator("I'd rate this one pretty highly!"));
        let scored = score_articles(&generator, &articles(1), &["ai".to_string()]).await;
        assert_eq!(scored[0].score, 5);
        assert_eq!(scored[0].reasoning, "Could not determine relevance");
    }

    #[tokio::test]
    async fn test_generator_error_defaults() {
        let generator: Arc<dyn TextGenerator> = Arc::new(FailingGenerator);
        let scored = score_articles(&generator, &articles(3), &["ai".to_string()]).await;
        assert_eq!(scored.len(), 3);
        for s in &scored {
            assert_eq!(s.score, 5);
            assert_eq!(s.reasoning, "Scoring failed");
        }
    }

    #[tokio::test]
    async fn test_scores_stay_in_range() {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(CannedGenerator(r#"{"score": 99, "reasoning": "!"}"#));
        let scored = score_articles(&generator, &articles(1), &["ai".to_string()]).await;
        assert!((1..=10).contains(&scored[0].score));
    }
}
