use chrono::Utc;
use futures::future::join_all;
use nl_core::{Newsletter, NewsletterItem, ScoredArticle, TextGenerator};
use std::sync::Arc;
use tracing::{info, warn};

const INTRO_MAX_TOKENS: u32 = 100;
const SUMMARY_MAX_TOKENS: u32 = 150;
const FALLBACK_INTRO: &str = "Here are your personalized articles this week.";

/// Assemble the newsletter: one intro call, then one summary call per
/// article, all summaries concurrent. Individual failures degrade to
/// fallbacks instead of failing the step.
pub async fn render_newsletter(
    generator: &Arc<dyn TextGenerator>,
    articles: &[ScoredArticle],
    interests: &[String],
) -> Newsletter {
    info!("generating newsletter for {} articles", articles.len());

    let intro = match generator
        .generate(&intro_prompt(interests), INTRO_MAX_TOKENS)
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => FALLBACK_INTRO.to_string(),
        Err(e) => {
            warn!("intro generation failed: {}", e);
            FALLBACK_INTRO.to_string()
        }
    };

    let items = join_all(
        articles
            .iter()
            .map(|article| summarize_article(generator, article, interests)),
    )
    .await;

    Newsletter {
        intro,
        articles: items,
        generated_at: Utc::now(),
    }
}

async fn summarize_article(
    generator: &Arc<dyn TextGenerator>,
    article: &ScoredArticle,
    interests: &[String],
) -> NewsletterItem {
    let summary = match generator
        .generate(&summary_prompt(article, interests), SUMMARY_MAX_TOKENS)
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => article.article.title.clone(),
        Err(e) => {
            warn!(
                "summary generation failed for \"{}\": {}",
                article.article.title, e
            );
            article.article.title.clone()
        }
    };

    NewsletterItem {
        title: article.article.title.clone(),
        url: article.article.url.clone(),
        summary,
        reason: article.reasoning.clone(),
        source: article.article.source.clone(),
    }
}

fn intro_prompt(interests: &[String]) -> String {
    format!(
        "Create a brief, friendly intro (2-3 sentences) for a personalized newsletter about {}. \n\
         Make it engaging and conversational. Don't use the word \"curated\".",
        interests.join(", ")
    )
}

fn summary_prompt(article: &ScoredArticle, interests: &[String]) -> String {
    format!(
        "Summarize this article in 2-3 sentences for someone interested in {}:\n\n\
         Title: {}\n\
         Source: {}\n\n\
         Make it engaging and explain why it matters.",
        interests.join(", "),
        article.article.title,
        article.article.source
    )
}
