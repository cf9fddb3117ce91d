use nl_core::ScoredArticle;
use tracing::info;

/// Articles scoring below this never make the newsletter.
pub const MIN_SCORE: i64 = 6;

/// Hard cap on newsletter length.
pub const MAX_ARTICLES: usize = 7;

/// Deterministic filter + stable sort + cap. Ties keep their original
/// order; there is no secondary sort key.
pub fn select_top(mut scored: Vec<ScoredArticle>) -> Vec<ScoredArticle> {
    scored.retain(|article| article.score >= MIN_SCORE);
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_ARTICLES);
    info!("selected {} top articles", scored.len());
    scored
}
