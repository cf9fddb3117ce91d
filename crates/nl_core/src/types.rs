use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A newsletter submission: what the reader cares about and where to look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterParams {
    pub interests: Vec<String>,
    pub sources: Vec<String>,
}

/// A candidate article pulled out of a source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Hostname of the page the article was extracted from.
    pub source: String,
}

/// An article annotated with a best-effort relevance verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    /// Relevance on a 1-10 scale; 5 whenever the model output was unusable.
    pub score: i64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterItem {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub reason: String,
    pub source: String,
}

/// The final artifact produced by a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newsletter {
    pub intro: String,
    pub articles: Vec<NewsletterItem>,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Complete,
    Failed,
    /// Reserved for externally-forced cancellation; the pipeline never
    /// produces it on its own.
    Terminated,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "running",
            RunStatus::Complete => "complete",
            RunStatus::Failed => "failed",
            RunStatus::Terminated => "terminated",
        };
        write!(f, "{}", s)
    }
}

/// One end-to-end pipeline execution for a single submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}
