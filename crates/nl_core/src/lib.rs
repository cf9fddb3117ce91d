pub mod error;
pub mod generate;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use generate::TextGenerator;
pub use storage::{ArtifactStore, RunRegistry, StepStore};
pub use types::{
    Article, Newsletter, NewsletterItem, NewsletterParams, Run, RunStatus, ScoredArticle,
};

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::generate::TextGenerator;
    pub use crate::storage::{ArtifactStore, RunRegistry, StepStore};
    pub use crate::types::{
        Article, Newsletter, NewsletterItem, NewsletterParams, Run, RunStatus, ScoredArticle,
    };
}
