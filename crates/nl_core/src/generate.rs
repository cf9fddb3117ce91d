use crate::Result;
use async_trait::async_trait;

/// An external text-generation capability. Implementations may fail or
/// return unparseable text; callers are expected to guard every invocation
/// with a fallback.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name of the backing model, for logs.
    fn name(&self) -> &str;

    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}
