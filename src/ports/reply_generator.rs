//! Reply Generator Port - turns a funnel step into the text sent to the lead.
//!
//! The generator owns the step-to-prompt mapping. It is handed an explicit
//! [`ReplyContext`] so the funnel decides which step a reply speaks for.

use async_trait::async_trait;

use crate::domain::conversation::ReplyContext;

use super::AIError;

/// Port for language-model backed reply rendering.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Render a reply for `context.step` answering `user_text`.
    ///
    /// An empty string is a valid result; the funnel substitutes its fallback.
    async fn generate_reply(&self, context: ReplyContext, user_text: &str) -> Result<String, AIError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_generator_is_object_safe() {
        fn _accepts_dyn(_generator: &dyn ReplyGenerator) {}
    }
}
