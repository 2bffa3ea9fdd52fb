//! Funnel state machine.
//!
//! Decides, for one inbound message, the reply text and the state update to
//! persist. Holds no state between turns: everything comes in through the
//! conversation snapshot and goes out through [`FunnelOutcome`].
//!
//! Rule precedence for a turn:
//!
//! 1. New conversation opening with a greeting gets the fixed welcome.
//! 2. Otherwise a default reply is rendered for the *current* step.
//! 3. `collect_name`: a greeting keeps the default reply; anything else is the
//!    name and the step moves to `collect_birth_date`.
//! 4. `collect_birth_date`: a valid `DD/MM/YYYY` is stored and the step moves
//!    on; otherwise the reply becomes the date re-prompt.
//! 5. `collect_weight_loss_reason`: the reason is scored, the terminal
//!    outcome recorded and the reply re-rendered for that outcome.
//! 6. Terminal steps only refresh the activity timestamp.
//!
//! The default reply in rule 2 is rendered before the step changes, so after
//! a name or date is accepted it still speaks for the previous step. Only
//! rule 5 re-renders, through [`FunnelStateMachine::render_outcome`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::conversation::{Conversation, FunnelStep, ReplyContext, StateUpdate};
use crate::domain::foundation::Timestamp;
use crate::ports::ReplyGenerator;

use super::classifier::SimilarityClassifier;
use super::date_parser::parse_date;
use super::greeting::is_greeting;
use super::replies;

/// Default score a reason must strictly exceed to qualify.
pub const DEFAULT_QUALIFICATION_THRESHOLD: f32 = 0.7;

/// Result of advancing the funnel by one message.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelOutcome {
    /// Text to send back. Never empty.
    pub reply: String,
    /// Changes to persist. Always refreshes the activity timestamp.
    pub update: StateUpdate,
}

/// Drives the qualification funnel one inbound message at a time.
#[derive(Clone)]
pub struct FunnelStateMachine {
    replies: Arc<dyn ReplyGenerator>,
    classifier: SimilarityClassifier,
    threshold: f32,
}

impl FunnelStateMachine {
    pub fn new(replies: Arc<dyn ReplyGenerator>, classifier: SimilarityClassifier) -> Self {
        Self {
            replies,
            classifier,
            threshold: DEFAULT_QUALIFICATION_THRESHOLD,
        }
    }

    /// Overrides the qualification threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Advances the funnel for `inbound` against the `conversation` snapshot.
    pub async fn advance(
        &self,
        conversation: &Conversation,
        inbound: &str,
        is_new: bool,
        now: Timestamp,
    ) -> FunnelOutcome {
        let update = StateUpdate::touch(now);

        if is_new && is_greeting(inbound) {
            return FunnelOutcome {
                reply: replies::WELCOME.to_string(),
                update,
            };
        }

        let reply = self.render(conversation, conversation.reply_context(), inbound).await;

        match conversation.funnel_step {
            FunnelStep::CollectName => {
                if is_greeting(inbound) {
                    FunnelOutcome { reply, update }
                } else {
                    FunnelOutcome {
                        reply,
                        update: update.with_name(inbound).with_step(FunnelStep::CollectBirthDate),
                    }
                }
            }
            FunnelStep::CollectBirthDate => match parse_date(inbound) {
                Some(date) => FunnelOutcome {
                    reply,
                    update: update
                        .with_birth_date(date)
                        .with_step(FunnelStep::CollectWeightLossReason),
                },
                None => FunnelOutcome {
                    reply: replies::INVALID_DATE.to_string(),
                    update,
                },
            },
            FunnelStep::CollectWeightLossReason => {
                let score = self.classifier.score(&conversation.phone_number, inbound).await;
                let qualified = score > self.threshold;
                debug!(
                    phone_number = %conversation.phone_number,
                    score,
                    qualified,
                    "Weight loss reason classified"
                );

                let terminal = if qualified {
                    FunnelStep::Qualified
                } else {
                    FunnelStep::Rejected
                };
                let update = update.with_weight_loss_reason(inbound).with_outcome(qualified);
                let reply = self.render_outcome(conversation, terminal, inbound).await;
                FunnelOutcome { reply, update }
            }
            FunnelStep::Qualified | FunnelStep::Rejected => FunnelOutcome { reply, update },
        }
    }

    /// Renders the closing reply as if the conversation already sat on the
    /// terminal step, replacing the default reply of the same turn.
    ///
    /// The collected fields are the pre-turn ones; the reason just given is
    /// not part of the context.
    async fn render_outcome(
        &self,
        conversation: &Conversation,
        terminal: FunnelStep,
        inbound: &str,
    ) -> String {
        let context = conversation.reply_context().with_step(terminal);
        self.render(conversation, context, inbound).await
    }

    /// One reply generation call. Errors and empty output become the fixed
    /// fallback text.
    async fn render(&self, conversation: &Conversation, context: ReplyContext, inbound: &str) -> String {
        let step = context.step;
        match self.replies.generate_reply(context, inbound).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(
                    phone_number = %conversation.phone_number,
                    stage = "reply_generation",
                    step = %step,
                    "Reply generation returned empty text"
                );
                replies::GENERATION_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(
                    phone_number = %conversation.phone_number,
                    stage = "reply_generation",
                    step = %step,
                    error = %e,
                    "Reply generation failed"
                );
                replies::GENERATION_FALLBACK.to_string()
            }
        }
    }
}
