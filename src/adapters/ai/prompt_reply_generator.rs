//! Prompt-based reply generator.
//!
//! Implements [`ReplyGenerator`] by mapping the funnel step onto a fixed
//! Portuguese system prompt and sending the collected data plus the user's
//! message to an [`AIProvider`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::conversation::{CollectedFields, FunnelStep, ReplyContext};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, ReplyGenerator};

const PERSONA: &str = "Você é um atendente de clínica de emagrecimento.";

/// Renders funnel replies through a chat-completion model.
pub struct PromptReplyGenerator {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    max_completion_tokens: u32,
}

impl PromptReplyGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            max_completion_tokens: 150,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = max;
        self
    }
}

/// System prompt for the step the reply speaks for.
pub fn system_prompt(step: FunnelStep) -> String {
    let instruction = match step {
        FunnelStep::CollectName => {
            "O usuário acabou de se apresentar com o nome. Responda EXATAMENTE: 'Prazer, [NOME]! Qual é a sua data de nascimento no formato DD/MM/AAAA?' - Substitua [NOME] pelo nome informado."
        }
        FunnelStep::CollectBirthDate => {
            "O usuário informou a data de nascimento. Responda EXATAMENTE: 'Obrigada! Qual o principal motivo que te faz querer emagrecer?'"
        }
        FunnelStep::CollectWeightLossReason => {
            "O usuário informou o motivo para emagrecer. Agradeça pela informação de forma empática e breve."
        }
        FunnelStep::Qualified => {
            "O lead foi QUALIFICADO por motivo de saúde. Responda EXATAMENTE: 'Entendo, [NOME]. Sua saúde é prioridade! Vamos agendar uma avaliação gratuita.' - Substitua [NOME] pelo nome da pessoa."
        }
        FunnelStep::Rejected => {
            "O lead foi REJEITADO por motivo estético. Responda EXATAMENTE: 'Obrigada pelo contato, [NOME]! Infelizmente não conseguimos atender sua necessidade no momento.' - Substitua [NOME] pelo nome da pessoa."
        }
    };
    format!("{} {}", PERSONA, instruction)
}

/// What is known about the lead, one line per populated field.
pub fn conversation_context(fields: &CollectedFields) -> String {
    let mut context = String::from("Contexto da conversa:\n");
    if let Some(name) = &fields.name {
        context.push_str(&format!("Nome: {}\n", name));
    }
    if let Some(date) = fields.birth_date {
        context.push_str(&format!("Data de nascimento: {}\n", date.format("%d/%m/%Y")));
    }
    if let Some(reason) = &fields.weight_loss_reason {
        context.push_str(&format!("Motivo para emagrecer: {}\n", reason));
    }
    context
}

#[async_trait]
impl ReplyGenerator for PromptReplyGenerator {
    async fn generate_reply(&self, context: ReplyContext, user_text: &str) -> Result<String, AIError> {
        let request = CompletionRequest::new()
            .with_system_prompt(system_prompt(context.step))
            .with_message(
                MessageRole::User,
                format!("{}\n\nUsuário: {}", conversation_context(&context.fields), user_text),
            )
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_completion_tokens);

        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}
