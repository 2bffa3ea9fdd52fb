//! Fixed replies that never go through the language model.

/// Opening reply to a greeting on a brand new conversation.
pub const WELCOME: &str = "Olá! Bem-vindo à clínica. Qual é o seu nome?";

/// Re-prompt when the birth date does not parse.
pub const INVALID_DATE: &str = "Por favor, informe uma data válida no formato DD/MM/AAAA.";

/// Used when reply generation fails or comes back empty.
pub const GENERATION_FALLBACK: &str = "Desculpe, não consegui processar sua mensagem.";

/// User-facing text for an expired session.
pub const CONVERSATION_EXPIRED: &str = "Conversa expirada, por favor inicie novamente.";
