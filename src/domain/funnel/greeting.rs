//! Greeting detection for the opening turn.

/// Phrases recognised as a greeting, already lower-cased.
pub const GREETINGS: &[&str] = &[
    "oi", "olá", "ola", "bom dia", "boa tarde", "boa noite", "hey", "e ai", "e aí", "salve",
    "fala", "opa", "eae",
];

/// Returns true when `text` is, or opens with, a known greeting.
///
/// The text is trimmed and lower-cased. A phrase matches if it is the whole
/// text, or is followed by a space or a comma. Any other continuation
/// (`"olámelhor"`, `"bom dia!"`) does not match.
pub fn is_greeting(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    GREETINGS.iter().any(|greeting| {
        normalized
            .strip_prefix(greeting)
            .map(|rest| rest.is_empty() || rest.starts_with(' ') || rest.starts_with(','))
            .unwrap_or(false)
    })
}
