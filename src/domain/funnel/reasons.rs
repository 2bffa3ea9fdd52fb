//! Reference material for classifying weight-loss reasons.
//!
//! The example phrases seed the vector index; the keyword lists drive the
//! offline heuristic.

/// Health-motivated reasons. Seeded as qualifying.
pub const QUALIFYING_EXAMPLES: &[&str] = &[
    "Preciso fazer cirurgia e o médico exigiu perder peso",
    "Minha saúde está em risco, pressão alta e diabetes",
    "Quero engravidar mas o médico disse que preciso emagrecer",
    "Tenho dor nas articulações por causa do peso",
    "Meu colesterol está altíssimo e estou com medo de infarto",
];

/// Appearance-motivated reasons. Seeded as not qualifying.
pub const REJECTING_EXAMPLES: &[&str] = &[
    "Quero ficar mais bonita pro verão",
    "Quero usar biquini na praia",
    "Quero ficar magra para as fotos",
    "Quero um corpo perfeito",
    "Quero impressionar meu namorado",
];

/// Substrings signalling an aesthetic motivation. Checked first.
pub const AESTHETIC_KEYWORDS: &[&str] = &[
    "bonit", "verão", "praia", "biquini", "roupa", "vestido", "aparencia", "aparência", "beleza",
    "magr", "secar", "definir", "corpo", "barriga", "perna", "braço", "selfie", "foto",
    "instagram", "namor", "paquera",
];

/// Substrings signalling a health motivation.
pub const HEALTH_KEYWORDS: &[&str] = &[
    "médico", "cirurgia", "saúde", "diabetes", "pressão", "colesterol", "articulações", "dor",
    "engravidar", "infarto", "risco", "doença", "problema", "exame", "tratamento", "remédio",
    "hospital",
];
