use std::collections::HashMap;
use std::time::Duration;

use crate::label::normalize_label;

/// Diacritics that flag a label as PT-BR without needing a keyword match.
const PT_MARKS: &str = "çãõáéíóúâêôàÇÃÕÁÉÍÓÚÂÊÔÀ";

/// Keyword hints, matched against the normalized (accent-stripped) label.
const PT_HINTS: &[&str] = &[
    "quarto",
    "andar",
    "terreo",
    "superior",
    "opcao",
    "romantico",
    "cozinha",
    "suite",
    "luxo",
    "planta",
    "baja",
    "duplo",
    "triple",
];

/// Collapses canonical labels outside a family prefix into one umbrella
/// bucket, e.g. every non-"Quarto" label into "Extras".
#[derive(Debug, Clone)]
pub struct UmbrellaRule {
    /// Case-insensitive prefix that keeps a label as-is.
    pub keep_prefix: String,
    /// Replacement label for everything else (and for empty labels).
    pub bucket_label: String,
}

/// Tunable canonicalization policy: alias overrides, locale heuristic
/// inputs and collision handling.
#[derive(Debug, Clone)]
pub struct LabelPolicy {
    /// Normalized label or source entity id → forced display label.
    /// An alias hit wins unconditionally, regardless of candidate values.
    pub aliases: HashMap<String, String>,
    pub locale_marks: String,
    pub locale_keywords: Vec<String>,
    pub umbrella: Option<UmbrellaRule>,
    /// Merge distinct entities that resolve to the same label (the default
    /// umbrella view wants this). When false, later colliders keep their
    /// own row under a numbered suffix.
    pub merge_collisions: bool,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert(
            "habitacion triple planta baja".to_string(),
            "Quarto Triplo – Térreo".to_string(),
        );
        aliases.insert(
            "quarto terreo com mini cozinha e banheira".to_string(),
            "Quarto térreo c/ cozinha e banheira".to_string(),
        );
        Self {
            aliases,
            locale_marks: PT_MARKS.to_string(),
            locale_keywords: PT_HINTS.iter().map(|s| s.to_string()).collect(),
            umbrella: Some(UmbrellaRule {
                keep_prefix: "quarto".to_string(),
                bucket_label: "Extras".to_string(),
            }),
            merge_collisions: true,
        }
    }
}

impl LabelPolicy {
    /// Heuristic, not a contract: a label "looks local" when it carries a
    /// locale diacritic or contains a known keyword in normalized form.
    pub fn is_locale_label(&self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        if label.chars().any(|c| self.locale_marks.contains(c)) {
            return true;
        }
        let norm = normalize_label(label);
        self.locale_keywords.iter().any(|kw| norm.contains(kw.as_str()))
    }
}

/// Pipeline-wide configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Default TTL for cached series; callers may still pass their own per
    /// read.
    pub cache_ttl: Duration,
    /// Labels the synthetic fallback series is shaped around.
    pub synthetic_labels: Vec<String>,
    pub policy: LabelPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(900),
            synthetic_labels: ["Standard", "Deluxe", "Suite", "Bungalow"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            policy: LabelPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var("CALMA_CACHE_TTL_SECONDS") {
            if let Ok(secs) = raw.parse::<u64>() {
                cfg.cache_ttl = Duration::from_secs(secs);
            }
        }
        cfg
    }
}
