//! Selectable models.
//!
//! Sessions store the catalog key; the provider sees the pinned model id.
//! Keys outside the catalog are passed through unchanged.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Key used when a caller expresses no preference.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Catalog entry as exposed on `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    pub context: &'static str,
    pub description: &'static str,
}

static CATALOG: Lazy<BTreeMap<&'static str, ModelSpec>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "gpt-4.1-nano",
            ModelSpec {
                id: "gpt-4.1-nano-2025-04-14",
                name: "GPT-4.1 Nano",
                price: "$0.10 input / $0.40 output per 1M tokens",
                context: "1M",
                description: "Cheapest and fastest GPT-4.1 model",
            },
        ),
        (
            "gpt-4.1-mini",
            ModelSpec {
                id: "gpt-4.1-mini-2025-04-14",
                name: "GPT-4.1 Mini",
                price: "$0.40 input / $1.60 output per 1M tokens",
                context: "1M",
                description: "Balanced performance and cost",
            },
        ),
        (
            "gpt-4.1",
            ModelSpec {
                id: "gpt-4.1-2025-04-14",
                name: "GPT-4.1",
                price: "$2.00 input / $8.00 output per 1M tokens",
                context: "1M",
                description: "Full GPT-4.1 model, best quality",
            },
        ),
    ])
});

/// All catalog entries keyed by selection key.
pub fn catalog() -> &'static BTreeMap<&'static str, ModelSpec> {
    &CATALOG
}

/// Provider model id for a stored key.
pub fn resolve(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return resolve(DEFAULT_MODEL);
    }
    CATALOG
        .get(key)
        .map(|spec| spec.id.to_string())
        .unwrap_or_else(|| key.to_string())
}
