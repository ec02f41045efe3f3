//! Selector configuration

use serde::Deserialize;

/// Selector configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Seed for a reproducible draw sequence. `None` draws from the
    /// per-thread OS-seeded generator.
    pub seed: Option<u64>,
    /// Health policy applied by `pick` and `pick_all`
    pub ignore_health: bool,
}

impl SelectorConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
