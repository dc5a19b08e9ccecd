//! Configuration for the SBAC engine.

use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SbacConfig {
    /// When `false`, any resolved principal is allowed; identity is still checked.
    pub strategy_check_enabled: bool,

    /// Upper bound on accepted token length, in bytes.
    pub max_token_length: usize,
}

impl Default for SbacConfig {
    fn default() -> Self {
        Self {
            strategy_check_enabled: true,
            max_token_length: 1024,
        }
    }
}
