//! Policy configuration
//!
//! The configuration is a plain value built by the caller (or parsed from
//! YAML / JSON text the caller supplies) and handed to
//! [`PolicyEngine::from_config`](super::PolicyEngine::from_config). Nothing
//! here reads the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound on recoveries a single request may spend.
pub const MAX_RECOVERY_BUDGET: u32 = 1;

/// Compatibility mode of the policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Zero repair: every malformed input fails closed.
    #[default]
    Strict,
    /// Allowlisted, budgeted recoveries; everything else fails closed.
    Hardened,
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyMode::Strict => write!(f, "strict"),
            PolicyMode::Hardened => write!(f, "hardened"),
        }
    }
}

/// The enumerated recoveries hardened mode may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Set one unrecognized document field aside instead of failing.
    QuarantineUnknownField,
    /// Rewrite one `(u, v, attrs, key)` tuple as `(u, v, key, attrs)`.
    CanonicalizeTupleOrder,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovery::QuarantineUnknownField => write!(f, "quarantine_unknown_field"),
            Recovery::CanonicalizeTupleOrder => write!(f, "canonicalize_tuple_order"),
        }
    }
}

/// Errors raised while parsing policy configuration text.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid YAML policy configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON policy configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Policy configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub mode: PolicyMode,
    /// Recoveries hardened mode may apply. Ignored in strict mode.
    pub allowlist: Vec<Recovery>,
    /// Recoveries allowed per request; values above
    /// [`MAX_RECOVERY_BUDGET`] are clamped.
    pub recovery_budget: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Strict,
            allowlist: vec![Recovery::QuarantineUnknownField, Recovery::CanonicalizeTupleOrder],
            recovery_budget: MAX_RECOVERY_BUDGET,
        }
    }
}

impl PolicyConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn hardened() -> Self {
        Self {
            mode: PolicyMode::Hardened,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Budget actually enforced per request.
    pub fn effective_budget(&self) -> u32 {
        self.recovery_budget.min(MAX_RECOVERY_BUDGET)
    }

    /// Whether `recovery` may be applied at all under this configuration.
    pub fn permits(&self, recovery: Recovery) -> bool {
        self.mode == PolicyMode::Hardened && self.allowlist.contains(&recovery)
    }
}
