//! Strict / hardened policy gate
//!
//! Every mutation and construction entry point of the store opens an
//! [`Admission`] for the request. The admission validates identifiers,
//! builds errors stamped with the operation and mode, and meters the
//! allowlisted recoveries hardened mode may spend on that one request.
//! Anything not on the allowlist, or beyond the budget, fails closed with
//! the same error strict mode raises.

pub mod config;

pub use config::{ConfigError, PolicyConfig, PolicyMode, Recovery, MAX_RECOVERY_BUDGET};

use crate::graph::{EdgeKey, GraphError, GraphResult, NodeId};
use tracing::warn;

/// A recovery applied while admitting one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryRecord {
    pub op: &'static str,
    pub recovery: Recovery,
    pub detail: String,
}

/// Policy gate, constructed from an externally supplied configuration.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn strict() -> Self {
        Self::from_config(PolicyConfig::strict())
    }

    pub fn hardened() -> Self {
        Self::from_config(PolicyConfig::hardened())
    }

    pub fn from_config(config: PolicyConfig) -> Self {
        if config.recovery_budget > MAX_RECOVERY_BUDGET {
            warn!(
                "Recovery budget {} clamped to {}",
                config.recovery_budget, MAX_RECOVERY_BUDGET
            );
        }
        PolicyEngine { config }
    }

    pub fn mode(&self) -> PolicyMode {
        self.config.mode
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Open the gate for one request.
    pub fn admit(&self, op: &'static str) -> Admission<'_> {
        Admission {
            policy: self,
            op,
            spent: 0,
            records: Vec::new(),
        }
    }
}

/// Per-request view of the policy: validation, error construction and the
/// recovery budget.
#[derive(Debug)]
pub struct Admission<'p> {
    policy: &'p PolicyEngine,
    op: &'static str,
    spent: u32,
    records: Vec<RecoveryRecord>,
}

impl<'p> Admission<'p> {
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn mode(&self) -> PolicyMode {
        self.policy.mode()
    }

    /// Reject the null identifier. Identical in both modes.
    pub fn node(&self, id: &NodeId) -> GraphResult<()> {
        if id.is_null() {
            return Err(self.null_identifier());
        }
        Ok(())
    }

    /// Reject a batch containing the null identifier, naming the first
    /// offending position.
    pub fn nodes<'a>(&self, ids: impl IntoIterator<Item = &'a NodeId>) -> GraphResult<()> {
        ids.into_iter()
            .enumerate()
            .try_for_each(|(i, id)| self.node(id).map_err(|err| err.at_item(i)))
    }

    /// Validate a count-like parameter (e.g. a node count for a bulk
    /// constructor). Negative values fail closed in both modes.
    pub fn size_param(&self, name: &str, value: i64) -> GraphResult<usize> {
        usize::try_from(value).map_err(|_| {
            self.unsupported(format!("parameter `{}` must be non-negative, got {}", name, value))
        })
    }

    /// Try to spend one allowlisted recovery on this request.
    ///
    /// Returns `false` when the mode, the allowlist or the budget forbids
    /// it; the caller must then fail closed.
    pub fn recover(&mut self, recovery: Recovery, detail: impl Into<String>) -> bool {
        let config = &self.policy.config;
        if !config.permits(recovery) || self.spent >= config.effective_budget() {
            return false;
        }
        let detail = detail.into();
        warn!("{}: applied recovery {} ({})", self.op, recovery, detail);
        self.spent += 1;
        self.records.push(RecoveryRecord {
            op: self.op,
            recovery,
            detail,
        });
        true
    }

    /// Handle an unrecognized field: quarantine it if allowed, otherwise
    /// fail with `UnknownIncompatibleFeature`.
    pub fn unknown_field(&mut self, field: &str) -> GraphResult<()> {
        if self.recover(Recovery::QuarantineUnknownField, format!("field `{}`", field)) {
            Ok(())
        } else {
            Err(self.incompatible(field))
        }
    }

    pub fn recoveries(&self) -> &[RecoveryRecord] {
        &self.records
    }

    pub fn into_recoveries(self) -> Vec<RecoveryRecord> {
        self.records
    }

    pub fn null_identifier(&self) -> GraphError {
        GraphError::NullIdentifier {
            op: self.op,
            item: None,
            mode: self.mode(),
        }
    }

    pub fn missing_node(&self, node: &NodeId) -> GraphError {
        GraphError::MissingNode {
            op: self.op,
            node: node.clone(),
            mode: self.mode(),
        }
    }

    pub fn missing_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
        key: Option<EdgeKey>,
    ) -> GraphError {
        GraphError::MissingEdge {
            op: self.op,
            source_node: source.clone(),
            target: target.clone(),
            key,
            mode: self.mode(),
        }
    }

    pub fn arity(&self, arity: usize, reason: impl Into<String>) -> GraphError {
        GraphError::Arity {
            op: self.op,
            arity,
            item: None,
            reason: reason.into(),
            mode: self.mode(),
        }
    }

    pub fn unsupported(&self, reason: impl Into<String>) -> GraphError {
        GraphError::UnsupportedInput {
            op: self.op,
            reason: reason.into(),
            mode: self.mode(),
        }
    }

    pub fn empty_update(&self) -> GraphError {
        GraphError::EmptyUpdate {
            op: self.op,
            mode: self.mode(),
        }
    }

    pub fn incompatible(&self, feature: impl Into<String>) -> GraphError {
        GraphError::UnknownIncompatibleFeature {
            op: self.op,
            feature: feature.into(),
            mode: self.mode(),
        }
    }
}
