//! Error taxonomy shared by the store, the views and the policy gate
//!
//! Every variant records the operation that failed and the policy mode in
//! force, so the same inputs always reproduce the same message.

use super::types::{EdgeKey, NodeId};
use crate::policy::PolicyMode;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("{op}: null node identifier rejected{} [{mode}]", ItemSuffix(.item))]
    NullIdentifier {
        op: &'static str,
        /// Position in the batch for bulk calls.
        item: Option<usize>,
        mode: PolicyMode,
    },

    #[error("{op}: node {node} is not in the graph [{mode}]")]
    MissingNode {
        op: &'static str,
        node: NodeId,
        mode: PolicyMode,
    },

    #[error("{op}: edge {source_node}-{target}{} is not in the graph [{mode}]", KeySuffix(.key))]
    MissingEdge {
        op: &'static str,
        source_node: NodeId,
        target: NodeId,
        key: Option<EdgeKey>,
        mode: PolicyMode,
    },

    #[error("{op}: malformed edge tuple of length {arity}{}: {reason} [{mode}]", ItemSuffix(.item))]
    Arity {
        op: &'static str,
        arity: usize,
        item: Option<usize>,
        reason: String,
        mode: PolicyMode,
    },

    #[error("{op}: unsupported input: {reason} [{mode}]")]
    UnsupportedInput {
        op: &'static str,
        reason: String,
        mode: PolicyMode,
    },

    #[error("{op}: neither nodes nor edges were supplied [{mode}]")]
    EmptyUpdate { op: &'static str, mode: PolicyMode },

    #[error("{op}: unknown or incompatible feature `{feature}` [{mode}]")]
    UnknownIncompatibleFeature {
        op: &'static str,
        feature: String,
        mode: PolicyMode,
    },
}

/// Fieldless classification of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NullIdentifier,
    MissingNode,
    MissingEdge,
    Arity,
    UnsupportedInput,
    EmptyUpdate,
    UnknownIncompatibleFeature,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NullIdentifier { .. } => ErrorKind::NullIdentifier,
            GraphError::MissingNode { .. } => ErrorKind::MissingNode,
            GraphError::MissingEdge { .. } => ErrorKind::MissingEdge,
            GraphError::Arity { .. } => ErrorKind::Arity,
            GraphError::UnsupportedInput { .. } => ErrorKind::UnsupportedInput,
            GraphError::EmptyUpdate { .. } => ErrorKind::EmptyUpdate,
            GraphError::UnknownIncompatibleFeature { .. } => ErrorKind::UnknownIncompatibleFeature,
        }
    }

    /// Name of the operation that raised the error.
    pub fn operation(&self) -> &'static str {
        match self {
            GraphError::NullIdentifier { op, .. }
            | GraphError::MissingNode { op, .. }
            | GraphError::MissingEdge { op, .. }
            | GraphError::Arity { op, .. }
            | GraphError::UnsupportedInput { op, .. }
            | GraphError::EmptyUpdate { op, .. }
            | GraphError::UnknownIncompatibleFeature { op, .. } => op,
        }
    }

    pub fn mode(&self) -> PolicyMode {
        match self {
            GraphError::NullIdentifier { mode, .. }
            | GraphError::MissingNode { mode, .. }
            | GraphError::MissingEdge { mode, .. }
            | GraphError::Arity { mode, .. }
            | GraphError::UnsupportedInput { mode, .. }
            | GraphError::EmptyUpdate { mode, .. }
            | GraphError::UnknownIncompatibleFeature { mode, .. } => *mode,
        }
    }
}

impl GraphError {
    /// Tag a validation error with the batch position of the offending
    /// item. Other variants already name their input and are returned
    /// unchanged.
    pub fn at_item(self, index: usize) -> Self {
        match self {
            GraphError::NullIdentifier { op, mode, .. } => GraphError::NullIdentifier {
                op,
                item: Some(index),
                mode,
            },
            GraphError::Arity {
                op,
                arity,
                reason,
                mode,
                ..
            } => GraphError::Arity {
                op,
                arity,
                item: Some(index),
                reason,
                mode,
            },
            other => other,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

struct KeySuffix<'a>(&'a Option<EdgeKey>);

impl fmt::Display for KeySuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, " (key {})", key),
            None => Ok(()),
        }
    }
}

struct ItemSuffix<'a>(&'a Option<usize>);

impl fmt::Display for ItemSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, " at item {}", index),
            None => Ok(()),
        }
    }
}
