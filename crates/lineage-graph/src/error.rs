//! Error type shared by graph construction, node collections, and sorting.

use lineage_core::error::ErrorCode;

use crate::graph::GraphId;

/// Errors raised by the graph engine.
///
/// Identifiers are carried in their rendered (`Display`) form so the error
/// type does not depend on the seed type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two seeds in one batch share an identifier.
    #[error("duplicate id '{id}' in batch")]
    DuplicateId { id: String },

    /// A parent identifier is absent from the batch and pruning is off.
    #[error("'{node}' names parent '{parent}', which is not in the batch")]
    MissingParent { node: String, parent: String },

    /// Topological sort finished with nodes still linked.
    ///
    /// `residual` lists every node left over (sorted); `components` lists
    /// the strongly connected components among them that form cycles.
    #[error("cycle detected: {} node(s) still linked after sort", residual.len())]
    CycleDetected {
        residual: Vec<String>,
        components: Vec<Vec<String>>,
    },

    /// A node handle from one graph was used against another graph.
    #[error("node belongs to graph {found}, but this collection is bound to graph {expected}")]
    OwnerMismatch { expected: GraphId, found: GraphId },

    /// Identifier is not a node of the graph.
    #[error("'{id}' is not in the graph")]
    NodeNotFound { id: String },

    /// Node exists but the collection holds no value for it.
    #[error("no value stored for '{id}'")]
    KeyNotFound { id: String },
}

impl GraphError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::MissingParent { .. } => ErrorCode::MissingParent,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::OwnerMismatch { .. } => ErrorCode::OwnerMismatch,
            Self::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            Self::KeyNotFound { .. } => ErrorCode::KeyNotFound,
        }
    }

    pub(crate) fn not_found(id: &impl ToString) -> Self {
        Self::NodeNotFound { id: id.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        let err = GraphError::MissingParent {
            node: "c".into(),
            parent: "x".into(),
        };
        assert_eq!(err.code(), ErrorCode::MissingParent);
        assert_eq!(err.to_string(), "'c' names parent 'x', which is not in the batch");

        let cycle = GraphError::CycleDetected {
            residual: vec!["a".into(), "b".into()],
            components: vec![vec!["a".into(), "b".into()]],
        };
        assert_eq!(cycle.code().code(), "E4001");
        assert_eq!(cycle.to_string(), "cycle detected: 2 node(s) still linked after sort");
    }
}
