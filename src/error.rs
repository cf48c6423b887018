//! Error types for merge-order searches.

use serde::{Deserialize, Serialize};

/// Errors a search can surface.
///
/// "No solution" is an expected outcome, not a fault: it is carried as data
/// inside [`SearchResult`](crate::SearchResult) rather than returned through
/// `Result::Err`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SearchError {
    /// No complete merge sequence stays within the per-merge level cap.
    #[error("no feasible merge sequence: {reason}")]
    NoSolution { reason: String },

    /// The caller cancelled the search between rounds.
    #[error("search cancelled")]
    Cancelled,

    /// The search panicked; converted at the call boundary.
    #[error("unexpected search failure: {message}")]
    Internal { message: String },
}

impl SearchError {
    pub fn no_solution(reason: impl Into<String>) -> Self {
        Self::NoSolution {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
