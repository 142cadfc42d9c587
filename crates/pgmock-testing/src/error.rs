//! Mock verification errors.

use thiserror::Error;

/// Errors reported when verifying a mock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// Some expectations were not called the expected number of times.
    #[error("{} expectation(s) not met: {}", .0.len(), .0.join("; "))]
    UnmetExpectations(Vec<String>),
}
