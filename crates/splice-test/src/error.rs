//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// A fixture could not be built
    #[error("invalid fixture: {0}")]
    Fixture(#[from] splice_core::Error),

    /// One or more comparisons failed
    #[error("{test_name}_reg: {count} comparison(s) failed")]
    Failed { test_name: String, count: usize },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
