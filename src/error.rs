//! Error types for the solver.
//!
//! Every fallible operation returns `TspResult<T>`. Normal algorithmic
//! outcomes (no crossing found, no improvement) are not errors.

use thiserror::Error;

/// Result type alias for solver operations.
pub type TspResult<T> = Result<T, TspError>;

/// Unified error type for all solver operations.
#[derive(Debug, Error)]
pub enum TspError {
    /// Vertex count outside the domain supported by a solver.
    #[error("the number of vertices must be an integer value in [{min},{max}], got {vertices}")]
    InvalidVertexCount {
        vertices: usize,
        min: usize,
        max: usize,
    },

    /// Unreadable or malformed numeric input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An explicit cost matrix that is not square or not symmetric.
    #[error("invalid cost matrix: {0}")]
    InvalidCostMatrix(String),

    /// The Held-Karp table would exceed the configured memory limit.
    #[error(
        "Held-Karp table for {vertices} vertices needs {required_bytes} bytes, limit is {limit_bytes} bytes"
    )]
    TableTooLarge {
        vertices: usize,
        required_bytes: u128,
        limit_bytes: u128,
    },

    /// A successor entry needed for tour reconstruction was never written.
    #[error("corrupted DP table: no successor recorded for vertex {vertex} and subset {subset:#b}")]
    MissingSuccessor { vertex: usize, subset: u32 },

    /// A plot was requested for an instance built without coordinates.
    #[error("instance has no point coordinates to plot")]
    MissingCoordinates,

    /// I/O failure while writing an artifact or reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON export failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TspError {
    /// True for errors caused by what the user typed rather than by the run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TspError::InvalidVertexCount { .. } | TspError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_count_message() {
        let err = TspError::InvalidVertexCount { vertices: 40, min: 1, max: 32 };
        assert_eq!(
            err.to_string(),
            "the number of vertices must be an integer value in [1,32], got 40"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: TspError = io.into();
        assert!(matches!(err, TspError::Io(_)));
        assert!(!err.is_input_error());
    }
}
