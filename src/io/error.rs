//! Error types for the inpainting engine and its I/O surface
//!
//! Fatal engine conditions carry the vertex coordinates and iteration number
//! where they were detected, so a failed run names the exact region that
//! could not be filled instead of silently producing a partial image.

use std::fmt;
use std::path::PathBuf;

use crate::spatial::grid::Vertex;

/// Main error type for all engine and I/O operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to save the inpainted result to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Mask image doesn't meet engine requirements
    InvalidMask {
        /// Description of what's wrong with the mask
        reason: String,
    },

    /// Image and mask dimensions differ
    DimensionMismatch {
        /// Image dimensions (rows, cols)
        image: (usize, usize),
        /// Mask dimensions (rows, cols)
        mask: (usize, usize),
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// No admissible source patch exists for a target region
    ///
    /// Raised when the search pipeline produces zero candidates, or when the
    /// queue empties while hole pixels remain (a hole region disconnected
    /// from any valid source).
    NoAdmissibleSource {
        /// The target vertex (or first remaining hole) that cannot be filled
        target: Vertex,
        /// Engine iteration when this occurred
        iteration: usize,
    },

    /// Every ranked candidate was rejected and no fallback selection was made
    AcceptanceExhausted {
        /// The target vertex whose candidates were all rejected
        target: Vertex,
        /// Engine iteration when this occurred
        iteration: usize,
        /// Number of candidates that were evaluated
        candidates: usize,
    },

    /// An internal consistency check failed at the point of use
    ///
    /// Continuing after one of these would silently produce incorrect
    /// output, so the run stops instead.
    InvariantViolation {
        /// The violated condition
        detail: &'static str,
        /// Vertex where the violation was detected
        vertex: Vertex,
        /// Engine iteration when this occurred
        iteration: usize,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(f, "Failed to export image to '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidMask { reason } => {
                write!(f, "Invalid mask: {reason}")
            }
            Self::DimensionMismatch { image, mask } => {
                write!(
                    f,
                    "Image is {}x{} but mask is {}x{}",
                    image.0, image.1, mask.0, mask.1
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::NoAdmissibleSource { target, iteration } => {
                write!(
                    f,
                    "No admissible source for target region at ({}, {}) on iteration {iteration}",
                    target[0], target[1]
                )
            }
            Self::AcceptanceExhausted {
                target,
                iteration,
                candidates,
            } => {
                write!(
                    f,
                    "All {candidates} candidates rejected for target ({}, {}) on iteration {iteration}",
                    target[0], target[1]
                )
            }
            Self::InvariantViolation {
                detail,
                vertex,
                iteration,
            } => {
                write!(
                    f,
                    "Invariant violated at ({}, {}) on iteration {iteration}: {detail}",
                    vertex[0], vertex[1]
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for engine results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

impl From<image::ImageError> for AlgorithmError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_conditions_name_coordinates() {
        let err = AlgorithmError::NoAdmissibleSource {
            target: [5, 7],
            iteration: 12,
        };
        let message = err.to_string();
        assert!(message.contains("(5, 7)"));
        assert!(message.contains("iteration 12"));
    }

    #[test]
    fn invariant_violation_names_condition() {
        let err = AlgorithmError::InvariantViolation {
            detail: "proposed source is not valid",
            vertex: [1, 2],
            iteration: 3,
        };
        assert!(err.to_string().contains("proposed source is not valid"));
    }

    #[test]
    fn dimension_mismatch_reports_both_shapes() {
        let err = AlgorithmError::DimensionMismatch {
            image: (10, 20),
            mask: (10, 21),
        };
        assert_eq!(err.to_string(), "Image is 10x20 but mask is 10x21");
    }
}
