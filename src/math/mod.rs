//! Numeric utilities supporting the fill pipeline

/// Mask-aware blurring for auxiliary representations
pub mod blur;
