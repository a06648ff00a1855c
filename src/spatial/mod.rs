//! Spatial data structures for the pixel domain
//!
//! This module contains the pixel-level building blocks:
//! - Vertex, region, and neighborhood primitives
//! - Hole/Valid mask classification with boundary detection
//! - Pixel grids and parallel image representations

/// Vertices, clipped regions, and neighborhood iteration
pub mod grid;
/// Hole/Valid classification and boundary detection
pub mod mask;
/// Pixel values, pixel grids, and parallel image representations
pub mod stack;

pub use grid::{Region, Vertex};
pub use mask::Mask;
pub use stack::{ImageStack, PixelGrid};
