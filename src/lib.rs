//! Exemplar-based image completion by priority-driven patch copying
//!
//! The engine fills masked hole regions by repeatedly selecting the
//! highest-priority pixel on the hole boundary, finding the valid patch that
//! best matches its surroundings, and copying that patch over the hole. Every
//! stage of an iteration (priority, descriptors, search, acceptance,
//! painting) is a pluggable strategy behind a trait.

#![forbid(unsafe_code)]

/// Core fill loop, priority queue, and the strategy pipeline
pub mod algorithm;
/// Input/output operations and error handling
pub mod io;
/// Mathematical utilities for image preprocessing
pub mod math;
/// Pixel-domain primitives: vertices, regions, masks, and image stacks
pub mod spatial;

pub use io::error::{AlgorithmError, Result};
