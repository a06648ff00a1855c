/// Acceptance strategies validating a match before painting
pub mod acceptance;
/// Patch descriptors with lazy initialization and target discovery
pub mod descriptor;
/// The fill loop binding queue, strategies, and mask updates
pub mod driver;
/// Patch inpainters committing a match onto image representations
pub mod inpainter;
/// Priority strategies ranking the fill front
pub mod priority;
/// Boundary priority queue with lazy invalidation
pub mod queue;
/// Candidate search pipeline over registered sources
pub mod search;

pub use driver::{DriverConfig, FillDriver, FillSummary};
