//! Per-vertex patch descriptors and the strategy that maintains them
//!
//! A descriptor records the clipped patch region around its vertex and
//! whether that patch is usable as a copy source (fully inside the image and
//! fully valid). Descriptors live in a dense map sized to the image and start
//! uninitialized; they are built lazily the first time a vertex is reachable
//! as a boundary target or a source candidate, and rebuilt after nearby
//! fills.

use ndarray::Array2;

use crate::spatial::grid::{Dimensions, Region, Vertex, is_unclipped, region_around};
use crate::spatial::mask::Mask;

/// Lifecycle state of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptorStatus {
    /// Never built; the vertex has not been reachable yet
    #[default]
    Uninitialized,
    /// Built from current image/mask state
    Initialized,
    /// Currently selected as an inpainting target (bookkeeping only)
    TargetCandidate,
}

/// Feature record for one vertex: its patch region and source eligibility
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchDescriptor {
    /// Lifecycle state
    pub status: DescriptorStatus,
    /// Patch center
    pub center: Vertex,
    /// Clipped patch footprint
    pub region: Region,
    /// Patch half-width used to build the region
    pub half_width: usize,
    /// Whether the patch is unclipped and entirely valid, i.e. usable as a source
    pub source_eligible: bool,
}

/// Strategy that builds and refreshes patch descriptors
///
/// `initialize` is idempotent: rebuilding a descriptor over an
/// already-filled neighborhood recomputes the same region and refreshes
/// eligibility without touching pixel data. `discover` only records that a
/// vertex became the current target.
pub trait DescriptorStrategy {
    /// Build or refresh the descriptor for a vertex from current mask state
    fn initialize(&mut self, mask: &Mask, v: Vertex);

    /// Mark a vertex as the current inpainting target
    fn discover(&mut self, v: Vertex);

    /// Borrow a vertex's descriptor if it has been built
    fn descriptor(&self, v: Vertex) -> Option<&PatchDescriptor>;

    /// Lifecycle state of a vertex's descriptor
    fn status(&self, v: Vertex) -> DescriptorStatus {
        self.descriptor(v).map_or(DescriptorStatus::Uninitialized, |d| d.status)
    }
}

/// Dense patch-descriptor map over the image rectangle
#[derive(Debug)]
pub struct PatchDescriptorStrategy {
    descriptors: Array2<PatchDescriptor>,
    half_width: usize,
    dims: Dimensions,
}

impl PatchDescriptorStrategy {
    /// Create an all-uninitialized map for the given image dimensions
    pub fn new(dims: Dimensions, half_width: usize) -> Self {
        Self {
            descriptors: Array2::from_elem(dims, PatchDescriptor::default()),
            half_width,
            dims,
        }
    }

    /// Patch half-width used for every descriptor
    pub const fn half_width(&self) -> usize {
        self.half_width
    }
}

impl DescriptorStrategy for PatchDescriptorStrategy {
    fn initialize(&mut self, mask: &Mask, v: Vertex) {
        let region = region_around(v, self.half_width, self.dims);
        let source_eligible =
            is_unclipped(&region, self.half_width) && mask.region_fully_valid(&region);

        if let Some(descriptor) = self.descriptors.get_mut((v[0], v[1])) {
            descriptor.status = DescriptorStatus::Initialized;
            descriptor.center = v;
            descriptor.region = region;
            descriptor.half_width = self.half_width;
            descriptor.source_eligible = source_eligible;
        }
    }

    fn discover(&mut self, v: Vertex) {
        if let Some(descriptor) = self.descriptors.get_mut((v[0], v[1])) {
            if descriptor.status == DescriptorStatus::Initialized {
                descriptor.status = DescriptorStatus::TargetCandidate;
            }
        }
    }

    fn descriptor(&self, v: Vertex) -> Option<&PatchDescriptor> {
        self.descriptors
            .get((v[0], v[1]))
            .filter(|d| d.status != DescriptorStatus::Uninitialized)
    }
}
