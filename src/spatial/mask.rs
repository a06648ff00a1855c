//! Hole/Valid pixel classification with region-scoped boundary detection
//!
//! The mask is the single source of truth for which pixels still need to be
//! filled. Every pixel is exactly one of [`PixelState::Hole`] or
//! [`PixelState::Valid`], and transitions are one-way: once marked valid a
//! pixel never reverts. The hole count is maintained incrementally so the
//! fill loop can report progress without rescanning.

use ndarray::Array2;

use crate::spatial::grid::{Dimensions, Region, Vertex, neighbors8};

/// Per-pixel classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelState {
    /// Pixel awaits filling; never usable as a source
    Hole,
    /// Pixel carries usable data
    Valid,
}

/// Dense Hole/Valid classification over the image rectangle
#[derive(Debug, Clone)]
pub struct Mask {
    states: Array2<PixelState>,
    holes: usize,
}

impl Mask {
    /// Create an all-valid mask
    pub fn filled(dims: Dimensions) -> Self {
        Self {
            states: Array2::from_elem(dims, PixelState::Valid),
            holes: 0,
        }
    }

    /// Build a mask by classifying each vertex with the supplied function
    pub fn from_fn(dims: Dimensions, mut classify: impl FnMut(Vertex) -> PixelState) -> Self {
        let states = Array2::from_shape_fn(dims, |(r, c)| classify([r, c]));
        let holes = states.iter().filter(|s| **s == PixelState::Hole).count();
        Self { states, holes }
    }

    /// Grid dimensions as `(rows, cols)`
    pub fn dims(&self) -> Dimensions {
        self.states.dim()
    }

    /// Classify a vertex; out-of-bounds vertices read as valid
    pub fn state(&self, v: Vertex) -> PixelState {
        self.states
            .get((v[0], v[1]))
            .copied()
            .unwrap_or(PixelState::Valid)
    }

    /// Whether the vertex is a hole
    pub fn is_hole(&self, v: Vertex) -> bool {
        self.state(v) == PixelState::Hole
    }

    /// Whether the vertex carries valid data
    pub fn is_valid(&self, v: Vertex) -> bool {
        self.state(v) == PixelState::Valid
    }

    /// Punch a hole at a vertex (setup only; the fill loop never re-opens holes)
    pub fn set_hole(&mut self, v: Vertex) {
        if let Some(state) = self.states.get_mut((v[0], v[1])) {
            if *state == PixelState::Valid {
                *state = PixelState::Hole;
                self.holes += 1;
            }
        }
    }

    /// Mark a vertex as valid after it has been painted
    pub fn mark_valid(&mut self, v: Vertex) {
        if let Some(state) = self.states.get_mut((v[0], v[1])) {
            if *state == PixelState::Hole {
                *state = PixelState::Valid;
                self.holes -= 1;
            }
        }
    }

    /// Number of hole pixels remaining
    pub const fn hole_count(&self) -> usize {
        self.holes
    }

    /// Whether any 8-neighbor of the vertex is a hole
    pub fn has_hole_neighbor(&self, v: Vertex) -> bool {
        neighbors8(v, self.dims()).any(|n| self.is_hole(n))
    }

    /// Whether any 8-neighbor of the vertex is valid
    pub fn has_valid_neighbor(&self, v: Vertex) -> bool {
        neighbors8(v, self.dims()).any(|n| self.is_valid(n))
    }

    /// Whether the vertex is on the fill frontier: a hole with a valid neighbor
    pub fn is_boundary(&self, v: Vertex) -> bool {
        self.is_hole(v) && self.has_valid_neighbor(v)
    }

    /// Enumerate boundary vertices within a region, row-major
    pub fn boundary_in_region(&self, region: Region) -> Vec<Vertex> {
        region.iter().filter(|v| self.is_boundary(*v)).collect()
    }

    /// Whether every pixel of the region is valid
    pub fn region_fully_valid(&self, region: &Region) -> bool {
        region.iter().all(|v| self.is_valid(v))
    }
}
