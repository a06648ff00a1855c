//! Pixel value abstraction, pixel grids, and parallel image representations
//!
//! The fill engine paints every registered representation of the image from
//! the same source/target vertex pair: typically the original image plus one
//! or more mask-aware blurred copies whose smoother gradients make patch
//! comparisons less noisy. All representations share dimensions and the mask;
//! each keeps its own pixel buffer.

use ndarray::Array2;
use num_traits::ToPrimitive;

use crate::spatial::grid::{Dimensions, Vertex};

/// A pixel value with a fixed channel count convertible to `f64`
///
/// Implemented for single-channel (`u8`, `f32`) and RGB (`[u8; 3]`,
/// `[f32; 3]`) pixels. Channel access drives both patch distance computation
/// and blur averaging.
pub trait PixelValue: Copy + PartialEq + Send + Sync + 'static {
    /// Number of channels in the pixel
    const CHANNELS: usize;

    /// Read one channel as `f64`; out-of-range channels read as zero
    fn channel(&self, index: usize) -> f64;

    /// Rebuild a pixel from per-channel values
    fn from_channels(channels: &[f64]) -> Self;

    /// Sum of squared per-channel differences
    fn squared_distance(a: Self, b: Self) -> f64 {
        let mut sum = 0.0;
        for i in 0..Self::CHANNELS {
            let d = a.channel(i) - b.channel(i);
            sum += d * d;
        }
        sum
    }
}

impl PixelValue for u8 {
    const CHANNELS: usize = 1;

    fn channel(&self, index: usize) -> f64 {
        if index == 0 {
            self.to_f64().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    fn from_channels(channels: &[f64]) -> Self {
        channels
            .first()
            .map_or(0, |c| c.round().clamp(0.0, 255.0) as Self)
    }
}

impl PixelValue for f32 {
    const CHANNELS: usize = 1;

    fn channel(&self, index: usize) -> f64 {
        if index == 0 {
            self.to_f64().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    fn from_channels(channels: &[f64]) -> Self {
        channels.first().map_or(0.0, |c| *c as Self)
    }
}

impl PixelValue for [u8; 3] {
    const CHANNELS: usize = 3;

    fn channel(&self, index: usize) -> f64 {
        self.get(index).and_then(|c| c.to_f64()).unwrap_or(0.0)
    }

    fn from_channels(channels: &[f64]) -> Self {
        let mut out = [0; 3];
        for (slot, value) in out.iter_mut().zip(channels.iter()) {
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

impl PixelValue for [f32; 3] {
    const CHANNELS: usize = 3;

    fn channel(&self, index: usize) -> f64 {
        self.get(index).and_then(|c| c.to_f64()).unwrap_or(0.0)
    }

    fn from_channels(channels: &[f64]) -> Self {
        let mut out = [0.0; 3];
        for (slot, value) in out.iter_mut().zip(channels.iter()) {
            *slot = *value as f32;
        }
        out
    }
}

/// A dense 2D buffer of pixels
#[derive(Debug, Clone)]
pub struct PixelGrid<P: PixelValue> {
    data: Array2<P>,
}

impl<P: PixelValue> PixelGrid<P> {
    /// Create a grid filled with a single value
    pub fn from_elem(dims: Dimensions, value: P) -> Self {
        Self {
            data: Array2::from_elem(dims, value),
        }
    }

    /// Create a grid by evaluating a function at every vertex
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(Vertex) -> P) -> Self {
        Self {
            data: Array2::from_shape_fn(dims, |(r, c)| f([r, c])),
        }
    }

    /// Grid dimensions as `(rows, cols)`
    pub fn dims(&self) -> Dimensions {
        self.data.dim()
    }

    /// Read the pixel at a vertex
    pub fn get(&self, v: Vertex) -> Option<P> {
        self.data.get((v[0], v[1])).copied()
    }

    /// Write the pixel at a vertex; out-of-bounds writes are ignored
    pub fn put(&mut self, v: Vertex, value: P) {
        if let Some(slot) = self.data.get_mut((v[0], v[1])) {
            *slot = value;
        }
    }

    /// Iterate all pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = P> + '_ {
        self.data.iter().copied()
    }
}

/// Identifies one representation within an [`ImageStack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerId {
    /// The original image, persisted at the end of the run
    Primary,
    /// An auxiliary representation by index (e.g. a blurred copy)
    Auxiliary(usize),
}

/// The primary image plus auxiliary representations painted in parallel
#[derive(Debug, Clone)]
pub struct ImageStack<P: PixelValue> {
    primary: PixelGrid<P>,
    auxiliary: Vec<PixelGrid<P>>,
}

impl<P: PixelValue> ImageStack<P> {
    /// Create a stack holding only the primary representation
    pub const fn new(primary: PixelGrid<P>) -> Self {
        Self {
            primary,
            auxiliary: Vec::new(),
        }
    }

    /// Register an auxiliary representation; dimensions must match the primary
    ///
    /// Returns the new layer's id, or `None` if the dimensions differ.
    pub fn push_auxiliary(&mut self, layer: PixelGrid<P>) -> Option<LayerId> {
        if layer.dims() != self.primary.dims() {
            return None;
        }
        self.auxiliary.push(layer);
        Some(LayerId::Auxiliary(self.auxiliary.len() - 1))
    }

    /// Shared dimensions of every representation
    pub fn dims(&self) -> Dimensions {
        self.primary.dims()
    }

    /// Number of representations including the primary
    pub fn layer_count(&self) -> usize {
        1 + self.auxiliary.len()
    }

    /// Enumerate all layer ids, primary first
    pub fn layer_ids(&self) -> Vec<LayerId> {
        let mut ids = vec![LayerId::Primary];
        ids.extend((0..self.auxiliary.len()).map(LayerId::Auxiliary));
        ids
    }

    /// Borrow a representation by id
    pub fn layer(&self, id: LayerId) -> Option<&PixelGrid<P>> {
        match id {
            LayerId::Primary => Some(&self.primary),
            LayerId::Auxiliary(i) => self.auxiliary.get(i),
        }
    }

    /// Mutably borrow a representation by id
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut PixelGrid<P>> {
        match id {
            LayerId::Primary => Some(&mut self.primary),
            LayerId::Auxiliary(i) => self.auxiliary.get_mut(i),
        }
    }

    /// Borrow the primary representation
    pub const fn primary(&self) -> &PixelGrid<P> {
        &self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_channel_roundtrip() {
        let px: [u8; 3] = [10, 20, 250];
        assert_eq!(px.channel(0), 10.0);
        assert_eq!(px.channel(2), 250.0);
        assert_eq!(px.channel(3), 0.0);
        assert_eq!(<[u8; 3]>::from_channels(&[10.0, 20.0, 250.0]), px);
    }

    #[test]
    fn from_channels_clamps_and_rounds() {
        assert_eq!(u8::from_channels(&[300.0]), 255);
        assert_eq!(u8::from_channels(&[-4.0]), 0);
        assert_eq!(u8::from_channels(&[9.6]), 10);
    }

    #[test]
    fn squared_distance_sums_channels() {
        let a: [u8; 3] = [0, 0, 0];
        let b: [u8; 3] = [1, 2, 3];
        assert_eq!(<[u8; 3]>::squared_distance(a, b), 14.0);
    }

    #[test]
    fn grid_reads_and_writes() {
        let mut grid = PixelGrid::from_elem((3, 3), 0_u8);
        grid.put([1, 2], 7);
        assert_eq!(grid.get([1, 2]), Some(7));
        assert_eq!(grid.get([3, 0]), None);

        // Out-of-bounds write is ignored
        grid.put([9, 9], 1);
        assert_eq!(grid.pixels().filter(|p| *p != 0).count(), 1);
    }

    #[test]
    fn stack_rejects_mismatched_auxiliary() {
        let mut stack = ImageStack::new(PixelGrid::from_elem((4, 4), 0_u8));
        assert!(stack.push_auxiliary(PixelGrid::from_elem((3, 4), 0)).is_none());
        assert_eq!(
            stack.push_auxiliary(PixelGrid::from_elem((4, 4), 1)),
            Some(LayerId::Auxiliary(0))
        );
        assert_eq!(stack.layer_count(), 2);
        assert_eq!(stack.layer_ids(), vec![LayerId::Primary, LayerId::Auxiliary(0)]);
    }
}
