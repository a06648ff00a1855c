//! Priority strategies ranking which boundary vertex is filled next
//!
//! Priority is recomputed for a vertex whenever its neighborhood changes; the
//! `update` hook runs once per committed fill so a strategy can refresh any
//! cached field before the next round of `compute` calls. Strategies must
//! tolerate being asked about vertices whose neighborhood just flipped from
//! hole to valid.

use ndarray::Array2;

use crate::spatial::grid::{Vertex, region_around};
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, PixelValue};

/// Scalar priority per boundary vertex plus a post-fill refresh hook
pub trait PriorityStrategy<P: PixelValue> {
    /// Priority of a boundary vertex from current image/mask state
    fn compute(&self, images: &ImageStack<P>, mask: &Mask, v: Vertex) -> f64;

    /// Refresh cached state after a fill committed at `target` painted `filled`
    fn update(&mut self, images: &ImageStack<P>, mask: &Mask, target: Vertex, filled: &[Vertex]);
}

/// Constant priority: boundary vertices fill in discovery order (onion peel)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantPriority;

impl<P: PixelValue> PriorityStrategy<P> for ConstantPriority {
    fn compute(&self, _images: &ImageStack<P>, _mask: &Mask, _v: Vertex) -> f64 {
        0.0
    }

    fn update(&mut self, _images: &ImageStack<P>, _mask: &Mask, _target: Vertex, _filled: &[Vertex]) {
    }
}

/// Confidence-driven priority
///
/// Each pixel carries a confidence in `[0, 1]`: valid pixels start at 1,
/// holes at 0. A boundary vertex's priority is the mean confidence over its
/// patch (normalized by full patch area, so border patches score lower).
/// Pixels filled by a committed patch inherit the confidence the target patch
/// had at commit time, which decays priorities toward the hole center and
/// fills well-supported frontier pixels first.
#[derive(Debug, Clone)]
pub struct ConfidencePriority {
    confidence: Array2<f64>,
    half_width: usize,
}

impl ConfidencePriority {
    /// Initialize confidence from the mask: valid pixels 1, holes 0
    pub fn new(mask: &Mask, half_width: usize) -> Self {
        let confidence =
            Array2::from_shape_fn(mask.dims(), |(r, c)| f64::from(u8::from(mask.is_valid([r, c]))));
        Self {
            confidence,
            half_width,
        }
    }

    /// Confidence of a single pixel
    pub fn confidence_at(&self, v: Vertex) -> f64 {
        self.confidence.get((v[0], v[1])).copied().unwrap_or(0.0)
    }

    fn patch_confidence(&self, mask: &Mask, v: Vertex) -> f64 {
        let region = region_around(v, self.half_width, mask.dims());
        let nominal_area = (2 * self.half_width + 1).pow(2);
        if nominal_area == 0 {
            return 0.0;
        }

        let sum: f64 = region.iter().map(|n| self.confidence_at(n)).sum();
        sum / nominal_area as f64
    }
}

impl<P: PixelValue> PriorityStrategy<P> for ConfidencePriority {
    fn compute(&self, _images: &ImageStack<P>, mask: &Mask, v: Vertex) -> f64 {
        self.patch_confidence(mask, v)
    }

    fn update(&mut self, _images: &ImageStack<P>, mask: &Mask, target: Vertex, filled: &[Vertex]) {
        let inherited = self.patch_confidence(mask, target);
        for v in filled {
            if let Some(slot) = self.confidence.get_mut((v[0], v[1])) {
                *slot = inherited;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::mask::PixelState;
    use crate::spatial::stack::PixelGrid;

    fn hole_block_mask() -> Mask {
        // 7x7 with a 3x3 hole block centered at [3, 3]
        Mask::from_fn((7, 7), |v| {
            if (2..=4).contains(&v[0]) && (2..=4).contains(&v[1]) {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        })
    }

    fn stack() -> ImageStack<u8> {
        ImageStack::new(PixelGrid::from_elem((7, 7), 0))
    }

    #[test]
    fn corner_boundary_outranks_edge_center() {
        let mask = hole_block_mask();
        let priority = ConfidencePriority::new(&mask, 1);
        let images = stack();

        // The hole corner sees 5 valid pixels in its 3x3 patch, the edge
        // center only 3.
        let corner = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [2, 2]);
        let edge = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [2, 3]);
        assert!(corner > edge);
    }

    #[test]
    fn border_clipped_patch_scores_lower() {
        let mask = Mask::from_fn((7, 7), |v| {
            if v[0] == 0 || v == [3, 3] {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        });
        let priority = ConfidencePriority::new(&mask, 1);
        let images = stack();

        // Both see 5 valid neighbors, but the border patch is clipped to 6
        // pixels while normalization stays at 9.
        let border = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [0, 3]);
        let interior = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [3, 3]);
        assert!(border < interior);
        assert!((interior - 8.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn filled_pixels_inherit_target_confidence() {
        let mut mask = hole_block_mask();
        let mut priority = ConfidencePriority::new(&mask, 1);
        let images = stack();

        let target = [2, 2];
        let filled = vec![[2, 2], [2, 3], [3, 2], [3, 3]];
        for v in &filled {
            mask.mark_valid(*v);
        }
        PriorityStrategy::<u8>::update(&mut priority, &images, &mask, target, &filled);

        let inherited = priority.confidence_at([3, 3]);
        assert!(inherited > 0.0 && inherited < 1.0);
        assert_eq!(priority.confidence_at([2, 3]), inherited);
        // Untouched hole pixels keep zero confidence
        assert_eq!(priority.confidence_at([4, 4]), 0.0);
    }

    #[test]
    fn constant_priority_is_flat() {
        let mask = hole_block_mask();
        let images = stack();
        let priority = ConstantPriority;
        let a = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [2, 2]);
        let b = PriorityStrategy::<u8>::compute(&priority, &images, &mask, [4, 4]);
        assert_eq!(a, b);
    }
}
