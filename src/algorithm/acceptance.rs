//! Acceptance strategies validating a proposed match before painting
//!
//! Acceptance runs after a candidate is chosen and before any pixel is
//! written; it only reads image and mask state. A rejection sends the driver
//! to the next-ranked candidate, so a strategy that never rejects is a valid
//! (and the default) policy.

use crate::algorithm::descriptor::PatchDescriptor;
use crate::spatial::grid::{Vertex, neighbors8};
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, LayerId, PixelValue};

/// Validates a proposed (target, source) match
pub trait AcceptanceStrategy<P: PixelValue> {
    /// Whether the match may be painted; must not mutate any state
    fn accept(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        target: &PatchDescriptor,
        source: &PatchDescriptor,
    ) -> bool;
}

/// Pass-through acceptance that never rejects
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAccept;

impl<P: PixelValue> AcceptanceStrategy<P> for AlwaysAccept {
    fn accept(
        &self,
        _images: &ImageStack<P>,
        _mask: &Mask,
        _target: &PatchDescriptor,
        _source: &PatchDescriptor,
    ) -> bool {
        true
    }
}

/// Boundary-energy acceptance
///
/// For each boundary pixel inside the target footprint, compares the mean
/// pixel value of its hole-side neighbors against the mean of its valid-side
/// neighbors, and averages the per-channel distance of those means over all
/// boundary pixels. Matches whose energy exceeds the threshold are rejected.
/// A footprint with no boundary pixels (cannot happen for a live target, but
/// tolerated) is accepted.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryEnergyAcceptance {
    /// Representation the energy is computed on
    pub layer: LayerId,
    /// Maximum admissible energy
    pub max_energy: f64,
}

impl BoundaryEnergyAcceptance {
    /// Create an acceptance test on the primary representation
    pub const fn new(max_energy: f64) -> Self {
        Self {
            layer: LayerId::Primary,
            max_energy,
        }
    }

    fn neighbor_mean<P: PixelValue>(
        layer: &crate::spatial::stack::PixelGrid<P>,
        mask: &Mask,
        v: Vertex,
        want_hole: bool,
    ) -> Option<Vec<f64>> {
        let mut sums = vec![0.0; P::CHANNELS];
        let mut count = 0_usize;

        for n in neighbors8(v, mask.dims()) {
            if mask.is_hole(n) != want_hole {
                continue;
            }
            let Some(px) = layer.get(n) else { continue };
            for (i, sum) in sums.iter_mut().enumerate() {
                *sum += px.channel(i);
            }
            count += 1;
        }

        (count > 0).then(|| {
            for sum in &mut sums {
                *sum /= count as f64;
            }
            sums
        })
    }

    /// Average boundary energy over the target footprint, if measurable
    pub fn energy<P: PixelValue>(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        target: &PatchDescriptor,
    ) -> Option<f64> {
        let layer = images.layer(self.layer)?;
        let boundary = mask.boundary_in_region(target.region);
        if boundary.is_empty() {
            return None;
        }

        let mut total = 0.0;
        let mut measured = 0_usize;
        for v in boundary {
            let hole_mean = Self::neighbor_mean(layer, mask, v, true);
            let valid_mean = Self::neighbor_mean(layer, mask, v, false);
            let (Some(hole_mean), Some(valid_mean)) = (hole_mean, valid_mean) else {
                continue;
            };

            let mut squared = 0.0;
            for (h, w) in hole_mean.iter().zip(valid_mean.iter()) {
                let d = h - w;
                squared += d * d;
            }
            total += squared.sqrt();
            measured += 1;
        }

        (measured > 0).then(|| total / measured as f64)
    }
}

impl<P: PixelValue> AcceptanceStrategy<P> for BoundaryEnergyAcceptance {
    fn accept(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        target: &PatchDescriptor,
        _source: &PatchDescriptor,
    ) -> bool {
        self.energy(images, mask, target)
            .is_none_or(|energy| energy <= self.max_energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::descriptor::{DescriptorStrategy, PatchDescriptorStrategy};
    use crate::spatial::mask::PixelState;
    use crate::spatial::stack::PixelGrid;

    fn fixture(hole_value: u8, valid_value: u8) -> (ImageStack<u8>, Mask, PatchDescriptor) {
        // Left half hole, right half valid; boundary runs down column 3
        let images = ImageStack::new(PixelGrid::from_fn((7, 7), move |v| {
            if v[1] < 3 { hole_value } else { valid_value }
        }));
        let mask = Mask::from_fn((7, 7), |v| {
            if v[1] < 3 {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        });
        let mut descriptors = PatchDescriptorStrategy::new((7, 7), 1);
        descriptors.initialize(&mask, [3, 2]);
        let target = descriptors.descriptor([3, 2]).copied().unwrap_or_default();
        (images, mask, target)
    }

    #[test]
    fn always_accept_never_rejects() {
        let (images, mask, target) = fixture(0, 255);
        let strategy = AlwaysAccept;
        assert!(AcceptanceStrategy::<u8>::accept(&strategy, &images, &mask, &target, &target));
    }

    #[test]
    fn smooth_seam_is_accepted() {
        let (images, mask, target) = fixture(100, 100);
        let strategy = BoundaryEnergyAcceptance::new(1.0);
        assert!(AcceptanceStrategy::<u8>::accept(&strategy, &images, &mask, &target, &target));
    }

    #[test]
    fn harsh_seam_is_rejected() {
        let (images, mask, target) = fixture(0, 255);
        let strategy = BoundaryEnergyAcceptance::new(10.0);
        let energy = strategy.energy(&images, &mask, &target).unwrap_or(0.0);
        assert!(energy > 10.0);
        assert!(!AcceptanceStrategy::<u8>::accept(&strategy, &images, &mask, &target, &target));
    }

    #[test]
    fn footprint_without_boundary_is_accepted() {
        let (images, _, target) = fixture(0, 255);
        let all_valid = Mask::filled((7, 7));
        let strategy = BoundaryEnergyAcceptance::new(0.0);
        assert!(strategy.energy(&images, &all_valid, &target).is_none());
        assert!(AcceptanceStrategy::<u8>::accept(
            &strategy, &images, &all_valid, &target, &target
        ));
    }
}
