//! Nearest-neighbor search pipeline: candidate generation, re-ranking, selection
//!
//! The pipeline is three composable stages. Stage A scans the registered
//! source set and keeps the K descriptors closest to the target under a
//! primary distance functor. Stage B optionally reorders those K under a
//! secondary functor, stably, so exact ties keep stage A order. Stage C picks
//! one candidate; the shipped selector takes the top entry, and the driver
//! escalates to a manual selector only when acceptance exhausts the list.

use crate::algorithm::descriptor::{DescriptorStrategy, PatchDescriptor};
use crate::spatial::grid::Vertex;
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, LayerId, PixelValue};

/// A proposed source for the current target, with its distance score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Source vertex
    pub source: Vertex,
    /// Distance score under the stage that last ranked it (lower is better)
    pub score: f64,
}

/// Distance functor between a target descriptor and a source descriptor
pub trait PatchDifference<P: PixelValue> {
    /// Compare two descriptors over current image/mask state; lower is closer
    fn difference(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        target: &PatchDescriptor,
        source: &PatchDescriptor,
    ) -> f64;
}

/// Masked sum-of-squared-differences between patches
///
/// Only offsets where the target pixel is valid are compared; the target
/// patch may be clipped at the image border, in which case out-of-bounds
/// offsets are skipped. The result is normalized by the number of compared
/// pixels so clipped patches compete fairly with full ones.
#[derive(Debug, Clone, Copy)]
pub struct SumSquaredPatchDifference {
    /// Representation the comparison reads from
    pub layer: LayerId,
}

impl SumSquaredPatchDifference {
    /// Compare on the primary representation
    pub const fn on_primary() -> Self {
        Self {
            layer: LayerId::Primary,
        }
    }
}

impl<P: PixelValue> PatchDifference<P> for SumSquaredPatchDifference {
    fn difference(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        target: &PatchDescriptor,
        source: &PatchDescriptor,
    ) -> f64 {
        let Some(layer) = images.layer(self.layer) else {
            return f64::INFINITY;
        };

        let radius = target.half_width as i64;
        let mut sum = 0.0;
        let mut compared = 0_usize;

        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let tr = target.center[0] as i64 + dr;
                let tc = target.center[1] as i64 + dc;
                if tr < 0 || tc < 0 {
                    continue;
                }
                let tv = [tr as usize, tc as usize];
                if !target.region.contains(tv) || !mask.is_valid(tv) {
                    continue;
                }

                let sr = source.center[0] as i64 + dr;
                let sc = source.center[1] as i64 + dc;
                if sr < 0 || sc < 0 {
                    continue;
                }
                let sv = [sr as usize, sc as usize];

                let (Some(tp), Some(sp)) = (layer.get(tv), layer.get(sv)) else {
                    continue;
                };
                sum += P::squared_distance(tp, sp);
                compared += 1;
            }
        }

        if compared == 0 {
            // No valid target pixel to compare: every source is equally good,
            // and enumeration order decides.
            0.0
        } else {
            sum / compared as f64
        }
    }
}

/// Stage C: choose one candidate from the ranked list
pub trait BestSelector {
    /// Index of the preferred candidate, or `None` to defer
    fn select(&self, ranked: &[Candidate]) -> Option<usize>;
}

/// Deterministically takes the top-ranked candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstBest;

impl BestSelector for FirstBest {
    fn select(&self, ranked: &[Candidate]) -> Option<usize> {
        ranked.first().map(|_| 0)
    }
}

/// External decision source consulted when automated acceptance exhausts
/// every ranked candidate
pub trait ManualSelector {
    /// Choose a source for the target, or signal no-selection
    fn choose(&mut self, target: Vertex, ranked: &[Candidate]) -> Option<Vertex>;
}

/// Composable nearest-neighbor search over the registered source set
pub struct SearchPipeline<P: PixelValue> {
    k: usize,
    primary: Box<dyn PatchDifference<P>>,
    rerank: Option<Box<dyn PatchDifference<P>>>,
}

impl<P: PixelValue> SearchPipeline<P> {
    /// Create a pipeline keeping the top `k` candidates under the primary functor
    pub fn new(k: usize, primary: Box<dyn PatchDifference<P>>) -> Self {
        Self {
            k: k.max(1),
            primary,
            rerank: None,
        }
    }

    /// Add a stage B re-ranking functor
    #[must_use]
    pub fn with_rerank(mut self, rerank: Box<dyn PatchDifference<P>>) -> Self {
        self.rerank = Some(rerank);
        self
    }

    /// Number of candidates kept by stage A
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Produce the ranked candidate list for a target
    ///
    /// Sources are scanned in registration order; ties keep that order. When
    /// fewer than K eligible sources exist the reduced set is ranked instead.
    /// An empty result means no admissible source exists and is fatal to the
    /// run (the driver reports it, this stage just observes it).
    pub fn find_candidates<D: DescriptorStrategy>(
        &self,
        images: &ImageStack<P>,
        mask: &Mask,
        descriptors: &D,
        target: &PatchDescriptor,
        sources: &[Vertex],
    ) -> Vec<Candidate> {
        // Stage A: linear scan, keep top-K under the primary functor
        let mut scored: Vec<(usize, Candidate)> = Vec::new();
        for (index, &source) in sources.iter().enumerate() {
            let Some(descriptor) = descriptors.descriptor(source) else {
                continue;
            };
            if !descriptor.source_eligible {
                continue;
            }
            let score = self.primary.difference(images, mask, target, descriptor);
            scored.push((
                index,
                Candidate { source, score },
            ));
        }

        scored.sort_by(|a, b| a.1.score.total_cmp(&b.1.score).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(self.k);
        let mut ranked: Vec<Candidate> = scored.into_iter().map(|(_, c)| c).collect();

        // Stage B: stable re-rank under the secondary functor
        if let Some(rerank) = &self.rerank {
            for candidate in &mut ranked {
                if let Some(descriptor) = descriptors.descriptor(candidate.source) {
                    candidate.score = rerank.difference(images, mask, target, descriptor);
                }
            }
            ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        }

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::descriptor::PatchDescriptorStrategy;
    use crate::spatial::mask::PixelState;
    use crate::spatial::stack::PixelGrid;

    fn fixture() -> (ImageStack<u8>, Mask, PatchDescriptorStrategy) {
        // 5x7: a hole at [2, 1], everything else valid; pixel value = column
        let images = ImageStack::new(PixelGrid::from_fn((5, 7), |v| v[1] as u8 * 10));
        let mask = Mask::from_fn((5, 7), |v| {
            if v == [2, 1] {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        });
        let mut descriptors = PatchDescriptorStrategy::new((5, 7), 1);
        for r in 0..5 {
            for c in 0..7 {
                descriptors.initialize(&mask, [r, c]);
            }
        }
        (images, mask, descriptors)
    }

    #[test]
    fn closest_source_ranks_first() {
        let (images, mask, descriptors) = fixture();
        let target = descriptors.descriptor([2, 1]).copied().unwrap_or_default();

        let pipeline: SearchPipeline<u8> =
            SearchPipeline::new(3, Box::new(SumSquaredPatchDifference::on_primary()));
        // [2, 2]'s patch overlaps the hole, so it never becomes a candidate
        let sources = vec![[2, 5], [2, 2], [2, 3]];
        let ranked = pipeline.find_candidates(&images, &mask, &descriptors, &target, &sources);

        let picked: Vec<Vertex> = ranked.iter().map(|c| c.source).collect();
        assert_eq!(picked, vec![[2, 3], [2, 5]]);
    }

    #[test]
    fn reduced_source_set_is_not_an_error() {
        let (images, mask, descriptors) = fixture();
        let target = descriptors.descriptor([2, 1]).copied().unwrap_or_default();

        let pipeline: SearchPipeline<u8> =
            SearchPipeline::new(10, Box::new(SumSquaredPatchDifference::on_primary()));
        let ranked =
            pipeline.find_candidates(&images, &mask, &descriptors, &target, &[[2, 3]]);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn ineligible_sources_are_skipped() {
        let (images, mask, descriptors) = fixture();
        let target = descriptors.descriptor([2, 1]).copied().unwrap_or_default();

        let pipeline: SearchPipeline<u8> =
            SearchPipeline::new(3, Box::new(SumSquaredPatchDifference::on_primary()));
        // [0, 0] is clipped, [2, 1] is the hole itself; neither is eligible
        let ranked = pipeline.find_candidates(
            &images,
            &mask,
            &descriptors,
            &target,
            &[[0, 0], [2, 1]],
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn ties_keep_registration_order() {
        // Uniform image: every source scores identically
        let images = ImageStack::new(PixelGrid::from_elem((5, 7), 0_u8));
        let (_, mask, descriptors) = fixture();
        let target = descriptors.descriptor([2, 1]).copied().unwrap_or_default();

        let pipeline: SearchPipeline<u8> =
            SearchPipeline::new(2, Box::new(SumSquaredPatchDifference::on_primary()));
        let sources = vec![[3, 4], [1, 3], [2, 5]];
        let ranked = pipeline.find_candidates(&images, &mask, &descriptors, &target, &sources);

        let picked: Vec<Vertex> = ranked.iter().map(|c| c.source).collect();
        assert_eq!(picked, vec![[3, 4], [1, 3]]);
    }

    #[test]
    fn first_best_selects_top_entry() {
        let selector = FirstBest;
        assert_eq!(selector.select(&[]), None);
        let ranked = vec![
            Candidate {
                source: [1, 1],
                score: 0.5,
            },
            Candidate {
                source: [2, 2],
                score: 0.7,
            },
        ];
        assert_eq!(selector.select(&ranked), Some(0));
    }
}
