//! Algorithm driver: the control loop binding queue, strategies, and mask
//!
//! Each vertex conceptually moves through `Unseen → Boundary(enqueued) →
//! TargetSelected → Painted → Finalized`. One iteration pops the
//! highest-priority live boundary vertex, finds and validates a source patch,
//! paints the footprint across every representation, then repairs descriptor,
//! priority, and queue state around the filled region. The loop is strictly
//! sequential: every decision depends on the complete effect of the previous
//! iteration.

use bitvec::vec::BitVec;

use crate::algorithm::acceptance::{AcceptanceStrategy, AlwaysAccept};
use crate::algorithm::descriptor::{
    DescriptorStatus, DescriptorStrategy, PatchDescriptor, PatchDescriptorStrategy,
};
use crate::algorithm::inpainter::{CompositeInpainter, PatchInpainter};
use crate::algorithm::priority::{ConfidencePriority, PriorityStrategy};
use crate::algorithm::queue::BoundaryQueue;
use crate::algorithm::search::{
    BestSelector, Candidate, FirstBest, ManualSelector, SearchPipeline, SumSquaredPatchDifference,
};
use crate::io::configuration::{DEFAULT_KNN, DEFAULT_PATCH_RADIUS};
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::grid::{Region, Vertex, region_around};
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, PixelValue};

/// Parameters controlling a fill run
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Patch half-width `r`; footprints span `(2r + 1)²` pixels before clipping
    pub half_width: usize,
    /// Number of candidates kept by the search pipeline's first stage
    pub knn: usize,
    /// Optional iteration cap, checked only at iteration boundaries
    pub max_iterations: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            half_width: DEFAULT_PATCH_RADIUS,
            knn: DEFAULT_KNN,
            max_iterations: None,
        }
    }
}

/// Snapshot of one committed iteration, passed to the observer hook
#[derive(Debug, Clone, Copy)]
pub struct FillEvent {
    /// Iteration number, starting at 1
    pub iteration: usize,
    /// Target vertex that was filled
    pub target: Vertex,
    /// Source vertex the patch was copied from
    pub source: Vertex,
    /// Number of pixels painted this iteration
    pub painted: usize,
    /// Hole pixels remaining after this iteration
    pub holes_remaining: usize,
}

/// Outcome of a completed (or capped) run
#[derive(Debug, Clone, Copy)]
pub struct FillSummary {
    /// Total iterations executed
    pub iterations: usize,
    /// Total pixels painted
    pub painted_pixels: usize,
    /// Hole pixels remaining (zero unless the run was capped)
    pub holes_remaining: usize,
    /// Whether the iteration cap stopped the run before completion
    pub stopped_early: bool,
}

/// Observer invoked after each committed iteration
pub type IterationObserver = Box<dyn FnMut(&FillEvent)>;

/// Callback invoked once when the queue empties with no hole remaining
pub type CompletionCallback<P> = Box<dyn FnMut(&ImageStack<P>, &Mask)>;

/// The priority-driven patch-completion engine
///
/// Owns queue and mask-update sequencing exclusively for the duration of a
/// run; strategies are pluggable collaborators selected at construction.
/// Construction wires deterministic defaults (masked SSD search, confidence
/// priority, pass-through acceptance, composite painting of every
/// representation); `with_*` builders swap policies before the first step.
pub struct FillDriver<'a, P: PixelValue> {
    images: &'a mut ImageStack<P>,
    mask: &'a mut Mask,
    descriptors: PatchDescriptorStrategy,
    queue: BoundaryQueue,
    search: SearchPipeline<P>,
    priority: Box<dyn PriorityStrategy<P>>,
    acceptance: Box<dyn AcceptanceStrategy<P>>,
    inpainter: Box<dyn PatchInpainter<P>>,
    selector: Box<dyn BestSelector>,
    fallback: Option<Box<dyn ManualSelector>>,
    observer: Option<IterationObserver>,
    on_complete: Option<CompletionCallback<P>>,
    sources: Vec<Vertex>,
    registered: BitVec,
    half_width: usize,
    max_iterations: Option<usize>,
    iteration: usize,
    painted_pixels: usize,
    stopped_early: bool,
    seeded: bool,
}

impl<'a, P: PixelValue> FillDriver<'a, P> {
    /// Create a driver over an image stack and its mask
    ///
    /// # Errors
    ///
    /// Returns an error if the image and mask dimensions differ.
    pub fn new(
        images: &'a mut ImageStack<P>,
        mask: &'a mut Mask,
        config: DriverConfig,
    ) -> Result<Self> {
        if images.dims() != mask.dims() {
            return Err(AlgorithmError::DimensionMismatch {
                image: images.dims(),
                mask: mask.dims(),
            });
        }

        let dims = mask.dims();
        let priority = Box::new(ConfidencePriority::new(mask, config.half_width));
        let search: SearchPipeline<P> =
            SearchPipeline::new(config.knn, Box::new(SumSquaredPatchDifference::on_primary()));
        let inpainter = Box::new(CompositeInpainter::for_stack(images));

        Ok(Self {
            images,
            mask,
            descriptors: PatchDescriptorStrategy::new(dims, config.half_width),
            queue: BoundaryQueue::new(dims),
            search,
            priority,
            acceptance: Box::new(AlwaysAccept),
            inpainter,
            selector: Box::new(FirstBest),
            fallback: None,
            observer: None,
            on_complete: None,
            sources: Vec::new(),
            registered: BitVec::repeat(false, dims.0 * dims.1),
            half_width: config.half_width,
            max_iterations: config.max_iterations,
            iteration: 0,
            painted_pixels: 0,
            stopped_early: false,
            seeded: false,
        })
    }

    /// Replace the priority strategy
    #[must_use]
    pub fn with_priority(mut self, priority: Box<dyn PriorityStrategy<P>>) -> Self {
        self.priority = priority;
        self
    }

    /// Replace the acceptance strategy
    #[must_use]
    pub fn with_acceptance(mut self, acceptance: Box<dyn AcceptanceStrategy<P>>) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Replace the search pipeline
    #[must_use]
    pub fn with_search(mut self, search: SearchPipeline<P>) -> Self {
        self.search = search;
        self
    }

    /// Replace the inpainter
    #[must_use]
    pub fn with_inpainter(mut self, inpainter: Box<dyn PatchInpainter<P>>) -> Self {
        self.inpainter = inpainter;
        self
    }

    /// Replace the stage C selector
    #[must_use]
    pub fn with_selector(mut self, selector: Box<dyn BestSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Install a fallback selector consulted when acceptance exhausts all candidates
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn ManualSelector>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Install an observer invoked after each committed iteration
    #[must_use]
    pub fn with_observer(mut self, observer: IterationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Install the completion callback invoked once when the fill finishes
    #[must_use]
    pub fn on_complete(mut self, callback: CompletionCallback<P>) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Current iteration count
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Borrow the mask
    pub fn mask(&self) -> &Mask {
        self.mask
    }

    /// Borrow the image stack
    pub fn images(&self) -> &ImageStack<P> {
        self.images
    }

    /// Live boundary vertices currently enqueued, row-major
    pub fn live_boundary(&self) -> Vec<Vertex> {
        self.queue.live_vertices()
    }

    /// Number of registered source vertices
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn register_if_eligible(&mut self, v: Vertex) {
        let eligible = self
            .descriptors
            .descriptor(v)
            .is_some_and(|d| d.source_eligible);
        if !eligible {
            return;
        }

        let cols = self.mask.dims().1;
        let index = v[0] * cols + v[1];
        let already = self.registered.get(index).is_some_and(|bit| *bit);
        if !already {
            self.registered.set(index, true);
            self.sources.push(v);
        }
    }

    /// Build descriptors for reachable vertices and enqueue the initial boundary
    ///
    /// Runs once, lazily, before the first step so that replaced strategies
    /// see every priority computation.
    fn ensure_seeded(&mut self) {
        if self.seeded {
            return;
        }
        self.seeded = true;

        let dims = self.mask.dims();
        for v in Region::new(0, dims.0, 0, dims.1).iter() {
            if self.mask.is_valid(v) {
                self.descriptors.initialize(self.mask, v);
                self.register_if_eligible(v);
            } else if self.mask.is_boundary(v) {
                self.descriptors.initialize(self.mask, v);
                let score = self.priority.compute(self.images, self.mask, v);
                self.queue.push(v, score);
            }
        }
    }

    /// Find the first candidate the acceptance strategy admits
    ///
    /// Starts at the stage C selection, advances through the remaining ranked
    /// candidates on rejection, and escalates to the fallback selector before
    /// declaring exhaustion.
    fn select_accepted(
        &mut self,
        target: Vertex,
        target_desc: &PatchDescriptor,
        candidates: &[Candidate],
    ) -> Result<Vertex> {
        let start = self.selector.select(candidates).unwrap_or(0);
        let ordered = candidates
            .iter()
            .skip(start)
            .chain(candidates.iter().take(start));

        for candidate in ordered {
            let Some(source_desc) = self.descriptors.descriptor(candidate.source) else {
                continue;
            };
            if self
                .acceptance
                .accept(self.images, self.mask, target_desc, source_desc)
            {
                return Ok(candidate.source);
            }
        }

        if let Some(fallback) = &mut self.fallback {
            if let Some(choice) = fallback.choose(target, candidates) {
                if !self.mask.is_valid(choice) {
                    return Err(AlgorithmError::InvariantViolation {
                        detail: "fallback-selected source is not valid",
                        vertex: choice,
                        iteration: self.iteration,
                    });
                }
                return Ok(choice);
            }
        }

        Err(AlgorithmError::AcceptanceExhausted {
            target,
            iteration: self.iteration,
            candidates: candidates.len(),
        })
    }

    /// Execute one iteration of the fill loop
    ///
    /// Returns `Ok(false)` when the queue is empty or the iteration cap was
    /// reached; cancellation is only ever observed here, between iterations.
    ///
    /// # Errors
    ///
    /// Returns an error if no admissible source exists for the popped target,
    /// if every candidate is rejected with no fallback selection, or if a
    /// consistency check fails at the point of use.
    pub fn step(&mut self) -> Result<bool> {
        self.ensure_seeded();

        if let Some(cap) = self.max_iterations {
            if self.iteration >= cap && self.mask.hole_count() > 0 {
                self.stopped_early = true;
                return Ok(false);
            }
        }

        let Some((target, _)) = self.queue.pop() else {
            return Ok(false);
        };
        self.iteration += 1;

        if !self.mask.is_hole(target) {
            return Err(AlgorithmError::InvariantViolation {
                detail: "popped target is not a hole pixel",
                vertex: target,
                iteration: self.iteration,
            });
        }
        if !self.mask.has_valid_neighbor(target) {
            return Err(AlgorithmError::InvariantViolation {
                detail: "popped target has no valid neighbor",
                vertex: target,
                iteration: self.iteration,
            });
        }

        self.descriptors.initialize(self.mask, target);
        self.descriptors.discover(target);
        let target_desc = self
            .descriptors
            .descriptor(target)
            .copied()
            .ok_or_else(|| AlgorithmError::InvariantViolation {
                detail: "target descriptor missing after initialization",
                vertex: target,
                iteration: self.iteration,
            })?;

        let candidates = self.search.find_candidates(
            self.images,
            self.mask,
            &self.descriptors,
            &target_desc,
            &self.sources,
        );
        if candidates.is_empty() {
            return Err(AlgorithmError::NoAdmissibleSource {
                target,
                iteration: self.iteration,
            });
        }

        let source = self.select_accepted(target, &target_desc, &candidates)?;
        if !self.mask.is_valid(source) {
            return Err(AlgorithmError::InvariantViolation {
                detail: "proposed source is not valid",
                vertex: source,
                iteration: self.iteration,
            });
        }

        // Paint, then flip the painted holes to valid; painting is atomic at
        // footprint granularity and the mask flip happens here, not in the
        // inpainter.
        self.inpainter
            .paint(self.images, self.mask, target, source, self.half_width);

        let dims = self.mask.dims();
        let footprint = region_around(target, self.half_width, dims);
        let filled: Vec<Vertex> = footprint.iter().filter(|v| self.mask.is_hole(*v)).collect();
        for &v in &filled {
            self.mask.mark_valid(v);
        }
        self.painted_pixels += filled.len();

        // Re-initialize descriptors wherever a patch could overlap the fill;
        // newly fully-valid patches become registered sources.
        for v in region_around(target, 2 * self.half_width, dims).iter() {
            self.descriptors.initialize(self.mask, v);
            self.register_if_eligible(v);
        }

        self.priority.update(self.images, self.mask, target, &filled);

        // Repair the frontier: the filled footprint retired boundary vertices
        // and the ring just beyond it may have gained or lost boundary status.
        for v in region_around(target, self.half_width + 1, dims).iter() {
            if self.mask.is_boundary(v) {
                if self.descriptors.status(v) == DescriptorStatus::Uninitialized {
                    self.descriptors.initialize(self.mask, v);
                }
                let score = self.priority.compute(self.images, self.mask, v);
                self.queue.push(v, score);
            } else {
                self.queue.invalidate(v);
            }
        }

        if let Some(observer) = &mut self.observer {
            observer(&FillEvent {
                iteration: self.iteration,
                target,
                source,
                painted: filled.len(),
                holes_remaining: self.mask.hole_count(),
            });
        }

        Ok(true)
    }

    /// Run the fill loop to completion
    ///
    /// # Errors
    ///
    /// Propagates any fatal step error. A queue that empties while hole
    /// pixels remain (a hole region with no reachable valid source) is
    /// reported as `NoAdmissibleSource` rather than silently returning a
    /// partial image.
    pub fn run(&mut self) -> Result<FillSummary> {
        while self.step()? {}

        if self.mask.hole_count() > 0 && !self.stopped_early {
            let dims = self.mask.dims();
            let first_hole = Region::new(0, dims.0, 0, dims.1)
                .iter()
                .find(|v| self.mask.is_hole(*v))
                .unwrap_or([0, 0]);
            return Err(AlgorithmError::NoAdmissibleSource {
                target: first_hole,
                iteration: self.iteration,
            });
        }

        if self.mask.hole_count() == 0 {
            if let Some(callback) = &mut self.on_complete {
                callback(self.images, self.mask);
            }
        }

        Ok(FillSummary {
            iterations: self.iteration,
            painted_pixels: self.painted_pixels,
            holes_remaining: self.mask.hole_count(),
            stopped_early: self.stopped_early,
        })
    }
}
