//! Patch inpainters committing a match onto the image representations
//!
//! Painting copies source-patch pixels onto hole pixels of the target
//! footprint. The overwrite predicate is strictly "hole pixels only": valid
//! target pixels inside the footprint are never touched. Mask mutation is
//! not the inpainter's job; the driver marks painted pixels valid afterwards
//! so mask ownership stays in one place.

use crate::spatial::grid::{Vertex, region_around};
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, LayerId, PixelValue};

/// Commits a (target, source) match onto image representations
pub trait PatchInpainter<P: PixelValue> {
    /// Copy source-patch pixels onto the hole pixels of the target footprint
    fn paint(
        &mut self,
        images: &mut ImageStack<P>,
        mask: &Mask,
        target: Vertex,
        source: Vertex,
        half_width: usize,
    );
}

/// Paints one representation of the image stack
#[derive(Debug, Clone, Copy)]
pub struct LayerInpainter {
    layer: LayerId,
}

impl LayerInpainter {
    /// Create an inpainter for the given representation
    pub const fn new(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl<P: PixelValue> PatchInpainter<P> for LayerInpainter {
    fn paint(
        &mut self,
        images: &mut ImageStack<P>,
        mask: &Mask,
        target: Vertex,
        source: Vertex,
        half_width: usize,
    ) {
        let footprint = region_around(target, half_width, images.dims());
        let Some(layer) = images.layer_mut(self.layer) else {
            return;
        };

        for tv in footprint.iter() {
            if !mask.is_hole(tv) {
                continue;
            }

            // Map the target offset into the source patch
            let sr = source[0] as i64 + (tv[0] as i64 - target[0] as i64);
            let sc = source[1] as i64 + (tv[1] as i64 - target[1] as i64);
            if sr < 0 || sc < 0 {
                continue;
            }
            if let Some(px) = layer.get([sr as usize, sc as usize]) {
                layer.put(tv, px);
            }
        }
    }
}

/// Fans a paint call out to several inpainters
///
/// Registering one [`LayerInpainter`] per representation paints the primary
/// image and every auxiliary copy from the same vertex pair.
pub struct CompositeInpainter<P: PixelValue> {
    parts: Vec<Box<dyn PatchInpainter<P>>>,
}

impl<P: PixelValue> Default for CompositeInpainter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PixelValue> CompositeInpainter<P> {
    /// Create an empty composite
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Composite painting every representation of a stack
    pub fn for_stack(images: &ImageStack<P>) -> Self {
        let mut composite = Self::new();
        for id in images.layer_ids() {
            composite.push(Box::new(LayerInpainter::new(id)));
        }
        composite
    }

    /// Register another inpainter
    pub fn push(&mut self, inpainter: Box<dyn PatchInpainter<P>>) {
        self.parts.push(inpainter);
    }

    /// Number of registered inpainters
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no inpainter is registered
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<P: PixelValue> PatchInpainter<P> for CompositeInpainter<P> {
    fn paint(
        &mut self,
        images: &mut ImageStack<P>,
        mask: &Mask,
        target: Vertex,
        source: Vertex,
        half_width: usize,
    ) {
        for part in &mut self.parts {
            part.paint(images, mask, target, source, half_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::mask::PixelState;
    use crate::spatial::stack::PixelGrid;

    fn hole_mask() -> Mask {
        Mask::from_fn((6, 6), |v| {
            if v == [2, 2] || v == [2, 3] {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        })
    }

    #[test]
    fn paints_only_hole_pixels() {
        let mut images = ImageStack::new(PixelGrid::from_fn((6, 6), |v| (v[0] * 6 + v[1]) as u8));
        let mask = hole_mask();
        let before: Vec<u8> = images.primary().pixels().collect();

        let mut inpainter = LayerInpainter::new(LayerId::Primary);
        inpainter.paint(&mut images, &mask, [2, 2], [4, 4], 1);

        // Hole pixels take the offset-mapped source values
        assert_eq!(images.primary().get([2, 2]), images.primary().get([4, 4]));
        assert_eq!(images.primary().get([2, 3]), images.primary().get([4, 5]));

        // Every valid pixel keeps its prior value
        for (i, after) in images.primary().pixels().enumerate() {
            let v = [i / 6, i % 6];
            if v != [2, 2] && v != [2, 3] {
                assert_eq!(Some(after), before.get(i).copied());
            }
        }
    }

    #[test]
    fn composite_paints_every_layer() {
        let mut images = ImageStack::new(PixelGrid::from_fn((6, 6), |v| v[1] as u8));
        let aux_id = images.push_auxiliary(PixelGrid::from_fn((6, 6), |v| v[0] as u8));
        assert_eq!(aux_id, Some(LayerId::Auxiliary(0)));
        let mask = hole_mask();

        let mut composite = CompositeInpainter::for_stack(&images);
        assert_eq!(composite.len(), 2);
        composite.paint(&mut images, &mask, [2, 2], [4, 4], 0);

        assert_eq!(images.primary().get([2, 2]), Some(4));
        let aux = images.layer(LayerId::Auxiliary(0)).cloned();
        assert_eq!(aux.and_then(|layer| layer.get([2, 2])), Some(4));
    }

    #[test]
    fn clipped_footprint_paints_in_bounds_only() {
        let mut images = ImageStack::new(PixelGrid::from_elem((4, 4), 0_u8));
        let mut mask = Mask::filled((4, 4));
        mask.set_hole([0, 0]);
        if let Some(layer) = images.layer_mut(LayerId::Primary) {
            layer.put([2, 2], 9);
        }

        let mut inpainter = LayerInpainter::new(LayerId::Primary);
        inpainter.paint(&mut images, &mask, [0, 0], [2, 2], 1);
        assert_eq!(images.primary().get([0, 0]), Some(9));
    }
}
