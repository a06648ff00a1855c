//! Mask-aware box blur for building auxiliary image representations
//!
//! Ordinary blurring would smear undefined hole data into the valid region;
//! the masked variant averages only valid pixels, leaving hole pixels at
//! their original (meaningless) values. Blurred copies are registered as
//! auxiliary representations and painted in parallel with the original, so
//! patch comparisons can run on smoother data.

use crate::spatial::grid::region_around;
use crate::spatial::mask::Mask;
use crate::spatial::stack::{PixelGrid, PixelValue};

/// Box blur that averages only valid pixels within the given radius
///
/// Pixels with no valid neighbor in range (including hole pixels deep inside
/// the hole) keep their original value.
pub fn masked_box_blur<P: PixelValue>(image: &PixelGrid<P>, mask: &Mask, radius: usize) -> PixelGrid<P> {
    let dims = image.dims();

    PixelGrid::from_fn(dims, |v| {
        let mut sums = vec![0.0; P::CHANNELS];
        let mut count = 0_usize;

        for n in region_around(v, radius, dims).iter() {
            if !mask.is_valid(n) {
                continue;
            }
            let Some(px) = image.get(n) else { continue };
            for (i, sum) in sums.iter_mut().enumerate() {
                *sum += px.channel(i);
            }
            count += 1;
        }

        if count == 0 {
            return image.get(v).unwrap_or_else(|| P::from_channels(&sums));
        }

        for sum in &mut sums {
            *sum /= count as f64;
        }
        P::from_channels(&sums)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::mask::PixelState;

    #[test]
    fn uniform_image_is_unchanged() {
        let image = PixelGrid::from_elem((5, 5), 100_u8);
        let mask = Mask::filled((5, 5));
        let blurred = masked_box_blur(&image, &mask, 1);
        assert!(blurred.pixels().all(|p| p == 100));
    }

    #[test]
    fn hole_pixels_do_not_contaminate_average() {
        // A bright hole pixel surrounded by dark valid pixels
        let image = PixelGrid::from_fn((3, 3), |v| if v == [1, 1] { 255_u8 } else { 10 });
        let mask = Mask::from_fn((3, 3), |v| {
            if v == [1, 1] {
                PixelState::Hole
            } else {
                PixelState::Valid
            }
        });

        let blurred = masked_box_blur(&image, &mask, 1);
        assert_eq!(blurred.get([0, 0]), Some(10));
        assert_eq!(blurred.get([1, 1]), Some(10));
    }

    #[test]
    fn fully_holed_region_keeps_original_values() {
        let image = PixelGrid::from_elem((2, 2), 42_u8);
        let mask = Mask::from_fn((2, 2), |_| PixelState::Hole);
        let blurred = masked_box_blur(&image, &mask, 1);
        assert!(blurred.pixels().all(|p| p == 42));
    }
}
