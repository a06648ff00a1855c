//! Performance measurement for complete fill runs

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use patchfill::algorithm::driver::{DriverConfig, FillDriver};
use patchfill::spatial::mask::{Mask, PixelState};
use patchfill::spatial::stack::{ImageStack, PixelGrid};
use std::hint::black_box;

const SIDE: usize = 64;

fn textured_image() -> PixelGrid<u8> {
    PixelGrid::from_fn((SIDE, SIDE), |v| ((v[0] * 13 + v[1] * 29) % 256) as u8)
}

fn centered_hole_mask() -> Mask {
    Mask::from_fn((SIDE, SIDE), |v| {
        if (24..40).contains(&v[0]) && (24..40).contains(&v[1]) {
            PixelState::Hole
        } else {
            PixelState::Valid
        }
    })
}

/// Measures time to fill a 16x16 hole in a 64x64 textured image
fn bench_fill_centered_hole(c: &mut Criterion) {
    c.bench_function("fill_16x16_hole", |b| {
        b.iter(|| {
            let mut images = ImageStack::new(textured_image());
            let mut mask = centered_hole_mask();
            let config = DriverConfig {
                half_width: 3,
                knn: 5,
                max_iterations: None,
            };

            let Ok(mut driver) = FillDriver::new(&mut images, &mut mask, config) else {
                return;
            };
            if driver.run().is_err() {
                return;
            }
            black_box(driver.iteration());
        });
    });
}

criterion_group!(benches, bench_fill_centered_hole);
criterion_main!(benches);
