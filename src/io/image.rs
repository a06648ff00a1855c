//! Image and mask loading plus PNG export for fill results
//!
//! Images are held row-major as `(rows, cols)` grids of RGB pixels. Masks come
//! from a second grayscale image of identical dimensions where bright pixels
//! mark the hole region.

use std::path::Path;

use image::{ImageBuffer, Rgb};

use crate::io::configuration::{MASK_HOLE_THRESHOLD, MAX_IMAGE_DIMENSION};
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::mask::{Mask, PixelState};
use crate::spatial::stack::PixelGrid;

/// Load an RGB image into a pixel grid
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or either dimension
/// exceeds the allocation limit.
pub fn load_image(path: &Path) -> Result<PixelGrid<[u8; 3]>> {
    let decoded = image::open(path).map_err(|e| AlgorithmError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rgb = decoded.to_rgb8();

    let rows = rgb.height() as usize;
    let cols = rgb.width() as usize;
    if rows > MAX_IMAGE_DIMENSION || cols > MAX_IMAGE_DIMENSION {
        return Err(AlgorithmError::InvalidParameter {
            parameter: "image dimensions",
            value: format!("{rows}x{cols}"),
            reason: format!("dimensions exceed the {MAX_IMAGE_DIMENSION} pixel limit"),
        });
    }

    Ok(PixelGrid::from_fn((rows, cols), |v| {
        rgb.get_pixel(v[1] as u32, v[0] as u32).0
    }))
}

/// Load a grayscale mask image and validate it against the target dimensions
///
/// Pixels with luminance at or above [`MASK_HOLE_THRESHOLD`] become holes.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or if the mask dimensions
/// differ from the image dimensions.
pub fn load_mask(path: &Path, image_dims: (usize, usize)) -> Result<Mask> {
    let decoded = image::open(path).map_err(|e| AlgorithmError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let luma = decoded.to_luma8();

    let dims = (luma.height() as usize, luma.width() as usize);
    if dims != image_dims {
        return Err(AlgorithmError::DimensionMismatch {
            image: image_dims,
            mask: dims,
        });
    }

    Ok(Mask::from_fn(dims, |v| {
        let luminance = luma.get_pixel(v[1] as u32, v[0] as u32).0[0];
        if luminance >= MASK_HOLE_THRESHOLD {
            PixelState::Hole
        } else {
            PixelState::Valid
        }
    }))
}

/// Export a pixel grid as a PNG image
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the image
/// cannot be saved.
pub fn export_image(grid: &PixelGrid<[u8; 3]>, output_path: &Path) -> Result<()> {
    let (rows, cols) = grid.dims();
    let mut img = ImageBuffer::new(cols as u32, rows as u32);

    for (i, px) in grid.pixels().enumerate() {
        let x = (i % cols) as u32;
        let y = (i / cols) as u32;
        img.put_pixel(x, y, Rgb(px));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(output_path).map_err(|e| AlgorithmError::ImageExport {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
