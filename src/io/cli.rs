//! Command-line interface for exemplar-based hole filling

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use crate::algorithm::acceptance::BoundaryEnergyAcceptance;
use crate::algorithm::driver::{DriverConfig, FillDriver};
use crate::algorithm::search::{SearchPipeline, SumSquaredPatchDifference};
use crate::io::configuration::{
    DEFAULT_BLUR_RADIUS, DEFAULT_KNN, DEFAULT_PATCH_RADIUS, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{export_image, load_image, load_mask};
use crate::io::progress::FillProgress;
use crate::math::blur::masked_box_blur;
use crate::spatial::mask::Mask;
use crate::spatial::stack::{ImageStack, LayerId};

#[derive(Parser)]
#[command(name = "patchfill")]
#[command(
    author,
    version,
    about = "Fill masked image regions by copying best-matching patches"
)]
/// Command-line arguments for the fill tool
pub struct Cli {
    /// Input image to fill
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Grayscale mask image; bright pixels mark the region to fill
    #[arg(value_name = "MASK")]
    pub mask: PathBuf,

    /// Output path (defaults to <image>_filled.png next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Patch half-width in pixels
    #[arg(short = 'r', long, default_value_t = DEFAULT_PATCH_RADIUS)]
    pub patch_radius: usize,

    /// Number of candidates retained by the first search stage
    #[arg(short, long, default_value_t = DEFAULT_KNN)]
    pub knn: usize,

    /// Radius of the masked box blur for the comparison layer (0 disables it)
    #[arg(short, long, default_value_t = DEFAULT_BLUR_RADIUS)]
    pub blur_radius: usize,

    /// Reject matches whose seam energy exceeds this threshold
    #[arg(long)]
    pub max_energy: Option<f64>,

    /// Maximum iterations before stopping with a partial result
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Orchestrates one fill run from loading through export
pub struct InpaintRunner {
    cli: Cli,
}

impl InpaintRunner {
    /// Create a runner with the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load, fill, and export according to the CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if parameter validation, loading, the fill itself,
    /// or export fails.
    // Allow print for user feedback after a run
    #[allow(clippy::print_stderr)]
    pub fn process(&self) -> Result<()> {
        self.validate()?;
        let start_time = Instant::now();

        let image = load_image(&self.cli.image)?;
        let mut mask = load_mask(&self.cli.mask, image.dims())?;
        let output_path = self
            .cli
            .output
            .clone()
            .unwrap_or_else(|| Self::default_output_path(&self.cli.image));

        if mask.hole_count() == 0 {
            // Nothing to fill; the result is the input
            export_image(&image, &output_path)?;
            return Ok(());
        }
        let total_holes = mask.hole_count();

        let blurred = (self.cli.blur_radius > 0)
            .then(|| masked_box_blur(&image, &mask, self.cli.blur_radius));
        let mut images = ImageStack::new(image);
        let compare_layer = blurred
            .and_then(|layer| images.push_auxiliary(layer))
            .unwrap_or(LayerId::Primary);

        let search = if compare_layer == LayerId::Primary {
            SearchPipeline::new(self.cli.knn, Box::new(SumSquaredPatchDifference::on_primary()))
        } else {
            // Rank on the blurred copy, then re-rank survivors on the
            // untouched original.
            SearchPipeline::new(
                self.cli.knn,
                Box::new(SumSquaredPatchDifference {
                    layer: compare_layer,
                }),
            )
            .with_rerank(Box::new(SumSquaredPatchDifference::on_primary()))
        };

        let config = DriverConfig {
            half_width: self.cli.patch_radius,
            knn: self.cli.knn,
            max_iterations: self.cli.iterations,
        };

        let summary = Self::run_fill(&mut images, &mut mask, config, search, &self.cli, total_holes)?;

        export_image(images.primary(), &output_path)?;

        if !self.cli.quiet {
            eprintln!(
                "Filled {} pixels in {} iterations ({:.2?}); output: {}",
                summary.painted_pixels,
                summary.iterations,
                start_time.elapsed(),
                output_path.display()
            );
            if summary.stopped_early {
                eprintln!(
                    "Stopped at the iteration cap with {} hole pixels remaining",
                    summary.holes_remaining
                );
            }
        }

        Ok(())
    }

    fn run_fill(
        images: &mut ImageStack<[u8; 3]>,
        mask: &mut Mask,
        config: DriverConfig,
        search: SearchPipeline<[u8; 3]>,
        cli: &Cli,
        total_holes: usize,
    ) -> Result<crate::algorithm::driver::FillSummary> {
        let mut driver = FillDriver::new(images, mask, config)?.with_search(search);

        if let Some(max_energy) = cli.max_energy {
            driver = driver.with_acceptance(Box::new(BoundaryEnergyAcceptance::new(max_energy)));
        }

        let progress = cli.should_show_progress().then(|| FillProgress::new(total_holes));
        if let Some(ref progress) = progress {
            let observer = progress.clone();
            driver = driver.with_observer(Box::new(move |event| {
                observer.record(event.painted, event.iteration);
            }));
        }

        let result = driver.run();
        if let Some(ref progress) = progress {
            progress.finish();
        }
        result
    }

    fn validate(&self) -> Result<()> {
        if self.cli.knn == 0 {
            return Err(invalid_parameter(
                "knn",
                &self.cli.knn,
                &"at least one candidate must be retained",
            ));
        }
        if let Some(max_energy) = self.cli.max_energy {
            if !max_energy.is_finite() || max_energy < 0.0 {
                return Err(invalid_parameter(
                    "max-energy",
                    &max_energy,
                    &"threshold must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    fn default_output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}.png", stem.to_string_lossy());

        input_path.parent().map_or_else(
            || PathBuf::from(&output_name),
            |parent| parent.join(&output_name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_keeps_directory() {
        let path = InpaintRunner::default_output_path(Path::new("photos/garden.png"));
        assert_eq!(path, PathBuf::from("photos/garden_filled.png"));
    }

    #[test]
    fn zero_knn_is_rejected() {
        let cli = Cli::parse_from(["patchfill", "a.png", "b.png", "--knn", "0"]);
        let runner = InpaintRunner::new(cli);
        assert!(runner.validate().is_err());
    }

    #[test]
    fn negative_energy_threshold_is_rejected() {
        // The `=` form keeps the leading minus out of flag lexing
        let cli = match Cli::try_parse_from(["patchfill", "a.png", "b.png", "--max-energy=-1.0"]) {
            Ok(cli) => cli,
            Err(e) => unreachable!("arguments should parse: {e}"),
        };
        assert!(cli.max_energy.is_some_and(|e| e < 0.0));
        let runner = InpaintRunner::new(cli);
        assert!(runner.validate().is_err());
    }
}
