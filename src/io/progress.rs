//! Progress display for a fill run, tracked in painted hole pixels

use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};

static FILL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pixels ({elapsed_precise})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Tracks fill completion against the initial hole pixel count
///
/// Iterations paint a variable number of pixels, so the bar advances by
/// painted pixels rather than by iteration. Clones share the underlying bar.
#[derive(Clone)]
pub struct FillProgress {
    bar: ProgressBar,
}

impl FillProgress {
    /// Create a progress bar sized to the initial hole pixel count
    pub fn new(total_holes: usize) -> Self {
        let bar = ProgressBar::new(total_holes as u64);
        bar.set_style(FILL_STYLE.clone());
        bar.set_message("Filling");
        Self { bar }
    }

    /// Record painted pixels from one committed iteration
    pub fn record(&self, painted: usize, iteration: usize) {
        self.bar.inc(painted as u64);
        self.bar.set_message(format!("Iteration {iteration}"));
    }

    /// Finish and clear the display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
