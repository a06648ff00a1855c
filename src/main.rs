//! CLI entry point for the exemplar-based image completion tool

use clap::Parser;
use patchfill::io::cli::{Cli, InpaintRunner};

fn main() -> patchfill::Result<()> {
    let cli = Cli::parse();
    let runner = InpaintRunner::new(cli);
    runner.process()
}
