/// Command-line interface and run orchestration
pub mod cli;
/// Algorithm constants and runtime configuration defaults
pub mod configuration;
/// Error types for engine and I/O operations
pub mod error;
/// Image and mask loading plus result export
pub mod image;
/// Progress display for fill runs
pub mod progress;
