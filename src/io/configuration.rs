//! Algorithm constants and runtime configuration defaults

// Patch geometry
/// Default patch half-width; footprints span (2r + 1) x (2r + 1) pixels
pub const DEFAULT_PATCH_RADIUS: usize = 4;

// Search settings
/// Default number of candidates retained by the first search stage
pub const DEFAULT_KNN: usize = 10;

// Auxiliary representation settings
/// Default radius of the masked box blur used for the comparison layer
pub const DEFAULT_BLUR_RADIUS: usize = 2;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed image dimension
pub const MAX_IMAGE_DIMENSION: usize = 10_000;

// Mask interpretation
/// Luminance at or above this value marks a pixel as a hole
pub const MASK_HOLE_THRESHOLD: u8 = 128;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_filled";
