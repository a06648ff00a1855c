//! Pixel-domain primitives: vertices, clipped regions, and neighborhood iteration
//!
//! Vertices are plain `[row, col]` pairs owned by the image rectangle; regions
//! are half-open row/col spans that are always clipped to image bounds at
//! construction, so downstream code never has to re-check bounds.

/// A pixel coordinate as `[row, col]`
pub type Vertex = [usize; 2];

/// Image dimensions as `(rows, cols)`
pub type Dimensions = (usize, usize);

/// An axis-aligned rectangle of pixels with half-open spans
///
/// Regions produced by [`region_around`] are pre-clipped to the image, so a
/// patch footprint near the border is simply smaller than the nominal
/// `(2r + 1)²` square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// First row (inclusive)
    pub row_start: usize,
    /// Past-the-end row
    pub row_end: usize,
    /// First column (inclusive)
    pub col_start: usize,
    /// Past-the-end column
    pub col_end: usize,
}

impl Region {
    /// Create a region, clamping the spans so they are never inverted
    pub const fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end: if row_end < row_start {
                row_start
            } else {
                row_end
            },
            col_start,
            col_end: if col_end < col_start {
                col_start
            } else {
                col_end
            },
        }
    }

    /// Number of rows spanned
    pub const fn height(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Number of columns spanned
    pub const fn width(&self) -> usize {
        self.col_end - self.col_start
    }

    /// Total pixel count
    pub const fn area(&self) -> usize {
        self.height() * self.width()
    }

    /// Whether the region contains no pixels
    pub const fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Whether a vertex lies inside the region
    pub const fn contains(&self, v: Vertex) -> bool {
        v[0] >= self.row_start
            && v[0] < self.row_end
            && v[1] >= self.col_start
            && v[1] < self.col_end
    }

    /// Iterate all vertices in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Vertex> {
        let (rs, re, cs, ce) = (self.row_start, self.row_end, self.col_start, self.col_end);
        (rs..re).flat_map(move |r| (cs..ce).map(move |c| [r, c]))
    }
}

/// The clipped square region of half-width `radius` centered at a vertex
pub const fn region_around(center: Vertex, radius: usize, dims: Dimensions) -> Region {
    let row_start = center[0].saturating_sub(radius);
    let col_start = center[1].saturating_sub(radius);

    let row_end_unclipped = center[0] + radius + 1;
    let col_end_unclipped = center[1] + radius + 1;

    let row_end = if row_end_unclipped > dims.0 {
        dims.0
    } else {
        row_end_unclipped
    };
    let col_end = if col_end_unclipped > dims.1 {
        dims.1
    } else {
        col_end_unclipped
    };

    Region::new(row_start, row_end, col_start, col_end)
}

/// Whether a region is the full unclipped square for the given radius
pub const fn is_unclipped(region: &Region, radius: usize) -> bool {
    let side = 2 * radius + 1;
    region.height() == side && region.width() == side
}

/// Iterate the 8-neighborhood of a vertex, clipped to image bounds
pub fn neighbors8(v: Vertex, dims: Dimensions) -> impl Iterator<Item = Vertex> {
    let deltas: [[i64; 2]; 8] = [
        [-1, -1],
        [-1, 0],
        [-1, 1],
        [0, -1],
        [0, 1],
        [1, -1],
        [1, 0],
        [1, 1],
    ];

    deltas.into_iter().filter_map(move |d| {
        let r = v[0] as i64 + d[0];
        let c = v[1] as i64 + d[1];
        (r >= 0 && c >= 0 && (r as usize) < dims.0 && (c as usize) < dims.1)
            .then(|| [r as usize, c as usize])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_clips_at_origin() {
        let region = region_around([0, 1], 2, (10, 10));
        assert_eq!(region, Region::new(0, 3, 0, 4));
        assert!(!is_unclipped(&region, 2));
    }

    #[test]
    fn region_clips_at_far_edge() {
        let region = region_around([9, 9], 1, (10, 10));
        assert_eq!(region, Region::new(8, 10, 8, 10));
        assert_eq!(region.area(), 4);
    }

    #[test]
    fn interior_region_is_unclipped() {
        let region = region_around([5, 5], 2, (10, 10));
        assert_eq!(region.area(), 25);
        assert!(is_unclipped(&region, 2));
    }

    #[test]
    fn iteration_is_row_major() {
        let region = Region::new(1, 3, 4, 6);
        let vertices: Vec<Vertex> = region.iter().collect();
        assert_eq!(vertices, vec![[1, 4], [1, 5], [2, 4], [2, 5]]);
    }

    #[test]
    fn neighbors_clip_at_corner() {
        let neighbors: Vec<Vertex> = neighbors8([0, 0], (4, 4)).collect();
        assert_eq!(neighbors, vec![[0, 1], [1, 0], [1, 1]]);
    }

    #[test]
    fn interior_vertex_has_eight_neighbors() {
        assert_eq!(neighbors8([2, 2], (5, 5)).count(), 8);
    }
}
