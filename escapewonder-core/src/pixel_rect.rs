use serde::{Deserialize, Serialize};

/// Rectangle in pixel space (always u32 coordinates)
///
/// Half-open: covers `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create new pixel rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole image.
    pub fn image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Calculate area in pixels
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// True when either side is at most `threshold` pixels.
    pub fn collapses_at(&self, threshold: u32) -> bool {
        self.width <= threshold || self.height <= threshold
    }

    /// The four corner pixels: top-left, top-right, bottom-left, bottom-right.
    ///
    /// Only meaningful for non-empty rectangles.
    pub fn corners(&self) -> [(u32, u32); 4] {
        let right = self.x + self.width.saturating_sub(1);
        let bottom = self.y + self.height.saturating_sub(1);
        [
            (self.x, self.y),
            (right, self.y),
            (self.x, bottom),
            (right, bottom),
        ]
    }

    /// Split into four children: [top_left, top_right, bottom_left, bottom_right].
    ///
    /// For odd dimensions the left/top children take the extra column/row.
    /// Children are disjoint and their union is exactly `self`. A side of
    /// length 1 yields empty right or bottom children.
    pub fn quarter(&self) -> [PixelRect; 4] {
        let left_w = self.width - self.width / 2;
        let right_w = self.width - left_w;
        let top_h = self.height - self.height / 2;
        let bottom_h = self.height - top_h;

        [
            PixelRect::new(self.x, self.y, left_w, top_h),
            PixelRect::new(self.x + left_w, self.y, right_w, top_h),
            PixelRect::new(self.x, self.y + top_h, left_w, bottom_h),
            PixelRect::new(self.x + left_w, self.y + top_h, right_w, bottom_h),
        ]
    }

    /// Deterministic interior sample lattice of up to `count × count` pixels.
    ///
    /// Positions sit at fractions `i / (count + 1)` of the span between the
    /// corners on each axis; positions that round onto the same pixel are
    /// taken once.
    pub fn sample_lattice(&self, count: u32) -> Vec<(u32, u32)> {
        if self.is_empty() || count == 0 {
            return Vec::new();
        }

        let columns = lattice_axis(self.x, self.width, count);
        let rows = lattice_axis(self.y, self.height, count);

        rows.iter()
            .flat_map(|&py| columns.iter().map(move |&px| (px, py)))
            .collect()
    }

    /// Row-major iterator over every pixel coordinate.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> {
        let rect = *self;
        (rect.y..rect.y + rect.height)
            .flat_map(move |py| (rect.x..rect.x + rect.width).map(move |px| (px, py)))
    }
}

fn lattice_axis(origin: u32, length: u32, count: u32) -> Vec<u32> {
    let span = u64::from(length - 1);
    let divisions = u64::from(count) + 1;
    let mut positions: Vec<u32> = (1..=u64::from(count))
        .map(|i| origin + (span * i / divisions) as u32)
        .collect();
    positions.dedup();
    positions
}
