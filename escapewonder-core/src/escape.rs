// escapewonder-core/src/escape.rs

use serde::{Deserialize, Serialize};

/// Escape-time result for one plane point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscapeValue {
    /// Iterations taken before the orbit left the divergence limit.
    /// Equals the iteration limit for points that never left.
    pub inv_div: u32,
    /// Whether the point stayed bounded for the whole iteration limit.
    pub in_set: bool,
}

impl EscapeValue {
    pub fn new(inv_div: u32, in_set: bool) -> Self {
        Self { inv_div, in_set }
    }

    /// Value of a point that never escaped within `iterate_limit`.
    pub fn member(iterate_limit: u32) -> Self {
        Self {
            inv_div: iterate_limit,
            in_set: true,
        }
    }

    /// Value of a point that escaped after `iterations`.
    pub fn escaped(iterations: u32) -> Self {
        Self {
            inv_div: iterations,
            in_set: false,
        }
    }
}

/// One resolved pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelMember {
    pub x: u32,
    pub y: u32,
    pub value: EscapeValue,
}

impl PixelMember {
    pub fn new(x: u32, y: u32, value: EscapeValue) -> Self {
        Self { x, y, value }
    }
}
