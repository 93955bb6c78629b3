//! Colour lookup tables indexed by inverse divergence.

use crate::escape::EscapeValue;
use crate::request::PaletteKind;

/// Straight RGBA bytes.
pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Maps an escape value to a colour.
pub trait Palette {
    fn color(&self, value: EscapeValue) -> Rgba;
}

/// Palette whose escape colours are computed once per iteration limit.
#[derive(Clone, Debug, PartialEq)]
pub struct CachePalette {
    member: Rgba,
    scale: Vec<Rgba>,
}

impl CachePalette {
    /// Tabulate `cacher(limit, i)` for every escape count below `limit`.
    pub fn new(iterate_limit: u32, member: Rgba, cacher: impl Fn(u32, u32) -> Rgba) -> Self {
        let scale = (0..iterate_limit).map(|i| cacher(iterate_limit, i)).collect();
        Self { member, scale }
    }

    pub fn for_kind(kind: PaletteKind, iterate_limit: u32) -> Self {
        match kind {
            PaletteKind::Redscale => Self::redscale(iterate_limit),
            PaletteKind::Grayscale => Self::grayscale(iterate_limit),
            PaletteKind::Pretty => Self::pretty(iterate_limit),
        }
    }

    /// Red fading from full brightness at escape count 0; members are black.
    pub fn redscale(iterate_limit: u32) -> Self {
        Self::new(iterate_limit, BLACK, |limit, index| {
            let calibrated = f64::from(limit - index);
            let interval = 255.0 / f64::from(limit);
            [(calibrated * interval) as u8, 0, 0, 255]
        })
    }

    /// Gray brightening with escape count; members are white.
    pub fn grayscale(iterate_limit: u32) -> Self {
        Self::new(iterate_limit, WHITE, |limit, index| {
            let gray = (f64::from(index) * 255.0 / f64::from(limit)) as u8;
            [gray, gray, gray, 255]
        })
    }

    /// Linear red, quadratic green and cubic blue curves; members are black.
    pub fn pretty(iterate_limit: u32) -> Self {
        Self::new(iterate_limit, BLACK, pretty_color)
    }
}

/// Channel values outside 0..=255 saturate.
fn pretty_color(limit: u32, index: u32) -> Rgba {
    let limit = f64::from(limit);
    let linear = limit - f64::from(index);

    let half_limit = limit / 2.08163265306122;
    let quart_limit = limit / 4.16326530612245;

    let qx = linear - half_limit;
    let qa = limit / (half_limit * half_limit);
    let quadratic = qa * qx * qx;

    let cx = linear - quart_limit;
    let ca = -limit / (quart_limit * quart_limit * quart_limit);
    let cubic = ca * cx * cx * cx;

    let interval = 255.0 / limit;
    [
        (linear * interval) as u8,
        (quadratic * interval) as u8,
        (cubic * interval) as u8,
        255,
    ]
}

impl Palette for CachePalette {
    fn color(&self, value: EscapeValue) -> Rgba {
        if value.in_set {
            return self.member;
        }
        self.scale
            .get(value.inv_div as usize)
            .copied()
            .unwrap_or(self.member)
    }
}
