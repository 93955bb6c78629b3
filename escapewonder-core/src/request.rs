use crate::config::{
    DEFAULT_DIVERGE_LIMIT, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_ITERATE_LIMIT,
    DEFAULT_JOBS, DEFAULT_REGION_COLLAPSE, DEFAULT_REGION_SAMPLES, MANDELBROT_IMAG_MAX,
    MANDELBROT_IMAG_MIN, MANDELBROT_REAL_MAX, MANDELBROT_REAL_MIN,
};
use crate::error::ConfigError;
use crate::plane::AspectFix;
use serde::{Deserialize, Serialize};

/// Requested render algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Auto,
    Sequence,
    Region,
    SharedRegion,
}

/// Requested arithmetic backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericsMode {
    #[default]
    Auto,
    Native,
    Arbitrary,
}

/// Colour lookup table used when drawing a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    #[default]
    Grayscale,
    Redscale,
    Pretty,
}

/// User description of a render.
///
/// Plane bounds stay decimal strings so they can carry more digits than an
/// f64. Missing fields deserialize to their `Default` values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub real_min: String,
    pub real_max: String,
    pub imag_min: String,
    pub imag_max: String,
    pub iterate_limit: u32,
    /// Compared against |z|².
    pub diverge_limit: f64,
    pub image_width: u32,
    pub image_height: u32,
    pub render_mode: RenderMode,
    pub numerics: NumericsMode,
    pub jobs: u32,
    /// Regions with a side at or below this many pixels are scanned exhaustively.
    pub region_collapse: u32,
    /// Interior samples per axis used to confirm a uniform region.
    pub region_samples: u32,
    /// Mantissa bits; 0 lets the planner compute them.
    pub precision: usize,
    pub fix_aspect: AspectFix,
    pub palette: PaletteKind,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            real_min: MANDELBROT_REAL_MIN.to_string(),
            real_max: MANDELBROT_REAL_MAX.to_string(),
            imag_min: MANDELBROT_IMAG_MIN.to_string(),
            imag_max: MANDELBROT_IMAG_MAX.to_string(),
            iterate_limit: DEFAULT_ITERATE_LIMIT,
            diverge_limit: DEFAULT_DIVERGE_LIMIT,
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            render_mode: RenderMode::Auto,
            numerics: NumericsMode::Auto,
            jobs: DEFAULT_JOBS,
            region_collapse: DEFAULT_REGION_COLLAPSE,
            region_samples: DEFAULT_REGION_SAMPLES,
            precision: 0,
            fix_aspect: AspectFix::Stretch,
            palette: PaletteKind::Grayscale,
        }
    }
}

impl Request {
    /// Request for the given plane window, defaults elsewhere.
    pub fn with_bounds(real_min: &str, real_max: &str, imag_min: &str, imag_max: &str) -> Self {
        Self {
            real_min: real_min.to_string(),
            real_max: real_max.to_string(),
            imag_min: imag_min.to_string(),
            imag_max: imag_max.to_string(),
            ..Self::default()
        }
    }

    /// Bound strings in the order real_min, real_max, imag_min, imag_max.
    pub fn bound_strings(&self) -> [&str; 4] {
        [&self.real_min, &self.real_max, &self.imag_min, &self.imag_max]
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pixel rectangle of a previous image to zoom into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub xmin: u32,
    pub xmax: u32,
    pub ymin: u32,
    pub ymax: u32,
}

impl ZoomBounds {
    pub fn new(xmin: u32, xmax: u32, ymin: u32, ymax: u32) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Reject empty or inverted rectangles and rectangles reaching past a
    /// `width × height` picture.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if self.xmin >= self.xmax {
            return Err(ConfigError::InvalidZoom(format!(
                "xmin {} is not below xmax {}",
                self.xmin, self.xmax
            )));
        }
        if self.ymin >= self.ymax {
            return Err(ConfigError::InvalidZoom(format!(
                "ymin {} is not below ymax {}",
                self.ymin, self.ymax
            )));
        }
        if self.xmax > width || self.ymax > height {
            return Err(ConfigError::InvalidZoom(format!(
                "({}, {}) lies outside the {}x{} image",
                self.xmax, self.ymax, width, height
            )));
        }
        Ok(())
    }
}

/// Where and how to zoom from a previous render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomTarget {
    #[serde(flatten)]
    pub bounds: ZoomBounds,
    /// Re-run configuration against the zoomed window.
    #[serde(default)]
    pub reconfigure: bool,
    /// Switch to the arbitrary backend and never lower the precision.
    #[serde(default)]
    pub increase_precision: bool,
    /// Frames in a zoom sequence.
    #[serde(default)]
    pub frames: u32,
}
