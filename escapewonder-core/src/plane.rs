use crate::error::ConfigError;
use crate::BigFloat;
use serde::{Deserialize, Serialize};

/// How to reconcile a plane window whose aspect differs from the picture's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectFix {
    /// Leave the window alone; pixels are not square on the plane.
    #[default]
    Stretch,
    /// Cut the longer plane side down to the picture's aspect.
    Shrink,
    /// Extend the shorter plane side up to the picture's aspect.
    Grow,
}

/// Window on the complex plane with BigFloat precision
///
/// Real axis grows to the right, imaginary axis grows upward; the picture's
/// row 0 lies at `imag_max`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneBounds {
    pub real_min: BigFloat,
    pub real_max: BigFloat,
    pub imag_min: BigFloat,
    pub imag_max: BigFloat,
}

impl PlaneBounds {
    pub fn new(
        real_min: BigFloat,
        real_max: BigFloat,
        imag_min: BigFloat,
        imag_max: BigFloat,
    ) -> Self {
        Self {
            real_min,
            real_max,
            imag_min,
            imag_max,
        }
    }

    /// Create bounds from f64 values with explicit precision
    pub fn from_f64(
        real_min: f64,
        real_max: f64,
        imag_min: f64,
        imag_max: f64,
        precision_bits: usize,
    ) -> Self {
        Self {
            real_min: BigFloat::with_precision(real_min, precision_bits),
            real_max: BigFloat::with_precision(real_max, precision_bits),
            imag_min: BigFloat::with_precision(imag_min, precision_bits),
            imag_max: BigFloat::with_precision(imag_max, precision_bits),
        }
    }

    /// Parse the four decimal bound strings, naming the first one that fails.
    pub fn parse(
        real_min: &str,
        real_max: &str,
        imag_min: &str,
        imag_max: &str,
        precision_bits: usize,
    ) -> Result<Self, ConfigError> {
        let parse = |field: &'static str, text: &str| {
            BigFloat::parse(text, precision_bits).map_err(|source| ConfigError::Parse { field, source })
        };

        Ok(Self {
            real_min: parse("real_min", real_min)?,
            real_max: parse("real_max", real_max)?,
            imag_min: parse("imag_min", imag_min)?,
            imag_max: parse("imag_max", imag_max)?,
        })
    }

    /// Bounds in the order real_min, real_max, imag_min, imag_max.
    pub fn values(&self) -> [&BigFloat; 4] {
        [&self.real_min, &self.real_max, &self.imag_min, &self.imag_max]
    }

    pub fn width(&self) -> BigFloat {
        self.real_max.sub(&self.real_min)
    }

    pub fn height(&self) -> BigFloat {
        self.imag_max.sub(&self.imag_min)
    }

    /// Precision of the narrowest bound.
    pub fn precision_bits(&self) -> usize {
        self.values()
            .iter()
            .map(|b| b.precision_bits())
            .min()
            .unwrap_or_default()
    }

    /// Re-express all four bounds at `precision_bits`.
    pub fn with_precision(&self, precision_bits: usize) -> Self {
        Self {
            real_min: self.real_min.with_new_precision(precision_bits),
            real_max: self.real_max.with_new_precision(precision_bits),
            imag_min: self.imag_min.with_new_precision(precision_bits),
            imag_max: self.imag_max.with_new_precision(precision_bits),
        }
    }

    /// Reject windows whose minimum is not strictly below the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.real_min >= self.real_max {
            return Err(ConfigError::InvalidBounds(format!(
                "real_min {} is not below real_max {}",
                self.real_min, self.real_max
            )));
        }
        if self.imag_min >= self.imag_max {
            return Err(ConfigError::InvalidBounds(format!(
                "imag_min {} is not below imag_max {}",
                self.imag_min, self.imag_max
            )));
        }
        Ok(())
    }

    /// Adjust the window so its aspect matches a `picture_width × picture_height` image.
    ///
    /// Minimum bounds stay fixed; only `real_max` or `imag_max` move.
    pub fn fix_aspect(&self, fix: AspectFix, picture_width: u32, picture_height: u32) -> Self {
        let precision = self.precision_bits();
        let plane_width = self.width();
        let plane_height = self.height();
        let plane_aspect = plane_width.div(&plane_height);

        let picture_aspect = BigFloat::from_u32(picture_width, precision)
            .div(&BigFloat::from_u32(picture_height, precision));

        let adjust_width = || {
            let mut fixed = self.clone();
            fixed.real_max = self.real_min.add(&plane_height.mul(&picture_aspect));
            fixed
        };

        let adjust_height = || {
            let mut fixed = self.clone();
            fixed.imag_max = self.imag_min.add(&plane_width.div(&picture_aspect));
            fixed
        };

        let too_wide = plane_aspect > picture_aspect;
        let too_tall = plane_aspect < picture_aspect;

        match fix {
            AspectFix::Stretch => self.clone(),
            // Grow: a wide plane gets taller, a tall plane gets wider
            AspectFix::Grow if too_wide => adjust_height(),
            AspectFix::Grow if too_tall => adjust_width(),
            // Shrink: a wide plane gets narrower, a tall plane gets shorter
            AspectFix::Shrink if too_wide => adjust_width(),
            AspectFix::Shrink if too_tall => adjust_height(),
            _ => self.clone(),
        }
    }
}
