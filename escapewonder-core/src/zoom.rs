//! Zooming from a rendered image into a pixel rectangle of it.

use crate::config::{configure, MAX_PRECISION, MAX_ZOOM_FRAMES};
use crate::coords::{BigMapper, CoordinateMapper};
use crate::error::ConfigError;
use crate::info::{Info, NumericsStrategy};
use crate::plane::AspectFix;
use crate::precision::{required_precision_bits, MIN_ARBITRARY_PRECISION};
use crate::request::{NumericsMode, ZoomTarget};
use crate::{BigFloat, PlaneBounds};
use serde::{Deserialize, Serialize};

/// A zoom from a previous render towards a target rectangle of its pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub prev: Info,
    pub target: ZoomTarget,
}

impl Zoom {
    pub fn new(prev: Info, target: ZoomTarget) -> Self {
        Self { prev, target }
    }

    /// Descriptor `degree` of the way from the previous window to the target.
    ///
    /// Degree 1 is the complete zoom, 0 the previous window. The target
    /// rectangle is validated against the previous image first.
    pub fn magnify(&self, degree: f64) -> Result<Info, ConfigError> {
        self.magnify_from(degree, self.prev.precision)
    }

    /// `frames` descriptors at degrees `k / frames`, ending on the target.
    ///
    /// With `increase_precision` each frame starts from the previous frame's
    /// precision, so precision never drops along the sequence.
    pub fn movie(&self) -> Result<Vec<Info>, ConfigError> {
        let (width, height) = self.prev.image_size();
        self.target.bounds.validate(width, height)?;

        let frames = self.target.frames;
        if frames > MAX_ZOOM_FRAMES {
            return Err(ConfigError::InvalidZoom(format!(
                "{} frames exceeds the maximum of {}",
                frames, MAX_ZOOM_FRAMES
            )));
        }
        log::debug!("Zooming over {} frames", frames);

        let mut sequence = Vec::new();
        let mut floor = self.prev.precision;

        for k in 1..=frames {
            let degree = f64::from(k) / f64::from(frames);
            let info = self.magnify_from(degree, floor)?;
            if self.target.increase_precision {
                floor = floor.max(info.precision);
            }
            sequence.push(info);
        }

        Ok(sequence)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    fn magnify_from(&self, degree: f64, floor_bits: usize) -> Result<Info, ConfigError> {
        if !(0.0..=1.0).contains(&degree) {
            return Err(ConfigError::InvalidZoom(format!(
                "degree {} is outside 0..=1",
                degree
            )));
        }

        let (width, height) = self.prev.image_size();
        self.target.bounds.validate(width, height)?;

        let info = if self.target.increase_precision {
            self.escalate(degree, floor_bits)?
        } else {
            self.lensed(degree, self.prev.precision, self.prev.numerics_strategy)
        };

        if self.target.reconfigure {
            log::debug!("Reconfiguring zoomed descriptor");
            configure(&info.to_request())
        } else {
            Ok(info)
        }
    }

    /// Arbitrary-precision frame at no fewer bits than `floor_bits` or the window needs.
    fn escalate(&self, degree: f64, floor_bits: usize) -> Result<Info, ConfigError> {
        let mut bits = floor_bits.max(MIN_ARBITRARY_PRECISION);

        loop {
            let info = self.lensed(degree, bits, NumericsStrategy::Arbitrary);
            let required =
                required_precision_bits(&info.bounds, info.image_size(), info.request.iterate_limit);

            if required <= bits {
                return Ok(info);
            }

            if required > MAX_PRECISION {
                return Err(ConfigError::field(
                    "precision",
                    format!("zoom needs {} bits, above the maximum of {}", required, MAX_PRECISION),
                ));
            }

            log::debug!("Zoom precision increased from {} to {} bits", bits, required);
            bits = required;
        }
    }

    fn lensed(&self, degree: f64, precision: usize, numerics: NumericsStrategy) -> Info {
        let bounds = self.lens(degree, precision);

        let mut request = self.prev.request.clone();
        request.fix_aspect = AspectFix::Stretch;
        if numerics == NumericsStrategy::Arbitrary && self.target.increase_precision {
            request.numerics = NumericsMode::Arbitrary;
            request.precision = precision;
        }

        let info = Info {
            request,
            render_strategy: self.prev.render_strategy,
            numerics_strategy: numerics,
            precision,
            bounds,
        };

        Info {
            request: info.to_request(),
            ..info
        }
    }

    fn lens(&self, degree: f64, precision: usize) -> PlaneBounds {
        let (width, height) = self.prev.image_size();
        let mapper = BigMapper::new(&self.prev.bounds, width, height, precision);
        let zoom = &self.target.bounds;

        // Pixel rows grow downward, so ymax gives the lower imaginary bound
        let (real_min, imag_min) = mapper.pixel_to_plane(zoom.xmin, zoom.ymax);
        let (real_max, imag_max) = mapper.pixel_to_plane(zoom.xmax, zoom.ymin);

        let time = BigFloat::with_precision(degree, precision);
        let prev = self.prev.bounds.with_precision(precision);
        let toward = |from: &BigFloat, to: &BigFloat| from.add(&to.sub(from).mul(&time));

        PlaneBounds::new(
            toward(&prev.real_min, &real_min),
            toward(&prev.real_max, &real_max),
            toward(&prev.imag_min, &imag_min),
            toward(&prev.imag_max, &imag_max),
        )
    }
}
