//! Render planning and default parameters.
//!
//! `configure` turns a user [`Request`] into a concrete [`Info`]: it parses
//! the plane bounds, picks the arithmetic backend and its precision, applies
//! aspect correction and picks the render algorithm.

use crate::error::ConfigError;
use crate::info::{Info, NumericsStrategy, RenderStrategy};
use crate::plane::AspectFix;
use crate::precision::{
    digits_to_bits, required_precision_bits, significant_digits, MIN_ARBITRARY_PRECISION,
    NATIVE_DECIMAL_DIGITS, NATIVE_MANTISSA_BITS,
};
use crate::request::{NumericsMode, RenderMode, Request};
use crate::PlaneBounds;

/// Bounds of the full Mandelbrot set.
pub const MANDELBROT_REAL_MIN: &str = "-2.01";
pub const MANDELBROT_REAL_MAX: &str = "0.59";
pub const MANDELBROT_IMAG_MIN: &str = "-1.11";
pub const MANDELBROT_IMAG_MAX: &str = "1.13";

pub const DEFAULT_ITERATE_LIMIT: u32 = 255;
pub const DEFAULT_DIVERGE_LIMIT: f64 = 4.0;
pub const DEFAULT_IMAGE_WIDTH: u32 = 600;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 600;
pub const DEFAULT_JOBS: u32 = 1;
pub const DEFAULT_REGION_COLLAPSE: u32 = 4;
pub const DEFAULT_REGION_SAMPLES: u32 = 12;

/// Largest iteration limit; escape counts must fit the packed output buffer.
pub const MAX_ITERATE_LIMIT: u32 = 1 << 24;

pub const MAX_JOBS: u32 = 512;

/// Largest interior lattice side evaluated per uniform region.
pub const MAX_REGION_SAMPLES: u32 = 256;

/// Largest number of frames a zoom movie produces.
pub const MAX_ZOOM_FRAMES: u32 = 10_000;

/// Largest mantissa, requested or computed, the planner accepts.
pub const MAX_PRECISION: usize = 1 << 16;

/// Images of at most this many collapse-sized cells render sequentially under `Auto`.
pub const TINY_AREA_MULTIPLE: u64 = 16;

/// Binary exponent range trusted to the native backend; f64 subnormals start below -1022.
const NATIVE_EXPONENT_RANGE: f64 = 1000.0;

/// Resolve every automatic choice in `request`.
///
/// Fails before any render work if a field is out of range, a bound string
/// is malformed, or the plane window is empty.
pub fn configure(request: &Request) -> Result<Info, ConfigError> {
    validate_request(request)?;

    let (numerics_strategy, precision) = choose_numerics(request)?;

    let [real_min, real_max, imag_min, imag_max] = request.bound_strings();
    let mut bounds = PlaneBounds::parse(real_min, real_max, imag_min, imag_max, precision)?;
    bounds.validate()?;

    if request.fix_aspect != AspectFix::Stretch {
        log::debug!("Fixing aspect ratio with {:?}", request.fix_aspect);
        bounds = bounds.fix_aspect(
            request.fix_aspect,
            request.image_width,
            request.image_height,
        );
    }

    let render_strategy = choose_render_strategy(request);

    log::debug!(
        "Configured {:?} render with {:?} numerics at {} bits",
        render_strategy,
        numerics_strategy,
        precision
    );

    Ok(Info {
        request: request.clone(),
        render_strategy,
        numerics_strategy,
        precision,
        bounds,
    })
}

fn validate_request(request: &Request) -> Result<(), ConfigError> {
    if request.iterate_limit == 0 || request.iterate_limit > MAX_ITERATE_LIMIT {
        return Err(ConfigError::field(
            "iterate_limit",
            format!("{} is outside 1..={}", request.iterate_limit, MAX_ITERATE_LIMIT),
        ));
    }

    if !request.diverge_limit.is_finite() || request.diverge_limit <= 0.0 {
        return Err(ConfigError::field(
            "diverge_limit",
            format!("{} is not a positive finite number", request.diverge_limit),
        ));
    }

    if request.jobs == 0 || request.jobs > MAX_JOBS {
        return Err(ConfigError::field(
            "jobs",
            format!("{} is outside 1..={}", request.jobs, MAX_JOBS),
        ));
    }

    if request.region_samples > MAX_REGION_SAMPLES {
        return Err(ConfigError::field(
            "region_samples",
            format!("{} exceeds the maximum of {}", request.region_samples, MAX_REGION_SAMPLES),
        ));
    }

    if request.image_width == 0 {
        return Err(ConfigError::field("image_width", "must be at least 1"));
    }

    if request.image_height == 0 {
        return Err(ConfigError::field("image_height", "must be at least 1"));
    }

    if request.precision > MAX_PRECISION {
        return Err(ConfigError::field(
            "precision",
            format!("{} bits exceeds the maximum of {}", request.precision, MAX_PRECISION),
        ));
    }

    Ok(())
}

/// Pick the backend and its mantissa width.
fn choose_numerics(request: &Request) -> Result<(NumericsStrategy, usize), ConfigError> {
    let digits = request
        .bound_strings()
        .iter()
        .map(|s| significant_digits(s))
        .max()
        .unwrap_or_default();
    let digit_bits = digits_to_bits(digits);

    // Parse wide enough to keep every written digit while estimating
    let probe_bits = digit_bits.max(MIN_ARBITRARY_PRECISION);
    let [real_min, real_max, imag_min, imag_max] = request.bound_strings();
    let probe = PlaneBounds::parse(real_min, real_max, imag_min, imag_max, probe_bits)?;
    probe.validate()?;

    let image_size = (request.image_width, request.image_height);
    let computed = required_precision_bits(&probe, image_size, request.iterate_limit);
    let arbitrary_bits = if request.precision > 0 {
        request.precision.max(MIN_ARBITRARY_PRECISION)
    } else {
        computed.max(digit_bits).max(MIN_ARBITRARY_PRECISION)
    };

    let choice = match request.numerics {
        NumericsMode::Native => (NumericsStrategy::Native, NATIVE_MANTISSA_BITS),
        NumericsMode::Arbitrary => (NumericsStrategy::Arbitrary, arbitrary_bits),
        NumericsMode::Auto => {
            let required = if request.precision > 0 {
                request.precision
            } else {
                computed
            };

            let needs_arbitrary = required > NATIVE_MANTISSA_BITS
                || digits > NATIVE_DECIMAL_DIGITS
                || !within_native_range(&probe, image_size);

            if needs_arbitrary {
                (NumericsStrategy::Arbitrary, arbitrary_bits)
            } else {
                (NumericsStrategy::Native, NATIVE_MANTISSA_BITS)
            }
        }
    };

    if choice.1 > MAX_PRECISION {
        return Err(ConfigError::field(
            "precision",
            format!("window needs {} bits, above the maximum of {}", choice.1, MAX_PRECISION),
        ));
    }

    log::debug!(
        "Numerics {:?} resolved to {:?}: {} bits (computed {}, {} significant digits)",
        request.numerics,
        choice.0,
        choice.1,
        computed,
        digits
    );

    Ok(choice)
}

/// True when bounds and per-pixel extents stay inside the normal f64 exponent range.
fn within_native_range(bounds: &PlaneBounds, (width, height): (u32, u32)) -> bool {
    let in_range = |log2: f64| log2 == f64::NEG_INFINITY || log2.abs() < NATIVE_EXPONENT_RANGE;

    let pixel_extents = [
        bounds.width().log2_approx() - f64::from(width).log2(),
        bounds.height().log2_approx() - f64::from(height).log2(),
    ];

    bounds
        .values()
        .iter()
        .map(|b| b.log2_approx())
        .chain(pixel_extents)
        .all(in_range)
}

fn choose_render_strategy(request: &Request) -> RenderStrategy {
    match request.render_mode {
        RenderMode::Sequence => RenderStrategy::Sequence,
        RenderMode::Region => RenderStrategy::Region,
        RenderMode::SharedRegion => RenderStrategy::SharedRegion,
        RenderMode::Auto => {
            let area = u64::from(request.image_width) * u64::from(request.image_height);
            let cell = u64::from(request.region_collapse.max(1));

            if request.jobs == 1 || area <= TINY_AREA_MULTIPLE * cell * cell {
                RenderStrategy::Sequence
            } else {
                RenderStrategy::SharedRegion
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_native_sequence() {
        let info = configure(&Request::default()).unwrap();
        assert_eq!(info.numerics_strategy, NumericsStrategy::Native);
        assert_eq!(info.precision, NATIVE_MANTISSA_BITS);
        assert_eq!(info.render_strategy, RenderStrategy::Sequence);
        assert_eq!(info.bounds.real_min.to_f64(), -2.01);
    }

    #[test]
    fn many_jobs_on_large_image_share_regions() {
        let request = Request {
            jobs: 4,
            ..Request::default()
        };
        let info = configure(&request).unwrap();
        assert_eq!(info.render_strategy, RenderStrategy::SharedRegion);
    }

    #[test]
    fn tiny_image_renders_sequentially() {
        let request = Request {
            jobs: 4,
            image_width: 16,
            image_height: 16,
            ..Request::default()
        };
        assert_eq!(configure(&request).unwrap().render_strategy, RenderStrategy::Sequence);

        let request = Request {
            image_width: 17,
            ..request
        };
        assert_eq!(configure(&request).unwrap().render_strategy, RenderStrategy::SharedRegion);
    }

    #[test]
    fn explicit_modes_are_honoured() {
        let request = Request {
            render_mode: RenderMode::Region,
            numerics: NumericsMode::Arbitrary,
            precision: 100,
            ..Request::default()
        };
        let info = configure(&request).unwrap();
        assert_eq!(info.render_strategy, RenderStrategy::Region);
        assert_eq!(info.numerics_strategy, NumericsStrategy::Arbitrary);
        assert_eq!(info.precision, 100);
        assert_eq!(info.bounds.precision_bits(), 100);
    }

    #[test]
    fn explicit_arbitrary_floors_precision() {
        let request = Request {
            numerics: NumericsMode::Arbitrary,
            ..Request::default()
        };
        let info = configure(&request).unwrap();
        assert_eq!(info.precision, MIN_ARBITRARY_PRECISION);
    }

    #[test]
    fn many_digits_force_arbitrary() {
        let request = Request::with_bounds("-2.0100000000000001", "0.59", "-1.11", "1.13");
        let info = configure(&request).unwrap();
        assert_eq!(info.numerics_strategy, NumericsStrategy::Arbitrary);
        assert!(info.precision >= digits_to_bits(17));
    }

    #[test]
    fn tiny_magnitudes_force_arbitrary() {
        let request = Request::with_bounds("0", "1e-400", "0", "1e-400");
        let info = configure(&request).unwrap();
        assert_eq!(info.numerics_strategy, NumericsStrategy::Arbitrary);
        assert!(info.bounds.real_max > info.bounds.real_min);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases = [
            ("iterate_limit", Request { iterate_limit: 0, ..Request::default() }),
            (
                "iterate_limit",
                Request {
                    iterate_limit: MAX_ITERATE_LIMIT + 1,
                    ..Request::default()
                },
            ),
            ("diverge_limit", Request { diverge_limit: 0.0, ..Request::default() }),
            ("diverge_limit", Request { diverge_limit: f64::NAN, ..Request::default() }),
            ("jobs", Request { jobs: 0, ..Request::default() }),
            ("jobs", Request { jobs: MAX_JOBS + 1, ..Request::default() }),
            (
                "region_samples",
                Request {
                    region_samples: MAX_REGION_SAMPLES + 1,
                    ..Request::default()
                },
            ),
            ("image_width", Request { image_width: 0, ..Request::default() }),
            ("image_height", Request { image_height: 0, ..Request::default() }),
            ("precision", Request { precision: MAX_PRECISION + 1, ..Request::default() }),
        ];

        for (field, request) in cases {
            let err = configure(&request).unwrap_err();
            assert_eq!(err.field_name(), Some(field), "{:?}", err);
        }
    }

    #[test]
    fn rejects_malformed_and_inverted_bounds() {
        let err = configure(&Request::with_bounds("-2", "x", "-1", "1")).unwrap_err();
        assert_eq!(err.field_name(), Some("real_max"));

        let err = configure(&Request::with_bounds("1", "-1", "-1", "1")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds(_)));
    }

    #[test]
    fn aspect_fix_applies_after_parsing() {
        let request = Request {
            fix_aspect: AspectFix::Shrink,
            ..Request::with_bounds("-2", "2", "-1", "1")
        };
        let info = configure(&request).unwrap();
        assert_eq!(info.bounds.real_max.to_f64(), 0.0);
        assert_eq!(info.to_request().real_max, "0");
    }
}
