//! Mapping between pixel indices and plane coordinates.
//!
//! Pixel (0, 0) is the top-left of the picture and sits at
//! (`real_min`, `imag_max`) on the plane; rows grow downward while the
//! imaginary axis grows upward.

use crate::{BigFloat, PlaneBounds};

/// Bidirectional pixel/plane mapping over one picture.
pub trait CoordinateMapper {
    /// Plane coordinate type.
    type Scalar;

    /// Plane coordinate of the top-left corner of pixel (x, y).
    fn pixel_to_plane(&self, x: u32, y: u32) -> (Self::Scalar, Self::Scalar);

    /// Nearest pixel to a plane coordinate. May fall outside the picture.
    fn plane_to_pixel(&self, re: &Self::Scalar, im: &Self::Scalar) -> (i64, i64);

    /// Plane extent of one pixel along each axis.
    fn pixel_size(&self) -> (Self::Scalar, Self::Scalar);

    /// Picture dimensions in pixels.
    fn picture_size(&self) -> (u32, u32);
}

fn round_to_pixel(position: f64) -> i64 {
    (position + 0.5).floor() as i64
}

/// f64 mapper for the native backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NativeMapper {
    real_min: f64,
    imag_max: f64,
    real_unit: f64,
    imag_unit: f64,
    width: u32,
    height: u32,
}

impl NativeMapper {
    pub fn new(bounds: &PlaneBounds, width: u32, height: u32) -> Self {
        let plane_width = bounds.width().to_f64();
        let plane_height = bounds.height().to_f64();

        Self {
            real_min: bounds.real_min.to_f64(),
            imag_max: bounds.imag_max.to_f64(),
            real_unit: plane_width / f64::from(width.max(1)),
            imag_unit: plane_height / f64::from(height.max(1)),
            width,
            height,
        }
    }
}

impl CoordinateMapper for NativeMapper {
    type Scalar = f64;

    fn pixel_to_plane(&self, x: u32, y: u32) -> (f64, f64) {
        (
            self.real_min + f64::from(x) * self.real_unit,
            self.imag_max - f64::from(y) * self.imag_unit,
        )
    }

    fn plane_to_pixel(&self, re: &f64, im: &f64) -> (i64, i64) {
        let x = (re - self.real_min) / self.real_unit;
        // Rows are drawn downward
        let y = (self.imag_max - im) / self.imag_unit;
        (round_to_pixel(x), round_to_pixel(y))
    }

    fn pixel_size(&self) -> (f64, f64) {
        (self.real_unit, self.imag_unit)
    }

    fn picture_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// BigFloat mapper for the arbitrary-precision backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BigMapper {
    real_min: BigFloat,
    imag_max: BigFloat,
    real_unit: BigFloat,
    imag_unit: BigFloat,
    width: u32,
    height: u32,
    precision_bits: usize,
}

impl BigMapper {
    /// Build a mapper whose arithmetic runs at `precision_bits`.
    pub fn new(bounds: &PlaneBounds, width: u32, height: u32, precision_bits: usize) -> Self {
        let bounds = bounds.with_precision(precision_bits);
        let picture_width = BigFloat::from_u32(width.max(1), precision_bits);
        let picture_height = BigFloat::from_u32(height.max(1), precision_bits);

        Self {
            real_unit: bounds.width().div(&picture_width),
            imag_unit: bounds.height().div(&picture_height),
            real_min: bounds.real_min,
            imag_max: bounds.imag_max,
            width,
            height,
            precision_bits,
        }
    }

    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }
}

impl CoordinateMapper for BigMapper {
    type Scalar = BigFloat;

    fn pixel_to_plane(&self, x: u32, y: u32) -> (BigFloat, BigFloat) {
        let x = BigFloat::from_u32(x, self.precision_bits);
        let y = BigFloat::from_u32(y, self.precision_bits);

        let re = self.real_min.add(&x.mul(&self.real_unit));
        let im = self.imag_max.sub(&y.mul(&self.imag_unit));
        (re, im)
    }

    fn plane_to_pixel(&self, re: &BigFloat, im: &BigFloat) -> (i64, i64) {
        let x = re.sub(&self.real_min).div(&self.real_unit);
        let y = self.imag_max.sub(im).div(&self.imag_unit);
        (round_to_pixel(x.to_f64()), round_to_pixel(y.to_f64()))
    }

    fn pixel_size(&self) -> (BigFloat, BigFloat) {
        (self.real_unit.clone(), self.imag_unit.clone())
    }

    fn picture_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_window() -> PlaneBounds {
        PlaneBounds::from_f64(0.0, 10.0, 0.0, 10.0, 53)
    }

    #[test]
    fn native_origin_is_top_left() {
        let mapper = NativeMapper::new(&unit_window(), 10, 10);
        assert_eq!(mapper.pixel_to_plane(0, 0), (0.0, 10.0));
        assert_eq!(mapper.pixel_to_plane(5, 5), (5.0, 5.0));
        assert_eq!(mapper.pixel_to_plane(10, 10), (10.0, 0.0));
    }

    #[test]
    fn native_pixel_size() {
        let bounds = PlaneBounds::from_f64(-2.0, 2.0, -1.0, 1.0, 53);
        let mapper = NativeMapper::new(&bounds, 400, 100);
        assert_eq!(mapper.pixel_size(), (0.01, 0.02));
        assert_eq!(mapper.picture_size(), (400, 100));
    }

    #[test]
    fn native_round_trip() {
        let bounds = PlaneBounds::from_f64(-2.01, 0.59, -1.11, 1.13, 53);
        let mapper = NativeMapper::new(&bounds, 600, 600);

        for (x, y) in [(0, 0), (123, 456), (599, 599), (300, 17)] {
            let (re, im) = mapper.pixel_to_plane(x, y);
            assert_eq!(mapper.plane_to_pixel(&re, &im), (i64::from(x), i64::from(y)));
        }
    }

    #[test]
    fn plane_outside_picture_maps_outside() {
        let mapper = NativeMapper::new(&unit_window(), 10, 10);
        assert_eq!(mapper.plane_to_pixel(&-1.0, &11.0), (-1, -1));
        assert_eq!(mapper.plane_to_pixel(&20.0, &-10.0), (20, 20));
    }

    #[test]
    fn big_mapper_agrees_with_native() {
        let bounds = PlaneBounds::from_f64(-2.0, 2.0, -2.0, 2.0, 53);
        let native = NativeMapper::new(&bounds, 64, 64);
        let big = BigMapper::new(&bounds, 64, 64, 256);

        for (x, y) in [(0, 0), (17, 40), (63, 63)] {
            let (nre, nim) = native.pixel_to_plane(x, y);
            let (bre, bim) = big.pixel_to_plane(x, y);
            assert_eq!(bre.to_f64(), nre);
            assert_eq!(bim.to_f64(), nim);
            assert_eq!(big.plane_to_pixel(&bre, &bim), (i64::from(x), i64::from(y)));
        }
    }

    #[test]
    fn big_mapper_resolves_pixels_beyond_f64() {
        let bounds = PlaneBounds::parse(
            "-0.75000000000000000000000001",
            "-0.75",
            "0.1",
            "0.10000000000000000000000001",
            256,
        )
        .unwrap();
        let mapper = BigMapper::new(&bounds, 100, 100, 256);

        let (left, _) = mapper.pixel_to_plane(0, 0);
        let (right, _) = mapper.pixel_to_plane(1, 0);
        assert!(right > left);
        assert_eq!(left.to_f64(), right.to_f64());
        assert_eq!(mapper.plane_to_pixel(&right, &bounds.imag_max), (1, 0));
    }
}
