//! Escape-time evaluation under the native and arbitrary-precision backends.
//!
//! Every backend owns its pixel geometry and whatever scratch state it mutates
//! while iterating. Workers each receive their own clone.

use escapewonder_core::{
    BigFloat, BigMapper, CoordinateMapper, EscapeValue, Info, NativeMapper, NumericsStrategy,
};

/// Escape-time evaluation of picture pixels.
pub trait EscapeNumerics: dyn_clone::DynClone + Send {
    /// Escape value of the plane point under pixel (x, y).
    fn escape_at(&mut self, x: u32, y: u32) -> EscapeValue;

    /// Mantissa bits the backend computes with.
    fn precision_bits(&self) -> usize;
}

dyn_clone::clone_trait_object!(EscapeNumerics);

/// Iteration parameters shared by both backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeParams {
    pub iterate_limit: u32,
    /// Squared modulus past which an orbit has escaped.
    pub diverge_limit: f64,
}

impl EscapeParams {
    pub fn from_info(info: &Info) -> Self {
        Self {
            iterate_limit: info.request.iterate_limit,
            diverge_limit: info.request.diverge_limit,
        }
    }
}

/// Build the backend selected for `info`.
pub fn build_numerics(info: &Info) -> Box<dyn EscapeNumerics> {
    let (width, height) = info.image_size();
    let params = EscapeParams::from_info(info);

    match info.numerics_strategy {
        NumericsStrategy::Native => {
            Box::new(NativeNumerics::new(NativeMapper::new(&info.bounds, width, height), params))
        }
        NumericsStrategy::Arbitrary => Box::new(BigNumerics::new(
            BigMapper::new(&info.bounds, width, height, info.precision),
            params,
        )),
    }
}

/// z ← z² + c in f64 until |z|² passes the divergence limit.
pub fn escape_native(cr: f64, ci: f64, params: EscapeParams) -> EscapeValue {
    let mut zr = 0.0_f64;
    let mut zi = 0.0_f64;
    let mut i = 0;

    while i < params.iterate_limit {
        let zr_sq = zr * zr;
        let zi_sq = zi * zi;
        if zr_sq + zi_sq > params.diverge_limit {
            break;
        }

        zi = 2.0 * zr * zi + ci;
        zr = zr_sq - zi_sq + cr;
        i += 1;
    }

    if i >= params.iterate_limit {
        EscapeValue::member(params.iterate_limit)
    } else {
        EscapeValue::escaped(i)
    }
}

/// f64 backend.
#[derive(Clone, Debug)]
pub struct NativeNumerics {
    mapper: NativeMapper,
    params: EscapeParams,
}

impl NativeNumerics {
    pub fn new(mapper: NativeMapper, params: EscapeParams) -> Self {
        Self { mapper, params }
    }

    pub fn mapper(&self) -> &NativeMapper {
        &self.mapper
    }
}

impl EscapeNumerics for NativeNumerics {
    fn escape_at(&mut self, x: u32, y: u32) -> EscapeValue {
        let (cr, ci) = self.mapper.pixel_to_plane(x, y);
        escape_native(cr, ci, self.params)
    }

    fn precision_bits(&self) -> usize {
        escapewonder_core::precision::NATIVE_MANTISSA_BITS
    }
}

/// Iteration state owned by one `BigNumerics`; clones never share it.
#[derive(Clone, Debug)]
struct BigScratch {
    zr: BigFloat,
    zi: BigFloat,
    zr_sq: BigFloat,
    zi_sq: BigFloat,
    cross: BigFloat,
}

impl BigScratch {
    fn new(precision_bits: usize) -> Self {
        let zero = BigFloat::zero(precision_bits);
        Self {
            zr: zero.clone(),
            zi: zero.clone(),
            zr_sq: zero.clone(),
            zi_sq: zero.clone(),
            cross: zero,
        }
    }

    fn reset(&mut self, zero: &BigFloat) {
        self.zr.clone_from(zero);
        self.zi.clone_from(zero);
    }
}

/// Arbitrary-precision backend.
#[derive(Clone, Debug)]
pub struct BigNumerics {
    mapper: BigMapper,
    params: EscapeParams,
    diverge_limit: BigFloat,
    zero: BigFloat,
    scratch: BigScratch,
}

impl BigNumerics {
    pub fn new(mapper: BigMapper, params: EscapeParams) -> Self {
        let precision = mapper.precision_bits();
        Self {
            diverge_limit: BigFloat::with_precision(params.diverge_limit, precision),
            zero: BigFloat::zero(precision),
            scratch: BigScratch::new(precision),
            mapper,
            params,
        }
    }

    pub fn mapper(&self) -> &BigMapper {
        &self.mapper
    }

    /// Escape value of an arbitrary plane point.
    pub fn escape_point(&mut self, cr: &BigFloat, ci: &BigFloat) -> EscapeValue {
        let limit = self.params.iterate_limit;
        let s = &mut self.scratch;
        s.reset(&self.zero);

        let mut i = 0;
        while i < limit {
            s.zr_sq = s.zr.square();
            s.zi_sq = s.zi.square();
            if s.zr_sq.add(&s.zi_sq) > self.diverge_limit {
                break;
            }

            s.cross = s.zr.mul(&s.zi);
            s.zi = s.cross.add(&s.cross).add(ci);
            s.zr = s.zr_sq.sub(&s.zi_sq).add(cr);
            i += 1;
        }

        if i >= limit {
            EscapeValue::member(limit)
        } else {
            EscapeValue::escaped(i)
        }
    }
}

impl EscapeNumerics for BigNumerics {
    fn escape_at(&mut self, x: u32, y: u32) -> EscapeValue {
        let (cr, ci) = self.mapper.pixel_to_plane(x, y);
        self.escape_point(&cr, &ci)
    }

    fn precision_bits(&self) -> usize {
        self.mapper.precision_bits()
    }
}
