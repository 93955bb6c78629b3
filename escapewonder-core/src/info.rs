use crate::error::ConfigError;
use crate::request::Request;
use crate::PlaneBounds;
use serde::{Deserialize, Serialize};

/// Concrete render algorithm chosen by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    Sequence,
    Region,
    SharedRegion,
}

/// Concrete arithmetic backend chosen by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericsStrategy {
    Native,
    Arbitrary,
}

/// Fully resolved render descriptor.
///
/// Produced by [`configure`](crate::configure); every automatic choice in the
/// originating request has been replaced by a concrete one and the plane
/// bounds are parsed at `precision` bits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "InfoRecord", try_from = "InfoRecord")]
pub struct Info {
    pub request: Request,
    pub render_strategy: RenderStrategy,
    pub numerics_strategy: NumericsStrategy,
    pub precision: usize,
    pub bounds: PlaneBounds,
}

/// Serialized form: bounds travel only as the request's decimal strings.
#[derive(Serialize, Deserialize)]
struct InfoRecord {
    request: Request,
    render_strategy: RenderStrategy,
    numerics_strategy: NumericsStrategy,
    precision: usize,
}

impl From<Info> for InfoRecord {
    fn from(info: Info) -> Self {
        Self {
            request: info.to_request(),
            render_strategy: info.render_strategy,
            numerics_strategy: info.numerics_strategy,
            precision: info.precision,
        }
    }
}

impl TryFrom<InfoRecord> for Info {
    type Error = ConfigError;

    fn try_from(record: InfoRecord) -> Result<Self, Self::Error> {
        let [real_min, real_max, imag_min, imag_max] = record.request.bound_strings();
        let bounds = PlaneBounds::parse(real_min, real_max, imag_min, imag_max, record.precision)?;

        Ok(Self {
            request: record.request,
            render_strategy: record.render_strategy,
            numerics_strategy: record.numerics_strategy,
            precision: record.precision,
            bounds,
        })
    }
}

impl Info {
    /// Request that reproduces this descriptor's plane window.
    ///
    /// Bound strings carry the parsed (and possibly aspect-corrected) bounds
    /// rather than the strings the user originally wrote.
    pub fn to_request(&self) -> Request {
        Request {
            real_min: self.bounds.real_min.to_decimal_string(),
            real_max: self.bounds.real_max.to_decimal_string(),
            imag_min: self.bounds.imag_min.to_decimal_string(),
            imag_max: self.bounds.imag_max.to_decimal_string(),
            ..self.request.clone()
        }
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.request.image_width, self.request.image_height)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
