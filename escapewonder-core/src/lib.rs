pub mod bigfloat;
pub mod config;
pub mod coords;
pub mod error;
pub mod escape;
pub mod grid;
pub mod info;
pub mod palette;
pub mod pixel_rect;
pub mod plane;
pub mod precision;
pub mod request;
pub mod zoom;

pub use bigfloat::BigFloat;
pub use config::configure;
pub use coords::{BigMapper, CoordinateMapper, NativeMapper};
pub use error::{ConfigError, ParseError, RenderError};
pub use escape::{EscapeValue, PixelMember};
pub use grid::PixelGrid;
pub use info::{Info, NumericsStrategy, RenderStrategy};
pub use palette::{CachePalette, Palette, Rgba};
pub use pixel_rect::PixelRect;
pub use plane::{AspectFix, PlaneBounds};
pub use precision::required_precision_bits;
pub use request::{NumericsMode, PaletteKind, RenderMode, Request, ZoomBounds, ZoomTarget};
pub use zoom::Zoom;
