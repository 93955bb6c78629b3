use crate::error::RenderError;
use crate::escape::{EscapeValue, PixelMember};
use crate::palette::Palette;
use crate::PixelRect;

/// Row-major grid of escape values covering a whole image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    values: Vec<EscapeValue>,
}

/// Number of cells in a `width × height` grid, or an allocation error if it
/// does not fit the address space.
pub fn cell_count(width: u32, height: u32) -> Result<usize, RenderError> {
    usize::try_from(u64::from(width) * u64::from(height))
        .map_err(|_| RenderError::Allocation { width, height })
}

impl PixelGrid {
    /// Zero-filled grid. Fails instead of aborting when memory is short.
    pub fn try_new(width: u32, height: u32) -> Result<Self, RenderError> {
        let count = cell_count(width, height)?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(count)
            .map_err(|_| RenderError::Allocation { width, height })?;
        values.resize(count, EscapeValue::default());

        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Wrap values already laid out row-major. `None` if the length is wrong.
    pub fn from_values(width: u32, height: u32, values: Vec<EscapeValue>) -> Option<Self> {
        let count = cell_count(width, height).ok()?;
        (values.len() == count).then_some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[EscapeValue] {
        &self.values
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<EscapeValue> {
        self.index(x, y).map(|i| self.values[i])
    }

    /// Store one pixel. Writes outside the grid are ignored.
    pub fn set(&mut self, member: PixelMember) {
        if let Some(i) = self.index(member.x, member.y) {
            self.values[i] = member.value;
        }
    }

    /// Every pixel with its coordinates, row-major.
    pub fn members(&self) -> impl Iterator<Item = PixelMember> + '_ {
        PixelRect::image(self.width, self.height)
            .pixels()
            .zip(self.values.iter())
            .map(|((x, y), value)| PixelMember::new(x, y, *value))
    }

    /// RGBA bytes, row-major, four per pixel.
    pub fn colorize(&self, palette: &impl Palette) -> Vec<u8> {
        self.values
            .iter()
            .flat_map(|value| palette.color(*value))
            .collect()
    }
}
