//! Output buffer shared by every render worker.
//!
//! Each pixel is one `AtomicU32` holding a packed escape value:
//!
//! - Bit 31: in-set flag
//! - Bits 0-30: inverse divergence
//!
//! `u32::MAX` marks a pixel no region has written yet. Regions are disjoint,
//! so a second write to a cell or an unwritten cell at the end means the
//! subdivision did not partition the image.

use escapewonder_core::grid::cell_count;
use escapewonder_core::{EscapeValue, PixelGrid, PixelMember, PixelRect, RenderError};
use std::sync::atomic::{AtomicU32, Ordering};

const UNWRITTEN: u32 = u32::MAX;
const IN_SET_BIT: u32 = 1 << 31;

/// Pack an escape value into one cell. Iteration limits stay far below bit 31.
pub fn encode_value(value: EscapeValue) -> u32 {
    let flag = if value.in_set { IN_SET_BIT } else { 0 };
    (value.inv_div & !IN_SET_BIT) | flag
}

pub fn decode_value(cell: u32) -> EscapeValue {
    EscapeValue::new(cell & !IN_SET_BIT, cell & IN_SET_BIT != 0)
}

/// Write-once pixel cells for a `width × height` image.
pub struct SharedBuffer {
    width: u32,
    height: u32,
    cells: Vec<AtomicU32>,
}

impl SharedBuffer {
    /// Buffer with every cell unwritten. Fails instead of aborting when memory is short.
    pub fn try_new(width: u32, height: u32) -> Result<Self, RenderError> {
        let count = cell_count(width, height)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| RenderError::Allocation { width, height })?;
        cells.extend((0..count).map(|_| AtomicU32::new(UNWRITTEN)));

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, RenderError> {
        if x < self.width && y < self.height {
            Ok(y as usize * self.width as usize + x as usize)
        } else {
            Err(RenderError::OutOfBounds { x, y })
        }
    }

    fn store(&self, x: u32, y: u32, cell: u32) -> Result<(), RenderError> {
        let index = self.index(x, y)?;
        // Thread joins order these stores before `into_grid`
        match self.cells[index].swap(cell, Ordering::Relaxed) {
            UNWRITTEN => Ok(()),
            _ => Err(RenderError::PartitionOverlap { x, y }),
        }
    }

    /// Store one resolved pixel.
    pub fn write(&self, member: PixelMember) -> Result<(), RenderError> {
        self.store(member.x, member.y, encode_value(member.value))
    }

    /// Assign `value` to every pixel of `rect`.
    pub fn fill(&self, rect: PixelRect, value: EscapeValue) -> Result<(), RenderError> {
        let cell = encode_value(value);
        rect.pixels().try_for_each(|(x, y)| self.store(x, y, cell))
    }

    /// Number of cells written so far.
    pub fn written(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.load(Ordering::Relaxed) != UNWRITTEN)
            .count()
    }

    /// Decode into a grid once every worker is done. Any unwritten pixel is an error.
    pub fn into_grid(self) -> Result<PixelGrid, RenderError> {
        let Self {
            width,
            height,
            cells,
        } = self;
        let row = width.max(1) as usize;

        let values = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| match cell.into_inner() {
                UNWRITTEN => Err(RenderError::PartitionGap {
                    x: (index % row) as u32,
                    y: (index / row) as u32,
                }),
                packed => Ok(decode_value(packed)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        PixelGrid::from_values(width, height, values)
            .ok_or(RenderError::Allocation { width, height })
    }
}
