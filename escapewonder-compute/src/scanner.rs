use crate::numerics::EscapeNumerics;
use escapewonder_core::{PixelMember, PixelRect};

/// Row-major evaluation of every pixel in a rectangle.
///
/// Pixels are evaluated lazily as the iterator advances. The scan is
/// finite and cannot be restarted.
pub struct SequentialScanner<'a> {
    rect: PixelRect,
    cursor: u64,
    numerics: &'a mut dyn EscapeNumerics,
}

impl<'a> SequentialScanner<'a> {
    pub fn new(numerics: &'a mut dyn EscapeNumerics, rect: PixelRect) -> Self {
        Self {
            rect,
            cursor: 0,
            numerics,
        }
    }

    /// Scan a whole `width × height` image.
    pub fn image(numerics: &'a mut dyn EscapeNumerics, width: u32, height: u32) -> Self {
        Self::new(numerics, PixelRect::image(width, height))
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }
}

impl Iterator for SequentialScanner<'_> {
    type Item = PixelMember;

    fn next(&mut self) -> Option<PixelMember> {
        if self.cursor >= self.rect.area() {
            return None;
        }

        let row_len = u64::from(self.rect.width);
        let x = self.rect.x + (self.cursor % row_len) as u32;
        let y = self.rect.y + (self.cursor / row_len) as u32;
        self.cursor += 1;

        Some(PixelMember::new(x, y, self.numerics.escape_at(x, y)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rect.area() - self.cursor;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
