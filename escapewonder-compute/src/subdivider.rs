//! Adaptive region subdivision.
//!
//! A region whose four corners agree is filled with the corner value once an
//! interior sample lattice confirms the agreement. Otherwise it is quartered,
//! down to regions small enough to scan pixel by pixel.

use crate::numerics::EscapeNumerics;
use crate::region::{Region, RegionState};
use crate::scanner::SequentialScanner;
use crate::shared_buffer::SharedBuffer;
use escapewonder_core::{EscapeValue, Info, PixelMember, PixelRect, RenderError};

/// What one subdivision step produced.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Every pixel of the region takes this value.
    Filled(EscapeValue),
    /// Every pixel was evaluated individually.
    Scanned(Vec<PixelMember>),
    /// The region must be resolved through these four children.
    Split([PixelRect; 4]),
}

/// Result of examining one region.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub rect: PixelRect,
    pub state: RegionState,
    pub corners: Option<[EscapeValue; 4]>,
    pub outcome: StepOutcome,
}

impl Step {
    /// Store whatever pixels this step resolved.
    pub fn write(&self, buffer: &SharedBuffer) -> Result<(), RenderError> {
        match &self.outcome {
            StepOutcome::Filled(value) => buffer.fill(self.rect, *value),
            StepOutcome::Scanned(members) => {
                members.iter().try_for_each(|member| buffer.write(*member))
            }
            StepOutcome::Split(_) => Ok(()),
        }
    }

    pub fn children(&self) -> Option<[PixelRect; 4]> {
        match self.outcome {
            StepOutcome::Split(children) => Some(children),
            _ => None,
        }
    }

    fn into_region(self, depth: u32) -> Region {
        Region {
            rect: self.rect,
            depth,
            state: self.state,
            corners: self.corners,
            children: None,
        }
    }
}

/// Decides, region by region, whether to fill, scan or split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionSubdivider {
    collapse: u32,
    samples: u32,
}

impl RegionSubdivider {
    /// `collapse` is the side length at or below which a region is scanned;
    /// `samples` the lattice size per axis used to confirm uniform regions.
    pub fn new(collapse: u32, samples: u32) -> Self {
        Self {
            collapse: collapse.max(1),
            samples,
        }
    }

    pub fn from_info(info: &Info) -> Self {
        Self::new(info.request.region_collapse, info.request.region_samples)
    }

    pub fn collapse(&self) -> u32 {
        self.collapse
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Examine one region without writing anything.
    pub fn step(&self, numerics: &mut dyn EscapeNumerics, rect: PixelRect) -> Step {
        if rect.collapses_at(self.collapse) {
            let members = SequentialScanner::new(numerics, rect).collect();
            log::trace!("Scanning {:?}", rect);
            return Step {
                rect,
                state: RegionState::SequentialFallback,
                corners: None,
                outcome: StepOutcome::Scanned(members),
            };
        }

        let corner_pixels = rect.corners();
        let corners = corner_pixels.map(|(x, y)| numerics.escape_at(x, y));
        let value = corners[0];

        let state = if corners.iter().any(|corner| *corner != value) {
            RegionState::Divergent
        } else if rect
            .sample_lattice(self.samples)
            .into_iter()
            .filter(|pixel| !corner_pixels.contains(pixel))
            .any(|(x, y)| numerics.escape_at(x, y) != value)
        {
            RegionState::GlitchDetected
        } else {
            RegionState::UniformFill
        };

        log::trace!("{:?} is {:?}", rect, state);

        let outcome = if state.splits() {
            StepOutcome::Split(rect.quarter())
        } else {
            StepOutcome::Filled(value)
        };

        Step {
            rect,
            state,
            corners: Some(corners),
            outcome,
        }
    }

    /// Resolve `rect` completely on the calling thread, writing into `buffer`.
    pub fn render(
        &self,
        numerics: &mut dyn EscapeNumerics,
        rect: PixelRect,
        buffer: &SharedBuffer,
    ) -> Result<Region, RenderError> {
        self.render_at(numerics, rect, 0, buffer)
    }

    fn render_at(
        &self,
        numerics: &mut dyn EscapeNumerics,
        rect: PixelRect,
        depth: u32,
        buffer: &SharedBuffer,
    ) -> Result<Region, RenderError> {
        let step = self.step(numerics, rect);
        step.write(buffer)?;

        let children = step.children();
        let mut region = step.into_region(depth);

        if let Some([top_left, top_right, bottom_left, bottom_right]) = children {
            let next = depth + 1;
            region.children = Some(Box::new([
                self.render_at(numerics, top_left, next, buffer)?,
                self.render_at(numerics, top_right, next, buffer)?,
                self.render_at(numerics, bottom_left, next, buffer)?,
                self.render_at(numerics, bottom_right, next, buffer)?,
            ]));
        }

        Ok(region)
    }
}
