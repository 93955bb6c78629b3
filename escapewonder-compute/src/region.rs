//! Recursion tree produced by region subdivision.

use escapewonder_core::{EscapeValue, PixelRect};

/// What subdivision decided for one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionState {
    /// Not evaluated yet.
    Unresolved,
    /// Corners and interior samples agreed; every pixel takes the corner value.
    UniformFill,
    /// Corners agreed but an interior sample did not.
    GlitchDetected,
    /// Corners disagreed.
    Divergent,
    /// Small enough to evaluate pixel by pixel.
    SequentialFallback,
}

impl RegionState {
    /// Whether a region in this state is split into four children.
    pub fn splits(self) -> bool {
        matches!(self, Self::GlitchDetected | Self::Divergent)
    }

    /// Whether a leaf in this state has assigned every one of its pixels.
    pub fn assigns_pixels(self) -> bool {
        matches!(self, Self::UniformFill | Self::SequentialFallback)
    }
}

/// A node of the subdivision tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub rect: PixelRect,
    pub depth: u32,
    pub state: RegionState,
    /// Corner values, in `PixelRect::corners` order, once evaluated.
    pub corners: Option<[EscapeValue; 4]>,
    /// Children are stored as [top_left, top_right, bottom_left, bottom_right]
    pub children: Option<Box<[Region; 4]>>,
}

impl Region {
    pub fn new(rect: PixelRect, depth: u32) -> Self {
        Self {
            rect,
            depth,
            state: RegionState::Unresolved,
            corners: None,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// True once every pixel under this region has been assigned.
    pub fn is_resolved(&self) -> bool {
        match &self.children {
            Some(children) => children.iter().all(Region::is_resolved),
            None => self.state.assigns_pixels(),
        }
    }

    /// Collect all leaf regions in this subtree.
    pub fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Region>) {
        match &self.children {
            None => leaves.push(self),
            Some(children) => {
                for child in children.iter() {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Leaf regions in depth-first order, top-left child first.
    pub fn leaves(&self) -> Vec<&Region> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    /// Deepest level reached below this region.
    pub fn max_depth(&self) -> u32 {
        match &self.children {
            None => self.depth,
            Some(children) => children.iter().map(Region::max_depth).max().unwrap_or(self.depth),
        }
    }
}
