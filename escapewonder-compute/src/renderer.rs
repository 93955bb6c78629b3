use crate::numerics::{build_numerics, EscapeNumerics};
use crate::scanner::SequentialScanner;
use crate::scheduler::SharedRegionScheduler;
use crate::shared_buffer::SharedBuffer;
use crate::subdivider::RegionSubdivider;
use escapewonder_core::{Info, PixelGrid, PixelRect, RenderError, RenderStrategy};

/// A way of turning escape evaluations into a full image.
pub trait Renderer {
    /// Render a `width × height` image with the given arithmetic.
    fn render_with(
        &self,
        numerics: Box<dyn EscapeNumerics>,
        width: u32,
        height: u32,
    ) -> Result<PixelGrid, RenderError>;

    fn strategy(&self) -> RenderStrategy;
}

/// Every pixel evaluated in row-major order on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceRenderer;

impl Renderer for SequenceRenderer {
    fn render_with(
        &self,
        mut numerics: Box<dyn EscapeNumerics>,
        width: u32,
        height: u32,
    ) -> Result<PixelGrid, RenderError> {
        let mut grid = PixelGrid::try_new(width, height)?;
        for member in SequentialScanner::image(numerics.as_mut(), width, height) {
            grid.set(member);
        }
        Ok(grid)
    }

    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::Sequence
    }
}

/// Region subdivision on the calling thread.
#[derive(Clone, Copy, Debug)]
pub struct RegionRenderer {
    subdivider: RegionSubdivider,
}

impl RegionRenderer {
    pub fn new(subdivider: RegionSubdivider) -> Self {
        Self { subdivider }
    }
}

impl Renderer for RegionRenderer {
    fn render_with(
        &self,
        mut numerics: Box<dyn EscapeNumerics>,
        width: u32,
        height: u32,
    ) -> Result<PixelGrid, RenderError> {
        let buffer = SharedBuffer::try_new(width, height)?;
        let root = self
            .subdivider
            .render(numerics.as_mut(), PixelRect::image(width, height), &buffer)?;

        log::debug!(
            "Region render finished: {} leaves, depth {}",
            root.leaves().len(),
            root.max_depth()
        );
        buffer.into_grid()
    }

    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::Region
    }
}

/// Region subdivision spread over a pool of worker threads.
#[derive(Clone, Copy, Debug)]
pub struct SharedRegionRenderer {
    scheduler: SharedRegionScheduler,
}

impl SharedRegionRenderer {
    pub fn new(scheduler: SharedRegionScheduler) -> Self {
        Self { scheduler }
    }
}

impl Renderer for SharedRegionRenderer {
    fn render_with(
        &self,
        numerics: Box<dyn EscapeNumerics>,
        width: u32,
        height: u32,
    ) -> Result<PixelGrid, RenderError> {
        let (grid, _stats) = self.scheduler.render(numerics.as_ref(), width, height)?;
        Ok(grid)
    }

    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::SharedRegion
    }
}

/// Create the renderer `info` selected.
pub fn create_renderer(info: &Info) -> Box<dyn Renderer> {
    match info.render_strategy {
        RenderStrategy::Sequence => Box::new(SequenceRenderer),
        RenderStrategy::Region => Box::new(RegionRenderer::new(RegionSubdivider::from_info(info))),
        RenderStrategy::SharedRegion => Box::new(SharedRegionRenderer::new(
            SharedRegionScheduler::from_info(info),
        )),
    }
}

/// Render the image `info` describes with its chosen strategy and arithmetic.
pub fn render(info: &Info) -> Result<PixelGrid, RenderError> {
    let (width, height) = info.image_size();
    log::debug!(
        "Rendering {}x{} using {:?} at {} bits",
        width,
        height,
        info.render_strategy,
        info.precision
    );
    create_renderer(info).render_with(build_numerics(info), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FnNumerics;
    use escapewonder_core::{configure, EscapeValue, RenderMode, Request};

    fn ripple() -> Box<dyn EscapeNumerics> {
        Box::new(FnNumerics::new(|x, y| EscapeValue::escaped((x / 3) ^ (y / 5))))
    }

    #[test]
    fn sequence_renderer_matches_function() {
        let grid = SequenceRenderer.render_with(ripple(), 7, 4).unwrap();
        assert_eq!(grid.get(6, 3), Some(EscapeValue::escaped(2)));
        assert_eq!(grid.get(0, 0), Some(EscapeValue::escaped(0)));
    }

    #[test]
    fn region_renderers_agree() {
        let subdivider = RegionSubdivider::new(2, 3);
        let single = RegionRenderer::new(subdivider)
            .render_with(ripple(), 45, 38)
            .unwrap();
        let shared = SharedRegionRenderer::new(SharedRegionScheduler::new(subdivider, 3))
            .render_with(ripple(), 45, 38)
            .unwrap();

        assert_eq!(single, shared);
    }

    #[test]
    fn create_renderer_follows_strategy() {
        for (mode, strategy) in [
            (RenderMode::Sequence, RenderStrategy::Sequence),
            (RenderMode::Region, RenderStrategy::Region),
            (RenderMode::SharedRegion, RenderStrategy::SharedRegion),
        ] {
            let request = Request {
                render_mode: mode,
                ..Request::default()
            };
            let info = configure(&request).unwrap();
            assert_eq!(create_renderer(&info).strategy(), strategy);
        }
    }

    #[test]
    fn render_uses_configured_size() {
        let request = Request {
            image_width: 20,
            image_height: 10,
            iterate_limit: 50,
            ..Request::default()
        };
        let grid = render(&configure(&request).unwrap()).unwrap();
        assert_eq!((grid.width(), grid.height()), (20, 10));
    }
}
