use crate::numerics::EscapeNumerics;
use crate::region::RegionState;
use crate::scheduler::TaskQueue;
use crate::shared_buffer::SharedBuffer;
use crate::subdivider::{RegionSubdivider, Step};
use escapewonder_core::RenderError;
use serde::Serialize;

/// Counts of what one worker did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub regions: u64,
    pub filled: u64,
    pub scanned: u64,
    pub split: u64,
    pub glitches: u64,
    pub pixels_written: u64,
}

impl WorkerStats {
    fn record(&mut self, step: &Step) {
        self.regions += 1;
        match step.state {
            RegionState::UniformFill => {
                self.filled += 1;
                self.pixels_written += step.rect.area();
            }
            RegionState::SequentialFallback => {
                self.scanned += 1;
                self.pixels_written += step.rect.area();
            }
            RegionState::GlitchDetected => {
                self.glitches += 1;
                self.split += 1;
            }
            RegionState::Divergent => self.split += 1,
            RegionState::Unresolved => {}
        }
    }

    /// Sum of two workers' counts.
    pub fn merge(self, other: Self) -> Self {
        Self {
            regions: self.regions + other.regions,
            filled: self.filled + other.filled,
            scanned: self.scanned + other.scanned,
            split: self.split + other.split,
            glitches: self.glitches + other.glitches,
            pixels_written: self.pixels_written + other.pixels_written,
        }
    }
}

/// Aborts the queue if the worker unwinds, so the other workers stop waiting.
struct AbortOnUnwind<'a>(&'a TaskQueue);

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.abort();
        }
    }
}

/// One render thread: pulls regions off the queue until none are left.
pub struct Worker<'a> {
    id: usize,
    numerics: Box<dyn EscapeNumerics + 'a>,
    subdivider: RegionSubdivider,
    queue: &'a TaskQueue,
    buffer: &'a SharedBuffer,
}

impl<'a> Worker<'a> {
    pub fn new(
        id: usize,
        numerics: Box<dyn EscapeNumerics + 'a>,
        subdivider: RegionSubdivider,
        queue: &'a TaskQueue,
        buffer: &'a SharedBuffer,
    ) -> Self {
        Self {
            id,
            numerics,
            subdivider,
            queue,
            buffer,
        }
    }

    /// Pull loop. A failed write aborts the whole queue.
    pub fn run(mut self) -> Result<WorkerStats, RenderError> {
        log::debug!("Worker {} started", self.id);
        let _guard = AbortOnUnwind(self.queue);
        let mut stats = WorkerStats::default();

        while let Some(rect) = self.queue.next() {
            let step = self.subdivider.step(self.numerics.as_mut(), rect);

            if let Err(err) = step.write(self.buffer) {
                self.queue.abort();
                return Err(err);
            }

            stats.record(&step);
            self.queue.complete(step.children().into_iter().flatten());
        }

        log::debug!("Worker {} finished: {:?}", self.id, stats);
        Ok(stats)
    }
}
