//! Multi-threaded region rendering.
//!
//! A fixed pool of scoped threads shares one queue of pending regions. Each
//! thread owns a clone of the arithmetic prototype, writes resolved pixels
//! straight into the shared buffer and pushes split children back onto the
//! queue. The render ends when the queue is empty and no region is in flight.

use crate::numerics::EscapeNumerics;
use crate::shared_buffer::SharedBuffer;
use crate::subdivider::RegionSubdivider;
use crate::worker::{Worker, WorkerStats};
use escapewonder_core::{Info, PixelGrid, PixelRect, RenderError};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<PixelRect>,
    in_flight: usize,
    aborted: bool,
}

/// Pending regions plus a count of regions being worked on.
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl TaskQueue {
    /// Queue seeded with one region. An empty region seeds nothing.
    pub fn new(seed: PixelRect) -> Self {
        let queue = Self::default();
        if !seed.is_empty() {
            queue.lock().pending.push_back(seed);
        }
        queue
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next region to work on, waiting while other workers may still add some.
    ///
    /// Returns `None` once the queue is drained with nothing in flight, or
    /// after an abort. Every region handed out must be passed to `complete`.
    pub fn next(&self) -> Option<PixelRect> {
        let mut state = self.lock();
        loop {
            if state.aborted {
                return None;
            }
            if let Some(rect) = state.pending.pop_front() {
                state.in_flight += 1;
                return Some(rect);
            }
            if state.in_flight == 0 {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Finish one region handed out by `next`, queueing its children.
    pub fn complete(&self, children: impl IntoIterator<Item = PixelRect>) {
        let mut state = self.lock();
        state.pending.extend(children);
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.ready.notify_all();
    }

    /// Stop handing out work. Waiting workers wake up and see `None`.
    pub fn abort(&self) {
        self.lock().aborted = true;
        self.ready.notify_all();
    }
}

/// Totals over every worker of one render.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub jobs: usize,
    pub totals: WorkerStats,
    pub per_worker: Vec<WorkerStats>,
}

/// Renders an image with `jobs` threads sharing one region queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedRegionScheduler {
    subdivider: RegionSubdivider,
    jobs: usize,
}

impl SharedRegionScheduler {
    pub fn new(subdivider: RegionSubdivider, jobs: usize) -> Self {
        Self {
            subdivider,
            jobs: jobs.max(1),
        }
    }

    pub fn from_info(info: &Info) -> Self {
        Self::new(RegionSubdivider::from_info(info), info.request.jobs as usize)
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Render a `width × height` image. Each worker gets its own clone of `prototype`.
    pub fn render(
        &self,
        prototype: &dyn EscapeNumerics,
        width: u32,
        height: u32,
    ) -> Result<(PixelGrid, RenderStats), RenderError> {
        let buffer = SharedBuffer::try_new(width, height)?;
        let queue = TaskQueue::new(PixelRect::image(width, height));

        log::debug!(
            "Rendering {}x{} with {} workers (collapse {}, samples {})",
            width,
            height,
            self.jobs,
            self.subdivider.collapse(),
            self.subdivider.samples()
        );

        let results: Vec<Result<WorkerStats, RenderError>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.jobs)
                .map(|id| {
                    let worker = Worker::new(
                        id,
                        dyn_clone::clone_box(prototype),
                        self.subdivider,
                        &queue,
                        &buffer,
                    );
                    scope.spawn(move || worker.run())
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(id, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(RenderError::WorkerPanicked(id)))
                })
                .collect()
        });

        let per_worker = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        let totals = per_worker
            .iter()
            .fold(WorkerStats::default(), |acc, stats| acc.merge(*stats));

        log::debug!("Render finished: {:?}", totals);

        let grid = buffer.into_grid()?;
        Ok((
            grid,
            RenderStats {
                jobs: self.jobs,
                totals,
                per_worker,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FnNumerics;
    use escapewonder_core::EscapeValue;
    use std::sync::Arc;

    #[test]
    fn queue_hands_out_seed_then_terminates() {
        let queue = TaskQueue::new(PixelRect::image(4, 4));
        let rect = queue.next().unwrap();
        assert_eq!(rect, PixelRect::image(4, 4));

        queue.complete(rect.quarter());
        let mut handed = 0;
        while queue.next().is_some() {
            handed += 1;
            queue.complete(None);
        }
        assert_eq!(handed, 4);
    }

    #[test]
    fn empty_seed_terminates_immediately() {
        assert!(TaskQueue::new(PixelRect::image(0, 5)).next().is_none());
    }

    #[test]
    fn waiting_worker_wakes_when_last_region_completes() {
        let queue = Arc::new(TaskQueue::new(PixelRect::image(2, 2)));
        let held = queue.next().unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.next())
        };

        queue.complete(None);
        assert_eq!(waiter.join().unwrap(), None);
        assert_eq!(held, PixelRect::image(2, 2));
    }

    #[test]
    fn abort_wakes_waiters() {
        let queue = Arc::new(TaskQueue::new(PixelRect::image(2, 2)));
        let _held = queue.next().unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.next())
        };

        queue.abort();
        assert_eq!(waiter.join().unwrap(), None);
    }

    #[test]
    fn shared_render_covers_every_pixel() {
        let numerics = FnNumerics::new(|x, y| EscapeValue::escaped((x * y) % 7));
        let scheduler = SharedRegionScheduler::new(RegionSubdivider::new(3, 4), 4);

        let (grid, stats) = scheduler.render(&numerics, 50, 31).unwrap();

        assert_eq!(grid.values().len(), 50 * 31);
        assert_eq!(stats.per_worker.len(), 4);
        assert_eq!(stats.totals.pixels_written, 50 * 31);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["jobs"], 4);
        assert_eq!(json["totals"]["pixels_written"], 50 * 31);
    }

    #[test]
    fn panicking_numerics_reports_worker() {
        let numerics = FnNumerics::new(|x, y| {
            if (x, y) == (7, 7) {
                panic!("bad pixel");
            }
            EscapeValue::escaped(0)
        });
        let scheduler = SharedRegionScheduler::new(RegionSubdivider::new(2, 0), 2);

        let err = scheduler.render(&numerics, 8, 8).unwrap_err();
        assert!(matches!(err, RenderError::WorkerPanicked(_)));
    }
}
