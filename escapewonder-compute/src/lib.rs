pub mod numerics;
pub mod region;
pub mod renderer;
pub mod scanner;
pub mod scheduler;
pub mod shared_buffer;
pub mod subdivider;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
pub mod worker;

pub use numerics::{build_numerics, BigNumerics, EscapeNumerics, EscapeParams, NativeNumerics};
pub use region::{Region, RegionState};
pub use renderer::{
    create_renderer, render, RegionRenderer, Renderer, SequenceRenderer, SharedRegionRenderer,
};
pub use scanner::SequentialScanner;
pub use scheduler::{RenderStats, SharedRegionScheduler, TaskQueue};
pub use shared_buffer::SharedBuffer;
pub use subdivider::{RegionSubdivider, Step, StepOutcome};
pub use worker::{Worker, WorkerStats};

// Re-export core types for convenience
pub use escapewonder_core::*;
