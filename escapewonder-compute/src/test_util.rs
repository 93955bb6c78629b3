//! Scripted backends for exercising renderers without real arithmetic.
//!
//! Compiled for this crate's tests and, through the `test-util` feature, for
//! downstream test suites.

use crate::numerics::EscapeNumerics;
use escapewonder_core::EscapeValue;
use std::sync::{Arc, Mutex, PoisonError};

/// Backend whose escape function is an arbitrary closure over pixel indices.
#[derive(Clone)]
pub struct FnNumerics<F> {
    escape: F,
    precision_bits: usize,
}

impl<F> FnNumerics<F>
where
    F: Fn(u32, u32) -> EscapeValue + Clone + Send + 'static,
{
    pub fn new(escape: F) -> Self {
        Self {
            escape,
            precision_bits: escapewonder_core::precision::NATIVE_MANTISSA_BITS,
        }
    }
}

impl<F> EscapeNumerics for FnNumerics<F>
where
    F: Fn(u32, u32) -> EscapeValue + Clone + Send + 'static,
{
    fn escape_at(&mut self, x: u32, y: u32) -> EscapeValue {
        (self.escape)(x, y)
    }

    fn precision_bits(&self) -> usize {
        self.precision_bits
    }
}

/// Pixels evaluated so far, shared by every clone of a `RecordingNumerics`.
pub type CallLog = Arc<Mutex<Vec<(u32, u32)>>>;

/// Wraps a backend and records every pixel it evaluates.
#[derive(Clone)]
pub struct RecordingNumerics<N> {
    inner: N,
    calls: CallLog,
}

impl<N: EscapeNumerics + Clone> RecordingNumerics<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            calls: CallLog::default(),
        }
    }

    /// Handle on the log, valid after the numerics are boxed or cloned.
    pub fn log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    /// Snapshot of the pixels evaluated so far, in evaluation order.
    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<N: EscapeNumerics + Clone> EscapeNumerics for RecordingNumerics<N> {
    fn escape_at(&mut self, x: u32, y: u32) -> EscapeValue {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((x, y));
        self.inner.escape_at(x, y)
    }

    fn precision_bits(&self) -> usize {
        self.inner.precision_bits()
    }
}
