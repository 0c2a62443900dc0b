//! Scroll-and-capture pipeline
//!
//! One screenshot session walks the selected message range: the runner
//! scrolls the page, captures overlapping viewport slices through the
//! host bridge, and the session layer stitches and saves them.

pub mod chrome;
pub mod runner;
pub mod session;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use chrome::ChromeGuard;
pub use runner::run;
pub use session::{CaptureResult, ScreenshotSession, SessionManager, ToggleOutcome};

/// One captured viewport slice: encoded PNG plus the height recorded at
/// capture time
#[derive(Clone, Debug)]
pub struct CaptureSlice {
    pub png: Vec<u8>,
    pub height: u32,
}

/// How the capture loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Last selected message fully captured
    Completed,
    /// Iteration cap hit before the selection end was reached
    CapReached,
    /// Scroll position stopped changing
    Stalled,
    /// Selection scrolled out of reach while seeking it
    SelectionLost,
    /// Cancel flag raised between steps
    Cancelled,
}

/// Slices plus bookkeeping from one capture run
#[derive(Clone, Debug)]
pub struct CaptureReport {
    pub slices: Vec<CaptureSlice>,
    pub iterations: u32,
    pub outcome: LoopOutcome,
}

/// Cooperative cancellation checked at each loop iteration boundary.
///
/// Clonable so the host can keep one end wired to its escape handler
/// while the running capture polls the other.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
