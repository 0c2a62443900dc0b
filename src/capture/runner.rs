//! The scroll-and-capture loop
//!
//! One run walks the selected range top to bottom: maximize the window,
//! hide floating chrome, jump to the selection start, then alternate
//! capture and scroll until the last message is fully on screen. Every
//! iteration sleeps briefly so the page can finish rendering, and the
//! loop is capped so a stuck scroll can never hang a session.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::capture::chrome::ChromeGuard;
use crate::capture::{CancelFlag, CaptureReport, CaptureSlice, LoopOutcome};
use crate::config::CaptureConfig;
use crate::domain::{Region, SelectionRange};
use crate::host::HostBridge;
use crate::page::{NodeId, Page};

/// Capture the selected message range as a sequence of slices.
///
/// Chrome hiding and the window size change are undone on every exit
/// path; per-slice capture failures are skipped, not fatal.
pub fn run<P: Page, H: HostBridge>(
    page: &mut P,
    host: &mut H,
    messages: &[NodeId],
    range: SelectionRange,
    cfg: &CaptureConfig,
    cancel: &CancelFlag,
) -> Result<CaptureReport> {
    let selected = messages
        .get(range.start()..=range.end())
        .context("selection range refers to messages that were not scanned")?;

    let maximized = match host.maximize_for_capture() {
        Ok(viewport) => {
            log::info!(
                "maximized for capture: {}x{}",
                viewport.width,
                viewport.height
            );
            true
        }
        Err(err) => {
            log::warn!("could not maximize for capture, continuing: {err:?}");
            false
        }
    };
    pause(cfg.maximize_delay());

    let report = {
        let mut chrome = ChromeGuard::hide(page, selected);
        capture_loop(chrome.page(), host, selected, cfg, cancel)
        // guard drops here, restoring hidden chrome before the window
    };

    if maximized {
        if let Err(err) = host.restore_after_capture() {
            log::error!("failed to restore window after capture: {err:?}");
        }
    }

    log::info!(
        "capture finished: {} slices in {} iterations ({:?})",
        report.slices.len(),
        report.iterations,
        report.outcome
    );
    Ok(report)
}

fn capture_loop<P: Page, H: HostBridge>(
    page: &mut P,
    host: &mut H,
    selected: &[NodeId],
    cfg: &CaptureConfig,
    cancel: &CancelFlag,
) -> CaptureReport {
    let first = selected[0];
    let last = selected[selected.len() - 1];

    pause(cfg.settle_delay());
    page.scroll_into_view(first);
    pause(cfg.settle_delay());

    // Horizontal crop bounds: union of the selection's extents, padded
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    for &msg in selected {
        let rect = page.bounding_rect(msg);
        min_x = min_x.min(rect.left);
        max_x = max_x.max(rect.right);
    }
    let min_x = (min_x - cfg.padding).max(0);
    let width = (max_x + cfg.padding - min_x).max(1) as u32;

    let viewport_height = page.viewport_height();
    let mut slices: Vec<CaptureSlice> = Vec::new();
    let mut iterations = 0u32;
    let mut outcome = LoopOutcome::CapReached;

    while iterations < cfg.max_captures {
        if cancel.is_cancelled() {
            outcome = LoopOutcome::Cancelled;
            break;
        }
        iterations += 1;
        pause(cfg.capture_delay());

        // Vertical span of whatever part of the selection is on screen
        let mut span_top = viewport_height;
        let mut span_bottom = 0;
        let mut any_visible = false;
        for &msg in selected {
            let rect = page.bounding_rect(msg);
            if rect.visible_in_viewport(viewport_height) {
                any_visible = true;
                span_top = span_top.min(rect.top.max(0));
                span_bottom = span_bottom.max(rect.bottom.min(viewport_height));
            }
        }

        if !any_visible {
            if page.bounding_rect(first).top >= viewport_height {
                // Selection still below the fold: seek one viewport
                let prev = page.scroll_top();
                page.scroll_by(viewport_height - cfg.seek_margin);
                pause(cfg.scroll_delay());
                if page.scroll_top() == prev {
                    outcome = LoopOutcome::Stalled;
                    break;
                }
                continue;
            }
            outcome = LoopOutcome::SelectionLost;
            break;
        }

        let span_top = (span_top - cfg.padding).max(0);
        let span_bottom = (span_bottom + cfg.padding).min(viewport_height);
        let span_height = span_bottom - span_top;

        if span_height > 0 {
            let region = Region::new(min_x, span_top, width, span_height as u32);
            match host.capture_region(region) {
                Ok(png) => slices.push(CaptureSlice {
                    png,
                    height: span_height as u32,
                }),
                // Best effort: a failed slice is skipped, not fatal
                Err(err) => log::warn!("slice capture failed, skipping: {err:?}"),
            }
        }

        // Done once the last message's bottom edge is fully on screen
        if page.bounding_rect(last).bottom <= viewport_height - cfg.padding {
            outcome = LoopOutcome::Completed;
            break;
        }

        let amount = (span_height - cfg.scroll_overlap).max(cfg.min_scroll_step);
        let prev = page.scroll_top();
        page.scroll_by(amount);
        pause(cfg.scroll_delay());
        if page.scroll_top() == prev {
            outcome = LoopOutcome::Stalled;
            break;
        }
    }

    CaptureReport {
        slices,
        iterations,
        outcome,
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
