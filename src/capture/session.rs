//! Screenshot session lifecycle
//!
//! A session owns the scanned message list and the selection machine,
//! and applies the transient highlight classes the page shows while the
//! user picks a range. `SessionManager` enforces the single-instance
//! rule: entering selection mode while a session is active toggles it
//! off instead.

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::capture::{CancelFlag, LoopOutcome, runner};
use crate::config::CaptureConfig;
use crate::domain::{ClickOutcome, SelectionState};
use crate::host::{HostBridge, SaveOutcome};
use crate::page::{NodeId, Page, scan_messages};
use crate::stitch;

/// Classes applied to message elements while selecting
pub const CLASS_SELECTABLE: &str = "chatshot-selectable";
pub const CLASS_START: &str = "chatshot-start";
pub const CLASS_END: &str = "chatshot-end";
pub const CLASS_IN_RANGE: &str = "chatshot-in-range";

const HIGHLIGHT_CLASSES: &[&str] = &[CLASS_START, CLASS_END, CLASS_IN_RANGE];

/// One active screenshot selection over a scanned message list
pub struct ScreenshotSession {
    messages: Vec<NodeId>,
    selection: SelectionState,
}

impl ScreenshotSession {
    fn begin<P: Page>(page: &mut P) -> Result<Self> {
        let messages = scan_messages(page)?;
        for &msg in &messages {
            page.add_class(msg, CLASS_SELECTABLE);
        }
        log::info!("screenshot mode started with {} messages", messages.len());
        Ok(Self {
            messages,
            selection: SelectionState::begin(),
        })
    }

    pub fn messages(&self) -> &[NodeId] {
        &self.messages
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    fn click<P: Page>(&mut self, page: &mut P, node: NodeId) -> ClickOutcome {
        let Some(index) = self.messages.iter().position(|&m| m == node) else {
            return ClickOutcome::Ignored;
        };
        let outcome = self.selection.click(index);
        match outcome {
            ClickOutcome::StartMarked(i) => {
                page.add_class(self.messages[i], CLASS_START);
                page.add_class(self.messages[i], CLASS_IN_RANGE);
            }
            ClickOutcome::RangeCompleted(range) => {
                for (i, &msg) in self.messages.iter().enumerate() {
                    for class in HIGHLIGHT_CLASSES {
                        page.remove_class(msg, class);
                    }
                    if range.contains(i) {
                        page.add_class(msg, CLASS_IN_RANGE);
                    }
                }
                page.add_class(self.messages[range.start()], CLASS_START);
                page.add_class(self.messages[range.end()], CLASS_END);
            }
            ClickOutcome::Ignored => {}
        }
        outcome
    }

    fn clear_highlights<P: Page>(&self, page: &mut P) {
        for &msg in &self.messages {
            for class in HIGHLIGHT_CLASSES {
                page.remove_class(msg, class);
            }
        }
    }

    /// Remove every class the session added, highlight and selectable
    fn clear_all_classes<P: Page>(&self, page: &mut P) {
        self.clear_highlights(page);
        for &msg in &self.messages {
            page.remove_class(msg, CLASS_SELECTABLE);
        }
    }
}

/// What a toggle call did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started { message_count: usize },
    Ended,
}

/// Terminal result of a capture call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureResult {
    /// Stitched image written to disk
    Saved(PathBuf),
    /// Capture and stitch succeeded, user dismissed the save dialog
    SaveCancelled,
    /// Run was cancelled mid-loop; nothing written
    Cancelled,
}

/// Owns at most one session and routes page/host events to it
#[derive(Default)]
pub struct SessionManager {
    active: Option<ScreenshotSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&ScreenshotSession> {
        self.active.as_ref()
    }

    /// Enter selection mode, or leave it if already active.
    ///
    /// A page with no capturable messages is a setup failure: the error
    /// is returned, the mode never starts, and the host is told the
    /// mode ended so its UI can reset.
    pub fn toggle<P: Page, H: HostBridge>(
        &mut self,
        page: &mut P,
        host: &mut H,
    ) -> Result<ToggleOutcome> {
        if let Some(session) = self.active.take() {
            session.clear_all_classes(page);
            host.notify_mode_ended();
            log::info!("screenshot mode toggled off");
            return Ok(ToggleOutcome::Ended);
        }

        match ScreenshotSession::begin(page) {
            Ok(session) => {
                let message_count = session.messages.len();
                self.active = Some(session);
                Ok(ToggleOutcome::Started { message_count })
            }
            Err(err) => {
                host.notify_mode_ended();
                Err(err)
            }
        }
    }

    /// Route a click on a page element to the active session
    pub fn click<P: Page>(&mut self, page: &mut P, node: NodeId) -> ClickOutcome {
        match self.active.as_mut() {
            Some(session) => session.click(page, node),
            None => ClickOutcome::Ignored,
        }
    }

    /// Clear both endpoints and start the selection over
    pub fn reset<P: Page>(&mut self, page: &mut P) {
        if let Some(session) = self.active.as_mut() {
            session.selection.reset();
            session.clear_highlights(page);
        }
    }

    /// Escape or explicit cancel: tear the session down entirely
    pub fn cancel<P: Page, H: HostBridge>(&mut self, page: &mut P, host: &mut H) {
        if let Some(mut session) = self.active.take() {
            session.selection.cancel();
            session.clear_all_classes(page);
            host.notify_mode_ended();
            log::info!("screenshot mode cancelled");
        }
    }

    /// Run the capture loop over the selected range, stitch the slices
    /// and hand the PNG to the host's save prompt.
    ///
    /// Requires a completed selection; without one the session stays
    /// active and an error is returned. Once the loop starts, the
    /// session ends on every path, successful or not.
    pub fn capture<P: Page, H: HostBridge>(
        &mut self,
        page: &mut P,
        host: &mut H,
        cfg: &CaptureConfig,
        cancel: &CancelFlag,
    ) -> Result<CaptureResult> {
        let Some(session) = self.active.as_mut() else {
            bail!("screenshot mode is not active");
        };
        let Some(range) = session.selection.range() else {
            bail!("selection incomplete: pick a start and an end message first");
        };

        // Highlighting must not appear in the output
        session.clear_all_classes(page);
        let messages = session.messages.clone();

        let result = runner::run(page, host, &messages, range, cfg, cancel).and_then(|report| {
            if report.outcome == LoopOutcome::Cancelled {
                return Ok(CaptureResult::Cancelled);
            }
            if report.slices.is_empty() {
                bail!("nothing captured: every slice failed or the selection never became visible");
            }
            let image = stitch::stitch(&report.slices)?;
            let png = stitch::encode_png(&image)?;
            match host.prompt_save_and_write(&png)? {
                SaveOutcome::Saved(path) => {
                    log::info!("screenshot saved to {}", path.display());
                    Ok(CaptureResult::Saved(path))
                }
                SaveOutcome::Cancelled => Ok(CaptureResult::SaveCancelled),
            }
        });

        self.active = None;
        host.notify_mode_ended();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testutil::TestHost;
    use crate::domain::Rect;
    use crate::page::ScriptedPage;

    fn page_with_messages(count: i32) -> (ScriptedPage, Vec<NodeId>) {
        let mut page = ScriptedPage::new(800, 600);
        let mut nodes = Vec::new();
        for i in 0..count {
            nodes.push(page.add_message("model-response", i * 225, (i + 1) * 225));
        }
        (page, nodes)
    }

    #[test]
    fn test_toggle_starts_and_ends_mode() {
        let (mut page, nodes) = page_with_messages(3);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();

        let outcome = manager.toggle(&mut page, &mut host).unwrap();
        assert_eq!(outcome, ToggleOutcome::Started { message_count: 3 });
        assert!(manager.is_active());
        assert!(page.has_class(nodes[0], CLASS_SELECTABLE));

        let outcome = manager.toggle(&mut page, &mut host).unwrap();
        assert_eq!(outcome, ToggleOutcome::Ended);
        assert!(!manager.is_active());
        assert!(host.mode_ended);
        for &node in &nodes {
            assert!(page.classes(node).is_empty());
        }
    }

    #[test]
    fn test_toggle_on_empty_page_aborts_before_selection() {
        let mut page = ScriptedPage::new(800, 600);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();

        let err = manager.toggle(&mut page, &mut host).unwrap_err();
        assert!(err.to_string().contains("no messages found"));
        assert!(!manager.is_active());
        assert!(host.mode_ended);
    }

    #[test]
    fn test_click_flow_highlights_the_range() {
        let (mut page, nodes) = page_with_messages(6);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();

        manager.click(&mut page, nodes[4]);
        assert!(page.has_class(nodes[4], CLASS_START));
        assert!(page.has_class(nodes[4], CLASS_IN_RANGE));

        // Second click above the start: range normalizes to 1..=4
        manager.click(&mut page, nodes[1]);
        assert!(page.has_class(nodes[1], CLASS_START));
        assert!(page.has_class(nodes[4], CLASS_END));
        for i in 1..=4 {
            assert!(page.has_class(nodes[i], CLASS_IN_RANGE));
        }
        assert!(!page.has_class(nodes[0], CLASS_IN_RANGE));
        assert!(!page.has_class(nodes[5], CLASS_IN_RANGE));
    }

    #[test]
    fn test_click_on_non_message_is_ignored() {
        let (mut page, _) = page_with_messages(3);
        let stray = page.add_fixed("footer", Rect::new(0, 550, 800, 600));
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();

        assert_eq!(manager.click(&mut page, stray), ClickOutcome::Ignored);
    }

    #[test]
    fn test_reset_clears_highlights_but_keeps_mode() {
        let (mut page, nodes) = page_with_messages(4);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[0]);
        manager.click(&mut page, nodes[2]);

        manager.reset(&mut page);
        assert!(manager.is_active());
        assert_eq!(
            manager.session().unwrap().selection(),
            SelectionState::AwaitingStart
        );
        for &node in &nodes {
            assert!(page.has_class(node, CLASS_SELECTABLE));
            assert!(!page.has_class(node, CLASS_IN_RANGE));
            assert!(!page.has_class(node, CLASS_START));
            assert!(!page.has_class(node, CLASS_END));
        }
    }

    #[test]
    fn test_capture_without_range_keeps_session() {
        let (mut page, nodes) = page_with_messages(4);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[0]);

        let err = manager
            .capture(
                &mut page,
                &mut host,
                &CaptureConfig::instant(),
                &CancelFlag::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("selection incomplete"));
        assert!(manager.is_active());
    }

    #[test]
    fn test_full_capture_saves_a_stitched_image() {
        let (mut page, nodes) = page_with_messages(10);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[2]);
        manager.click(&mut page, nodes[5]);

        let result = manager
            .capture(
                &mut page,
                &mut host,
                &CaptureConfig::instant(),
                &CancelFlag::new(),
            )
            .unwrap();
        assert!(matches!(result, CaptureResult::Saved(_)));
        assert!(!manager.is_active());
        assert!(host.mode_ended);

        // The saved PNG decodes to the summed slice height
        let png = host.saved_png.as_deref().unwrap();
        let img = image::load_from_memory(png).unwrap().to_rgba8();
        assert!(img.height() >= 900);

        // No residual classes on any message
        for &node in &nodes {
            assert!(page.classes(node).is_empty());
        }
    }

    #[test]
    fn test_save_dialog_cancel_writes_nothing() {
        let (mut page, nodes) = page_with_messages(10);
        let mut host = TestHost {
            cancel_save: true,
            ..TestHost::default()
        };
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[2]);
        manager.click(&mut page, nodes[5]);

        let result = manager
            .capture(
                &mut page,
                &mut host,
                &CaptureConfig::instant(),
                &CancelFlag::new(),
            )
            .unwrap();
        assert_eq!(result, CaptureResult::SaveCancelled);
        assert!(host.saved_png.is_none());
    }

    #[test]
    fn test_all_slices_failing_reports_nothing_captured() {
        let (mut page, nodes) = page_with_messages(10);
        let mut host = TestHost {
            fail_captures: (1..=50).collect(),
            ..TestHost::default()
        };
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[2]);
        manager.click(&mut page, nodes[5]);

        let err = manager
            .capture(
                &mut page,
                &mut host,
                &CaptureConfig::instant(),
                &CancelFlag::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("nothing captured"));
        assert!(host.saved_png.is_none());
        // Session still ended and the host was told
        assert!(!manager.is_active());
        assert!(host.mode_ended);
    }

    #[test]
    fn test_cancel_mid_loop_restores_styles_and_saves_nothing() {
        let (mut page, nodes) = page_with_messages(10);
        let bar = page.add_fixed(".input-area", Rect::new(0, 550, 800, 600));
        page.set_style_text(bar, "opacity: 0.9;");

        let cancel = CancelFlag::new();
        let mut host = TestHost {
            cancel_after_capture: Some((1, cancel.clone())),
            ..TestHost::default()
        };
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[2]);
        manager.click(&mut page, nodes[5]);

        let result = manager
            .capture(&mut page, &mut host, &CaptureConfig::instant(), &cancel)
            .unwrap();
        assert_eq!(result, CaptureResult::Cancelled);
        assert!(host.saved_png.is_none());
        assert!(!manager.is_active());
        assert!(host.mode_ended);

        // Every style attribute is back to its pre-capture value
        assert_eq!(page.style_text(bar), "opacity: 0.9;");
        for &node in &nodes {
            assert!(page.classes(node).is_empty());
        }
    }

    #[test]
    fn test_cancel_tears_down_selection_mode() {
        let (mut page, nodes) = page_with_messages(4);
        let mut host = TestHost::default();
        let mut manager = SessionManager::new();
        manager.toggle(&mut page, &mut host).unwrap();
        manager.click(&mut page, nodes[1]);

        manager.cancel(&mut page, &mut host);
        assert!(!manager.is_active());
        assert!(host.mode_ended);
        for &node in &nodes {
            assert!(page.classes(node).is_empty());
        }
    }
}
