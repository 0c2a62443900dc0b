//! Temporary hiding of floating page chrome during capture
//!
//! Input bars, disclaimers, scroll buttons and anything else pinned to
//! the viewport would repeat in every slice, so they are display:none'd
//! for the duration of the run. The guard snapshots each element's
//! inline style and restores every snapshot on drop, which covers all
//! exit paths including cancellation and errors.

use crate::page::{NodeId, Page};

/// Selector table for chrome that floats over the conversation
pub const CHROME_SELECTORS: &[&str] = &[
    "input-area-v2",
    ".input-area",
    "[class*=\"input-area\"]",
    ".bottom-container",
    "[class*=\"bottom-container\"]",
    ".chat-input",
    ".scroll-to-bottom",
    "[class*=\"floating\"]",
    "[class*=\"sticky\"]",
    "footer",
    ".disclaimer",
    "[class*=\"disclaimer\"]",
    "[class*=\"gradient\"]",
    "[class*=\"fade\"]",
    "[class*=\"overlay\"]",
    ".gmat-caption",
    "[class*=\"scroll-button\"]",
    "[class*=\"new-message\"]",
    "mat-sidenav",
    ".side-navigation",
    "aside",
];

const HIDE_STYLE: &str = "display: none !important; visibility: hidden !important;";

/// Holds the page mutably while chrome is hidden; dropping it restores
/// every touched element's original inline style
pub struct ChromeGuard<'a, P: Page> {
    page: &'a mut P,
    hidden: Vec<(NodeId, String)>,
}

impl<'a, P: Page> ChromeGuard<'a, P> {
    /// Hide every visible chrome element that does not contain, and is
    /// not contained by, a selected message
    pub fn hide(page: &'a mut P, selection: &[NodeId]) -> Self {
        let mut candidates: Vec<NodeId> = CHROME_SELECTORS
            .iter()
            .flat_map(|s| page.query_all(s))
            .collect();
        candidates.extend(page.fixed_or_sticky());
        candidates.sort_by_key(|n| page.doc_position(*n));
        candidates.dedup();

        let mut hidden = Vec::new();
        for node in candidates {
            if !page.is_visible(node) {
                continue;
            }
            let overlaps = selection
                .iter()
                .any(|m| page.contains(node, *m) || page.contains(*m, node));
            if overlaps {
                continue;
            }
            let original = page.style_text(node);
            let combined = if original.is_empty() {
                HIDE_STYLE.to_string()
            } else if original.trim_end().ends_with(';') {
                format!("{original} {HIDE_STYLE}")
            } else {
                format!("{original}; {HIDE_STYLE}")
            };
            page.set_style_text(node, &combined);
            hidden.push((node, original));
        }

        log::debug!("hid {} chrome elements for capture", hidden.len());
        Self { page, hidden }
    }

    /// Access the page while the guard is alive
    pub fn page(&mut self) -> &mut P {
        self.page
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

impl<P: Page> Drop for ChromeGuard<'_, P> {
    fn drop(&mut self) {
        for (node, original) in self.hidden.drain(..) {
            self.page.set_style_text(node, &original);
        }
    }
}
