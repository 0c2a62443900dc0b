//! Boundary to the live document
//!
//! The pipeline never touches a real DOM; it talks to anything that can
//! answer the handful of queries the inject flow needs (selector
//! matching, bounding rects, scrolling, inline style and class edits).
//! The surrounding application adapts its web view to this trait;
//! [`scripted::ScriptedPage`] is a deterministic in-memory
//! implementation used by tests and the demo binary.

pub mod scripted;

use anyhow::{Result, bail};

use crate::domain::Rect;

pub use scripted::ScriptedPage;

/// Opaque handle to one document element, assigned by the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Message elements on Gemini are custom elements; each selector is
/// queried separately and the results merged in document order
pub const PRIMARY_MESSAGE_SELECTORS: &[&str] = &["user-query", "model-response"];

/// Generic fallback for AI Studio style markup
pub const FALLBACK_MESSAGE_SELECTORS: &[&str] =
    &[".turn-content", ".message-content", "[data-turn-id]"];

/// Everything the capture flow needs from the live document.
///
/// Rects are in viewport coordinates, like `getBoundingClientRect`;
/// scroll offsets are in document pixels. Implementations are expected
/// to clamp `scroll_by` to the scrollable extent, which is what the
/// stall detection in the capture loop relies on.
pub trait Page {
    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Total order of the node within the document, for merging
    /// separately queried selector results
    fn doc_position(&self, node: NodeId) -> u64;

    /// Current bounding rect of the node, viewport coordinates
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Whether the element takes up any space on screen
    fn is_visible(&self, node: NodeId) -> bool;

    /// Whether `ancestor` is `node` or one of its ancestors
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// All visible elements with `position: fixed` or `sticky`
    fn fixed_or_sticky(&self) -> Vec<NodeId>;

    /// The element's inline style text (`style.cssText`)
    fn style_text(&self, node: NodeId) -> String;

    /// Replace the element's inline style text
    fn set_style_text(&mut self, node: NodeId, style: &str);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn viewport_height(&self) -> i32;

    fn scroll_top(&self) -> i32;

    fn scroll_by(&mut self, dy: i32);

    /// Scroll so the node's top edge sits at the top of the viewport
    fn scroll_into_view(&mut self, node: NodeId);
}

/// Find the chat messages to offer for selection, in document order.
///
/// Prefers the platform's semantic selectors and falls back to the
/// generic set. An empty result is a setup failure: the caller must
/// abort before entering selection mode and tell the user.
pub fn scan_messages<P: Page>(page: &P) -> Result<Vec<NodeId>> {
    let mut messages = collect(page, PRIMARY_MESSAGE_SELECTORS);

    if messages.is_empty() {
        messages = collect(page, FALLBACK_MESSAGE_SELECTORS);
    }

    if messages.is_empty() {
        bail!("no messages found: the page has no capturable chat turns");
    }

    log::debug!("scanned {} messages", messages.len());
    Ok(messages)
}

fn collect<P: Page>(page: &P, selectors: &[&str]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = selectors
        .iter()
        .flat_map(|s| page.query_all(s))
        .collect();
    nodes.sort_by_key(|n| page.doc_position(*n));
    nodes.dedup();
    nodes
}
