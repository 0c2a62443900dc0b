//! Deterministic in-memory [`Page`] implementation
//!
//! `ScriptedPage` models just enough of a document for the capture flow:
//! nodes with document-space rects, the selectors they match, inline
//! style text, class lists, fixed/sticky flags, and clamped scrolling.
//! It backs the module tests and the demo binary.

use std::collections::BTreeSet;

use crate::domain::Rect;
use crate::page::{NodeId, Page};

#[derive(Clone, Debug)]
struct Node {
    /// Selector strings this node matches (exact, comma lists split)
    selectors: Vec<String>,
    /// Bounding rect in document coordinates
    rect: Rect,
    /// Inline style text, appended to and restored like `style.cssText`
    style: String,
    classes: BTreeSet<String>,
    fixed: bool,
    parent: Option<usize>,
}

impl Node {
    fn hidden(&self) -> bool {
        self.style.contains("display: none")
    }
}

/// An in-memory document with a scrollable viewport
#[derive(Clone, Debug, Default)]
pub struct ScriptedPage {
    nodes: Vec<Node>,
    viewport_width: i32,
    viewport_height: i32,
    scroll_top: i32,
    /// Overrides the computed content height when set
    content_height: Option<i32>,
}

impl ScriptedPage {
    pub fn new(viewport_width: i32, viewport_height: i32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    /// Add a message element spanning the given document rows, with a
    /// default horizontal extent inside the viewport
    pub fn add_message(&mut self, selector: &str, top: i32, bottom: i32) -> NodeId {
        let rect = Rect::new(20, top, self.viewport_width - 20, bottom);
        self.add_node(selector, rect, false)
    }

    /// Add a fixed-position chrome element (input bar, overlay, ...)
    pub fn add_fixed(&mut self, selector: &str, rect: Rect) -> NodeId {
        self.add_node(selector, rect, true)
    }

    /// Add an arbitrary element
    pub fn add_node(&mut self, selector: &str, rect: Rect, fixed: bool) -> NodeId {
        self.nodes.push(Node {
            selectors: vec![selector.to_string()],
            rect,
            style: String::new(),
            classes: BTreeSet::new(),
            fixed,
            parent: None,
        });
        NodeId(self.nodes.len() as u64 - 1)
    }

    /// Make `child` a descendant of `parent` for containment queries
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[child.0 as usize].parent = Some(parent.0 as usize);
    }

    /// Pin the scrollable content height, e.g. to force a scroll stall
    pub fn set_content_height(&mut self, height: i32) {
        self.content_height = Some(height);
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes[node.0 as usize]
            .classes
            .iter()
            .cloned()
            .collect()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0 as usize].classes.contains(class)
    }

    fn max_scroll(&self) -> i32 {
        let content = self.content_height.unwrap_or_else(|| {
            self.nodes
                .iter()
                .filter(|n| !n.fixed)
                .map(|n| n.rect.bottom)
                .max()
                .unwrap_or(0)
        });
        (content - self.viewport_height).max(0)
    }
}

impl Page for ScriptedPage {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = selector.split(',').map(str::trim).collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.selectors.iter().any(|s| wanted.contains(&s.as_str())))
            .map(|(i, _)| NodeId(i as u64))
            .collect()
    }

    fn doc_position(&self, node: NodeId) -> u64 {
        node.0
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let n = &self.nodes[node.0 as usize];
        if n.fixed {
            // Fixed elements do not move with the scroll offset
            n.rect
        } else {
            n.rect.translate(0, -self.scroll_top)
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        let n = &self.nodes[node.0 as usize];
        !n.hidden() && n.rect.width() > 0 && n.rect.height() > 0
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return true;
        }
        let mut current = self.nodes[node.0 as usize].parent;
        while let Some(idx) = current {
            if idx == ancestor.0 as usize {
                return true;
            }
            current = self.nodes[idx].parent;
        }
        false
    }

    fn fixed_or_sticky(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.fixed && !n.hidden())
            .map(|(i, _)| NodeId(i as u64))
            .collect()
    }

    fn style_text(&self, node: NodeId) -> String {
        self.nodes[node.0 as usize].style.clone()
    }

    fn set_style_text(&mut self, node: NodeId, style: &str) {
        self.nodes[node.0 as usize].style = style.to_string();
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0 as usize].classes.insert(class.to_string());
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0 as usize].classes.remove(class);
    }

    fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    fn scroll_top(&self) -> i32 {
        self.scroll_top
    }

    fn scroll_by(&mut self, dy: i32) {
        self.scroll_top = (self.scroll_top + dy).clamp(0, self.max_scroll());
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        let top = self.nodes[node.0 as usize].rect.top;
        self.scroll_top = top.clamp(0, self.max_scroll());
    }
}
