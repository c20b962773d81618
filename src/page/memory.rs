//! A deterministic in-memory document.
//!
//! `MemoryPage` keeps an element tree with explicit geometry: every element sits at an offset
//! below its parent's top edge and has a fixed height. An inline `top` style replaces that
//! offset, which is how an absolutely positioned floating box behaves inside its root.
//!
//! Markup and selectors go through `scraper`, so child and sibling combinators, attribute
//! selectors and pseudo-classes behave as they do in a browser. Queries serialize the tree with
//! each element tagged by its [`NodeId`], parse it and map the matches back.

use crate::error::{Result, TocError};
use crate::markup::escape_html;
use crate::page::Page;
use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use std::fmt::Write;

const NODE_ID_ATTRIBUTE: &str = "data-memory-node";

const VOID_TAGS: [&str; 9] = ["area", "br", "col", "embed", "hr", "img", "input", "link", "meta"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Handle to a node of a [`MemoryPage`].
pub struct NodeId(usize);

#[derive(Debug)]
enum Kind {
    Element {
        tag: String,
        classes: Vec<String>,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset: f64,
    height: f64,
    style_top: Option<f64>,
}

impl Node {
    fn element(tag: &str, classes: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind: Kind::Element {
                tag: tag.to_ascii_lowercase(),
                classes: classes.split_whitespace().map(str::to_string).collect(),
                attributes: Vec::new(),
            },
            parent,
            children: Vec::new(),
            offset: 0.0,
            height: 0.0,
            style_top: None,
        }
    }

    fn text(text: String, parent: NodeId) -> Self {
        Self {
            kind: Kind::Text(text),
            parent: Some(parent),
            children: Vec::new(),
            offset: 0.0,
            height: 0.0,
            style_top: None,
        }
    }
}

#[derive(Debug)]
/// In-memory [`Page`] with explicit layout and a clamped scroll offset.
pub struct MemoryPage {
    nodes: RefCell<Vec<Node>>,
    scroll_top: Cell<f64>,
    viewport_width: Cell<f64>,
    viewport_height: Cell<f64>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    #[must_use]
    /// An empty document with a 1280x800 viewport.
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![Node::element("html", "", None)]),
            scroll_top: Cell::new(0.0),
            viewport_width: Cell::new(1280.0),
            viewport_height: Cell::new(800.0),
        }
    }

    #[must_use]
    /// The document element; its height bounds the scroll range.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// Append an element with space-separated `classes` as the last child of `parent`.
    pub fn append(&self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(Node::element(tag, classes, Some(parent)));
        nodes[parent.0].children.push(id);
        id
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&self, id: NodeId, text: &str) {
        self.detach_children(id);
        let mut nodes = self.nodes.borrow_mut();
        let text_id = NodeId(nodes.len());
        nodes.push(Node::text(text.to_string(), id));
        nodes[id.0].children.push(text_id);
    }

    /// Place `id` at `offset` below its parent's top edge with the given height.
    pub fn set_geometry(&self, id: NodeId, offset: f64, height: f64) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[id.0].offset = offset;
        nodes[id.0].height = height;
    }

    /// Resize the viewport.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport_width.set(width);
        self.viewport_height.set(height);
        self.set_scroll_top(self.scroll_top.get());
    }

    #[must_use]
    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.height(&self.document()) - self.viewport_height.get()).max(0.0)
    }

    #[must_use]
    /// Classes of an element, in insertion order.
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        match &self.nodes.borrow()[id.0].kind {
            Kind::Element { classes, .. } => classes.clone(),
            Kind::Text(_) => Vec::new(),
        }
    }

    #[must_use]
    /// Lower-case tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<String> {
        match &self.nodes.borrow()[id.0].kind {
            Kind::Element { tag, .. } => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    #[must_use]
    /// Value of an attribute set through injected markup.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow()[id.0].kind {
            Kind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            Kind::Text(_) => None,
        }
    }

    #[must_use]
    /// Inline `top` style, if one has been set.
    pub fn style_top(&self, id: NodeId) -> Option<f64> {
        self.nodes.borrow()[id.0].style_top
    }

    #[must_use]
    /// Element children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|child| matches!(nodes[child.0].kind, Kind::Element { .. }))
            .collect()
    }

    fn detach_children(&self, id: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[id.0].children);
        for child in children {
            nodes[child.0].parent = None;
        }
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn push_text(&self, parent: NodeId, text: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(Node::text(text.to_string(), parent));
        nodes[parent.0].children.push(id);
    }

    fn copy_children(&self, parent: NodeId, source: ElementRef<'_>) {
        for child in source.children() {
            if let Some(element) = ElementRef::wrap(child) {
                let value = element.value();
                let id = self.append(parent, value.name(), "");
                if let Kind::Element {
                    classes,
                    attributes,
                    ..
                } = &mut self.nodes.borrow_mut()[id.0].kind
                {
                    *classes = value.classes().map(str::to_string).collect();
                    *attributes = value
                        .attrs()
                        .filter(|(key, _)| *key != "class")
                        .map(|(key, val)| (key.to_string(), val.to_string()))
                        .collect();
                }
                self.copy_children(id, element);
            } else if let Some(text) = child.value().as_text() {
                self.push_text(parent, text);
            }
        }
    }

    fn to_html(&self) -> String {
        let nodes = self.nodes.borrow();
        let mut html = String::from("<!DOCTYPE html>");
        write_node(&nodes, self.document(), &mut html);
        html
    }

    fn select(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!(selector, "selector matches nothing: {e}");
                return Vec::new();
            }
        };
        let html = Html::parse_document(&self.to_html());
        let Some(scope) = html
            .tree
            .nodes()
            .filter_map(ElementRef::wrap)
            .find(|element| node_id(element) == Some(scope))
        else {
            return Vec::new();
        };
        scope
            .select(&selector)
            .filter_map(|element| node_id(&element))
            .collect()
    }
}

impl Page for MemoryPage {
    type Element = NodeId;

    fn query(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.select(*scope, selector).into_iter().next()
    }

    fn query_all(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        self.select(*scope, selector)
    }

    fn text(&self, element: &NodeId) -> String {
        let nodes = self.nodes.borrow();
        if let Kind::Text(text) = &nodes[element.0].kind {
            return text.clone();
        }
        self.descendants(*element)
            .into_iter()
            .filter_map(|id| match &nodes[id.0].kind {
                Kind::Text(text) => Some(text.as_str()),
                Kind::Element { .. } => None,
            })
            .collect()
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) -> Result<()> {
        self.detach_children(*element);
        let fragment = Html::parse_fragment(html);
        self.copy_children(*element, fragment.root_element());
        Ok(())
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<()> {
        check_class(class)?;
        if let Kind::Element { classes, .. } = &mut self.nodes.borrow_mut()[element.0].kind {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        Ok(())
    }

    fn remove_class(&self, element: &NodeId, class: &str) -> Result<()> {
        check_class(class)?;
        if let Kind::Element { classes, .. } = &mut self.nodes.borrow_mut()[element.0].kind {
            classes.retain(|c| c != class);
        }
        Ok(())
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.classes(*element).iter().any(|c| c == class)
    }

    fn set_top(&self, element: &NodeId, top: f64) -> Result<()> {
        self.nodes.borrow_mut()[element.0].style_top = Some(top);
        Ok(())
    }

    fn document_top(&self, element: &NodeId) -> f64 {
        let nodes = self.nodes.borrow();
        let mut top = 0.0;
        let mut cursor = Some(*element);
        while let Some(id) = cursor {
            let node = &nodes[id.0];
            top += node.style_top.unwrap_or(node.offset);
            cursor = node.parent;
        }
        top
    }

    fn viewport_top(&self, element: &NodeId) -> f64 {
        self.document_top(element) - self.scroll_top.get()
    }

    fn height(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].height
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    fn set_scroll_top(&self, top: f64) {
        self.scroll_top.set(top.clamp(0.0, self.max_scroll()));
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }
}

fn write_node(nodes: &[Node], id: NodeId, out: &mut String) {
    match &nodes[id.0].kind {
        Kind::Text(text) => out.push_str(&escape_html(text)),
        Kind::Element {
            tag,
            classes,
            attributes,
        } => {
            // Writing to a String cannot fail.
            let _ = write!(out, "<{tag} {NODE_ID_ATTRIBUTE}=\"{}\"", id.0);
            if !classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", escape_html(&classes.join(" ")));
            }
            for (key, value) in attributes {
                if key != NODE_ID_ATTRIBUTE {
                    let _ = write!(out, " {key}=\"{}\"", escape_html(value));
                }
            }
            out.push('>');
            if VOID_TAGS.contains(&tag.as_str()) {
                return;
            }
            for child in &nodes[id.0].children {
                write_node(nodes, *child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn node_id(element: &ElementRef<'_>) -> Option<NodeId> {
    element
        .value()
        .attr(NODE_ID_ATTRIBUTE)?
        .parse()
        .ok()
        .map(NodeId)
}

fn check_class(class: &str) -> Result<()> {
    if class.is_empty() || class.contains(char::is_whitespace) {
        return Err(TocError::Dom(format!("invalid class name `{class}`")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/memory_page.rs"]
mod tests;
