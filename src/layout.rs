//! Page layout descriptions for driving the widget without a browser.
//!
//! A layout is a handful of numbers: where the root sits, how tall the box is, and where each
//! section starts inside the items container. [`Layout::mount`] turns it into a
//! [`MemoryPage`] whose markup matches whatever selectors the config uses.

use crate::config::Config;
use crate::error::{Result, TocError};
use crate::page::memory::{MemoryPage, NodeId};
use facet::Facet;
use std::fs;
use std::path::Path;

#[derive(Facet, Clone, Debug, PartialEq)]
/// Geometry of a documentation page hosting the sidebar.
pub struct Layout {
    #[facet(default = 1280.0)]
    /// Viewport width, compared against the floating cutoff.
    pub viewport_width: f64,
    #[facet(default = 800.0)]
    /// Viewport height, which bounds how far the page can scroll.
    pub viewport_height: f64,
    #[facet(default = ".row.toc".to_string())]
    /// Selector the root element is built to match.
    pub root_selector: String,
    #[facet(default = 0.0)]
    /// Document top of the root element.
    pub root_top: f64,
    /// Height of the root element.
    pub root_height: f64,
    #[facet(default = 0.0)]
    /// Resting offset of the box inside the root.
    pub box_offset: f64,
    /// Height of the box.
    pub box_height: f64,
    #[facet(default = 0.0)]
    /// Offset of the items container inside the root.
    pub items_offset: f64,
    #[facet(default = 800.0)]
    /// Space below the root before the document ends.
    pub footer_height: f64,
    #[facet(default)]
    /// Sections in document order.
    pub sections: Vec<SectionLayout>,
}

#[derive(Facet, Clone, Debug, PartialEq)]
/// One section of the page.
pub struct SectionLayout {
    /// Header text.
    pub title: String,
    /// Offset of the section inside the items container.
    pub offset: f64,
    #[facet(default = 200.0)]
    /// Height of the section.
    pub height: f64,
}

impl Layout {
    /// Read and parse a TOML layout file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a layout.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a TOML layout.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::Toml`] if required keys are missing or mistyped.
    pub fn from_toml(contents: &str) -> Result<Self> {
        facet_toml::from_str::<Self>(contents).map_err(|e| TocError::Toml(e.to_string()))
    }

    #[must_use]
    /// Build the page, returning it with the root element.
    ///
    /// Elements get the tag and classes of the last compound of the configured selectors, so
    /// `.toc-item .header` yields `<div class="header">` inside `<div class="toc-item">`.
    pub fn mount(&self, config: &Config) -> (MemoryPage, NodeId) {
        let page = MemoryPage::new();
        let document = page.document();
        page.set_geometry(
            document,
            0.0,
            self.root_top + self.root_height + self.footer_height,
        );

        let root = append_matching(&page, document, &self.root_selector);
        page.set_geometry(root, self.root_top, self.root_height);

        let boxed = append_matching(&page, root, &config.box_selector);
        page.set_geometry(boxed, self.box_offset, self.box_height);
        append_matching(&page, boxed, &config.box_items_container_selector);

        let items = append_matching(&page, root, &config.items_container_selector);
        let items_height = self
            .sections
            .iter()
            .map(|s| s.offset + s.height)
            .fold(0.0, f64::max);
        page.set_geometry(items, self.items_offset, items_height);

        for section in &self.sections {
            let item = append_matching(&page, items, &config.item_selector);
            page.set_geometry(item, section.offset, section.height);
            let header = append_matching(&page, item, &config.item_header_selector);
            page.set_text(header, &section.title);
        }

        page.set_viewport(self.viewport_width, self.viewport_height);
        (page, root)
    }
}

fn append_matching(page: &MemoryPage, parent: NodeId, selector: &str) -> NodeId {
    let compound = selector.split_whitespace().next_back().unwrap_or("");
    let mut pieces = compound.split('.');
    let tag = pieces
        .next()
        .filter(|t| !t.is_empty() && *t != "*")
        .unwrap_or("div");
    let classes = pieces.collect::<Vec<_>>().join(" ");
    page.append(parent, tag, &classes)
}

#[cfg(test)]
#[path = "tests/layout.rs"]
mod tests;
