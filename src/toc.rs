//! The table of contents controller.
//!
//! A controller is bound to one root element. Construction renders the link list into the box
//! once; afterwards the host feeds it two kinds of events. Scroll events recompute the floating
//! state, the box position and the active link. Link clicks start a navigation, which the host
//! then drives with [`TableOfContents::tick`] on a fixed-period timer until it reports that the
//! animation is over.
//!
//! Headers are queried from the page every time they are needed, never cached, so the Nth
//! header and the Nth rendered link always describe the same section as long as the document
//! keeps the structure it had at construction.

use crate::animation::{ScrollAnimation, TICK_MS};
use crate::config::{Config, Options};
use crate::error::{Result, TocError};
use crate::markup;
use crate::page::Page;
use crate::tracking;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
/// Derived state after one scroll recomputation.
pub struct ScrollUpdate {
    /// Page scroll offset the update was computed from.
    pub scroll_top: f64,
    /// Scroll offset relative to the root element's top.
    pub current_scroll: f64,
    /// Whether the box carries the floating class.
    pub floating: bool,
    /// Inline top applied to the box, when floating.
    pub box_top: Option<f64>,
    /// Index of the highlighted link; `None` when there are no sections.
    pub active: Option<usize>,
}

/// Controller for one table of contents sidebar.
pub struct TableOfContents<P: Page> {
    page: P,
    root: P::Element,
    box_element: P::Element,
    config: Config,
    links: Vec<P::Element>,
    current_scroll: f64,
    animation: Option<ScrollAnimation>,
}

impl<P: Page> TableOfContents<P> {
    /// Bind to `root`: locate the box, render one link per header and index the links.
    ///
    /// # Errors
    ///
    /// Fails if the config does not validate, if the box, the box's items list or the items
    /// container is missing, if the page rejects the rendered markup, or if the template's
    /// markup does not yield exactly one list entry per header. A rejected list is cleared
    /// from the box again.
    pub fn new(page: P, root: P::Element, options: Options) -> Result<Self> {
        let Options {
            config,
            item_template,
        } = options;
        config.validate()?;

        let box_element = page
            .query(&root, &config.box_selector)
            .ok_or_else(|| missing("box", &config.box_selector))?;
        let items_list = page
            .query(&box_element, &config.box_items_container_selector)
            .ok_or_else(|| missing("box items list", &config.box_items_container_selector))?;
        page.query(&root, &config.items_container_selector)
            .ok_or_else(|| missing("items container", &config.items_container_selector))?;

        let headers = page.query_all(&root, &config.header_selector());
        let titles: Vec<String> = headers.iter().map(|header| page.text(header)).collect();
        let html = markup::render_list(titles.iter().map(String::as_str), &item_template);
        page.set_inner_html(&items_list, &html)?;

        let links = page.query_all(&box_element, &config.link_selector());
        if links.len() != headers.len() {
            page.set_inner_html(&items_list, "")?;
            return Err(TocError::LinkCountMismatch {
                headers: headers.len(),
                links: links.len(),
            });
        }
        tracing::debug!(sections = links.len(), "table of contents rendered");

        Ok(Self {
            page,
            root,
            box_element,
            config,
            links,
            current_scroll: 0.0,
            animation: None,
        })
    }

    #[must_use]
    /// Section headers in document order, freshly queried.
    pub fn headers(&self) -> Vec<P::Element> {
        self.page.query_all(&self.root, &self.config.header_selector())
    }

    #[must_use]
    /// Rendered links, in the order of the headers they were built from.
    pub fn links(&self) -> &[P::Element] {
        &self.links
    }

    #[must_use]
    /// Ordinal of the section a rendered link belongs to.
    pub fn link_index_of(&self, link: &P::Element) -> Option<usize> {
        self.links.iter().position(|candidate| candidate == link)
    }

    /// Recompute the floating class, box position and active link for the page's scroll offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the page rejects a class or style change.
    pub fn on_scroll(&mut self) -> Result<ScrollUpdate> {
        let scroll_top = self.page.scroll_top();
        self.current_scroll = scroll_top - self.page.document_top(&self.root);

        let floating = tracking::should_float(
            self.current_scroll,
            self.config.scroll_top_min_value,
            self.page.viewport_width(),
            self.config.disable_floating_on_width_less_than,
        );
        if floating {
            self.page
                .add_class(&self.box_element, &self.config.box_floating_class)?;
        } else {
            self.page
                .remove_class(&self.box_element, &self.config.box_floating_class)?;
        }

        let box_top = if floating {
            let top = tracking::capped_box_top(
                self.current_scroll,
                self.page.height(&self.root),
                self.page.height(&self.box_element),
                self.config.bottom_scroll_margin,
            );
            self.page.set_top(&self.box_element, top)?;
            Some(top)
        } else {
            None
        };

        let active = self.highlight_active_link()?;
        tracing::trace!(
            scroll_top,
            current_scroll = self.current_scroll,
            floating,
            ?active,
            "scroll recomputed"
        );

        Ok(ScrollUpdate {
            scroll_top,
            current_scroll: self.current_scroll,
            floating,
            box_top,
            active,
        })
    }

    fn highlight_active_link(&self) -> Result<Option<usize>> {
        let box_top = self.page.viewport_top(&self.box_element);
        let header_tops = self
            .headers()
            .iter()
            .map(|header| self.page.viewport_top(header))
            .collect::<Vec<_>>();
        let active = tracking::active_index(box_top, header_tops, self.config.header_top_margin);

        for link in &self.links {
            self.page.remove_class(link, &self.config.item_active_class)?;
        }
        if let Some(link) = active.and_then(|index| self.links.get(index)) {
            self.page.add_class(link, &self.config.item_active_class)?;
        }
        Ok(active)
    }

    /// Start animating the page towards section `index`, superseding any running animation.
    ///
    /// Returns the destination scroll offset.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::SectionOutOfRange`] for an index past the last header, or
    /// [`TocError::MissingElement`] if the items container has left the document.
    pub fn navigate(&mut self, index: usize) -> Result<f64> {
        let headers = self.headers();
        let header = headers.get(index).ok_or(TocError::SectionOutOfRange {
            index,
            count: headers.len(),
        })?;
        let items = self
            .page
            .query(&self.root, &self.config.items_container_selector)
            .ok_or_else(|| missing("items container", &self.config.items_container_selector))?;

        let items_top = self.page.document_top(&items);
        let header_offset = self.page.document_top(header) - items_top;
        let destination = items_top + header_offset - self.config.header_top_margin;

        if self.config.jump_before_animating {
            self.page.set_scroll_top(destination);
        }
        let start = self.page.scroll_top();

        if self.animation.take().is_some() {
            tracing::debug!("superseding running scroll animation");
        }
        self.animation = Some(ScrollAnimation::new(
            start,
            destination,
            self.config.scroll_animation_time,
        ));
        tracing::debug!(index, start, destination, "navigating to section");
        Ok(destination)
    }

    /// Navigate to the section of a clicked link.
    ///
    /// Returns `None` without doing anything when the element is not one of the rendered links.
    /// Any `Some` means the click belonged to the table of contents, so the host suppresses the
    /// default action whether or not the navigation itself succeeded.
    pub fn on_link_click(&mut self, link: &P::Element) -> Option<Result<f64>> {
        let index = self.link_index_of(link)?;
        Some(self.navigate(index))
    }

    /// Advance the running animation by `step_ms` and apply its scroll offset.
    ///
    /// Returns whether an animation is still running afterwards.
    pub fn tick(&mut self, step_ms: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let frame = animation.advance(step_ms);
        self.page.set_scroll_top(frame.scroll_top);
        tracing::trace!(scroll_top = frame.scroll_top, "scroll animation tick");
        if frame.finished {
            self.animation = None;
        }
        !frame.finished
    }

    /// Tick at the standard period until the running animation finishes.
    ///
    /// Returns the number of ticks taken.
    pub fn settle(&mut self) -> usize {
        let mut ticks = 0;
        while self.is_animating() {
            self.tick(TICK_MS);
            ticks += 1;
        }
        ticks
    }

    /// Stop the running animation where it is. Returns whether one was running.
    pub fn cancel_animation(&mut self) -> bool {
        self.animation.take().is_some()
    }

    #[must_use]
    /// Whether a navigation animation is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[must_use]
    /// The running animation, if any.
    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    #[must_use]
    /// Scroll offset relative to the root, as of the last scroll event.
    pub fn current_scroll(&self) -> f64 {
        self.current_scroll
    }

    #[must_use]
    /// The merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    /// The page this controller drives.
    pub fn page(&self) -> &P {
        &self.page
    }

    #[must_use]
    /// The floating box element.
    pub fn box_element(&self) -> &P::Element {
        &self.box_element
    }
}

fn missing(role: &'static str, selector: &str) -> TocError {
    TocError::MissingElement {
        role,
        selector: selector.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/toc.rs"]
mod tests;
