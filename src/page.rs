//! The document seam.
//!
//! The controller never touches a DOM directly; it goes through [`Page`]. The browser
//! implementation lives in `web` (wasm32 only) and the deterministic one used by tests and the
//! simulator lives in [`memory`].

pub mod memory;

use crate::error::Result;

/// Document operations the table of contents needs.
///
/// Coordinates are CSS pixels. "Document top" is measured from the top of the document and
/// does not change when the page scrolls; "viewport top" is the bounding-rect top and does.
pub trait Page {
    /// Handle to one element. Equality is identity.
    type Element: Clone + PartialEq;

    /// First descendant of `scope` matching `selector`.
    fn query(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;

    /// Every descendant of `scope` matching `selector`, in document order.
    fn query_all(&self, scope: &Self::Element, selector: &str) -> Vec<Self::Element>;

    /// Rendered text of an element.
    fn text(&self, element: &Self::Element) -> String;

    /// Replace the children of `element` with parsed `html`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the markup.
    fn set_inner_html(&self, element: &Self::Element, html: &str) -> Result<()>;

    /// Add `class` to the element's class list.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the class name.
    fn add_class(&self, element: &Self::Element, class: &str) -> Result<()>;

    /// Remove `class` from the element's class list.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the class name.
    fn remove_class(&self, element: &Self::Element, class: &str) -> Result<()>;

    /// Whether the element carries `class`.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Set the inline `top` style in pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be styled.
    fn set_top(&self, element: &Self::Element, top: f64) -> Result<()>;

    /// Distance from the top of the document to the element's top edge.
    fn document_top(&self, element: &Self::Element) -> f64;

    /// Distance from the top of the viewport to the element's top edge.
    fn viewport_top(&self, element: &Self::Element) -> f64;

    /// Rendered height of the element.
    fn height(&self, element: &Self::Element) -> f64;

    /// Current vertical scroll offset of the page.
    fn scroll_top(&self) -> f64;

    /// Scroll the page to `top`. The host may clamp the value.
    fn set_scroll_top(&self, top: f64);

    /// Width of the viewport.
    fn viewport_width(&self) -> f64;
}

impl<T: Page + ?Sized> Page for &T {
    type Element = T::Element;

    fn query(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element> {
        (**self).query(scope, selector)
    }

    fn query_all(&self, scope: &Self::Element, selector: &str) -> Vec<Self::Element> {
        (**self).query_all(scope, selector)
    }

    fn text(&self, element: &Self::Element) -> String {
        (**self).text(element)
    }

    fn set_inner_html(&self, element: &Self::Element, html: &str) -> Result<()> {
        (**self).set_inner_html(element, html)
    }

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<()> {
        (**self).add_class(element, class)
    }

    fn remove_class(&self, element: &Self::Element, class: &str) -> Result<()> {
        (**self).remove_class(element, class)
    }

    fn has_class(&self, element: &Self::Element, class: &str) -> bool {
        (**self).has_class(element, class)
    }

    fn set_top(&self, element: &Self::Element, top: f64) -> Result<()> {
        (**self).set_top(element, top)
    }

    fn document_top(&self, element: &Self::Element) -> f64 {
        (**self).document_top(element)
    }

    fn viewport_top(&self, element: &Self::Element) -> f64 {
        (**self).viewport_top(element)
    }

    fn height(&self, element: &Self::Element) -> f64 {
        (**self).height(element)
    }

    fn scroll_top(&self) -> f64 {
        (**self).scroll_top()
    }

    fn set_scroll_top(&self, top: f64) {
        (**self).set_scroll_top(top);
    }

    fn viewport_width(&self) -> f64 {
        (**self).viewport_width()
    }
}
