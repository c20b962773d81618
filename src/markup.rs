//! Link list markup.
//!
//! The list is rendered once as a single string and injected into the box, so everything here
//! is plain string assembly.

use std::fmt::Write;
use std::rc::Rc;

/// Maps a header's visible text to the markup of one list entry (without the `<li>`).
pub type ItemTemplate = Rc<dyn Fn(&str) -> String>;

/// `<a href="#">{title}</a>` with the title escaped.
#[must_use]
pub fn default_template() -> ItemTemplate {
    Rc::new(|title: &str| format!("<a href=\"#\">{}</a>", escape_html(title)))
}

/// Wrap each rendered title in `<li>` and the whole in a `<ul>`.
#[must_use]
pub fn render_list<'a>(
    titles: impl IntoIterator<Item = &'a str>,
    template: &ItemTemplate,
) -> String {
    let mut html = String::from("<ul>");
    for title in titles {
        // Writing to a String cannot fail.
        let _ = write!(html, "<li>{}</li>", template(title));
    }
    html.push_str("</ul>");
    html
}

/// Escape text for use inside element content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
