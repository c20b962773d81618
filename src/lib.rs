//! floating-toc: a table of contents sidebar that follows the reader.
//!
//! The widget lists the section headers of a page inside a box, keeps the box floating beside
//! the content while the page scrolls, highlights the link of the section in view and animates
//! the page to a section when its link is clicked.
//!
//! All behaviour sits behind the [`page::Page`] trait. On `wasm32` the `web` module binds it to
//! the browser DOM and exports `TocWidget` to JavaScript; elsewhere [`page::memory::MemoryPage`]
//! provides a deterministic document for tests and for the `floating-toc` simulator.

pub mod animation;
pub mod config;
pub mod error;
pub mod layout;
pub mod markup;
pub mod page;
pub mod toc;
pub mod tracking;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{Config, Options, Overrides};
pub use error::{Result, TocError};
pub use toc::{ScrollUpdate, TableOfContents};
