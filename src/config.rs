//! Configuration for the table of contents widget.
//!
//! Defaults live on [`Config`] itself. A `floating-toc.toml` in the working directory (or any
//! file passed to [`Config::from_path`]) can replace them wholesale, while per-page tweaks come
//! in as [`Overrides`] using the camelCase option names a page script would pass. The item
//! template is a function and therefore travels separately in [`Options`].

use crate::error::{Result, TocError};
use crate::markup::{self, ItemTemplate};
use facet::Facet;
use scraper::Selector;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Name of the config file picked up by [`Config::load`].
pub const CONFIG_FILE_NAME: &str = "floating-toc.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// Selectors, class names and thresholds. Immutable once a widget is built.
pub struct Config {
    #[facet(default = ".toc-items".to_string())]
    /// Container holding every item; its top is the base of scroll destinations.
    pub items_container_selector: String,
    #[facet(default = ".toc-item".to_string())]
    /// One document section.
    pub item_selector: String,
    #[facet(default = ".header".to_string())]
    /// Header inside an item whose text becomes the link title.
    pub item_header_selector: String,
    #[facet(default = ".toc-box".to_string())]
    /// The floating box, looked up inside the root element.
    pub box_selector: String,
    #[facet(default = "floating".to_string())]
    /// Class applied to the box while it floats.
    pub box_floating_class: String,
    #[facet(default = ".toc-items-list".to_string())]
    /// Element inside the box that receives the rendered link list.
    pub box_items_container_selector: String,
    #[facet(default = "active".to_string())]
    /// Class applied to the link of the section in view.
    pub item_active_class: String,
    #[facet(default = 0.0)]
    /// Scroll value (relative to the root) from which the box floats.
    pub scroll_top_min_value: f64,
    #[facet(default = 0.0)]
    /// Gap kept between the floating box and the bottom of the root.
    pub bottom_scroll_margin: f64,
    #[facet(default = 15.0)]
    /// Offset for fixed page chrome, used for hit-testing and scroll targets.
    pub header_top_margin: f64,
    #[facet(default = 500.0)]
    /// Duration of the navigation animation in milliseconds.
    pub scroll_animation_time: f64,
    #[facet(default)]
    /// Viewport width at or below which the box never floats. `None` disables the check.
    pub disable_floating_on_width_less_than: Option<f64>,
    #[facet(default = true)]
    /// Set the scroll position to the destination before the animation starts.
    ///
    /// With this on, the animation interpolates from the destination to itself, so navigation
    /// looks like an instant jump. Turn it off to see the interpolated scroll.
    pub jump_before_animating: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items_container_selector: ".toc-items".to_string(),
            item_selector: ".toc-item".to_string(),
            item_header_selector: ".header".to_string(),
            box_selector: ".toc-box".to_string(),
            box_floating_class: "floating".to_string(),
            box_items_container_selector: ".toc-items-list".to_string(),
            item_active_class: "active".to_string(),
            scroll_top_min_value: 0.0,
            bottom_scroll_margin: 0.0,
            header_top_margin: 15.0,
            scroll_animation_time: 500.0,
            disable_floating_on_width_less_than: None,
            jump_before_animating: true,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from `floating-toc.toml` if present, else the defaults.
    pub fn load() -> Self {
        if !Path::new(CONFIG_FILE_NAME).exists() {
            return Self::default();
        }
        match Self::from_path(CONFIG_FILE_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring {CONFIG_FILE_NAME}: {e}");
                Self::default()
            }
        }
    }

    /// Read and parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse config TOML; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::Toml`] if the document does not describe a config, or
    /// [`TocError::InvalidOption`] if it does but a value is unusable.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config = facet_toml::from_str::<Self>(contents)
            .map_err(|e| TocError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every selector parses, every class is a single token and every number is finite.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::InvalidOption`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        for (option, selector) in [
            ("itemsContainerSelector", self.items_container_selector.clone()),
            ("itemHeaderSelector", self.header_selector()),
            ("boxSelector", self.box_selector.clone()),
            ("boxItemsContainerSelector", self.link_selector()),
        ] {
            Selector::parse(&selector).map_err(|e| TocError::InvalidOption {
                option,
                reason: format!("`{selector}` is not a valid selector: {e}"),
            })?;
        }

        for (option, class) in [
            ("boxFloatingClass", &self.box_floating_class),
            ("itemActiveClass", &self.item_active_class),
        ] {
            if class.is_empty() || class.contains(char::is_whitespace) {
                return Err(TocError::InvalidOption {
                    option,
                    reason: format!("`{class}` is not a single class name"),
                });
            }
        }

        for (option, value) in [
            ("scrollTopMinValue", Some(self.scroll_top_min_value)),
            ("bottomScrollMargin", Some(self.bottom_scroll_margin)),
            ("headerTopMargin", Some(self.header_top_margin)),
            ("scrollAnimationTime", Some(self.scroll_animation_time)),
            ("disableFloatingOnWidthLessThan", self.disable_floating_on_width_less_than),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(TocError::InvalidOption {
                    option,
                    reason: "must be a finite number".to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    /// Apply overrides key by key; any field present in `overrides` wins.
    pub fn merged(mut self, overrides: &Overrides) -> Self {
        fn set<T: Clone>(field: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }

        set(
            &mut self.items_container_selector,
            overrides.items_container_selector.as_ref(),
        );
        set(&mut self.item_selector, overrides.item_selector.as_ref());
        set(
            &mut self.item_header_selector,
            overrides.item_header_selector.as_ref(),
        );
        set(&mut self.box_selector, overrides.box_selector.as_ref());
        set(
            &mut self.box_floating_class,
            overrides.box_floating_class.as_ref(),
        );
        set(
            &mut self.box_items_container_selector,
            overrides.box_items_container_selector.as_ref(),
        );
        set(
            &mut self.item_active_class,
            overrides.item_active_class.as_ref(),
        );
        set(
            &mut self.scroll_top_min_value,
            overrides.scroll_top_min_value.as_ref(),
        );
        set(
            &mut self.bottom_scroll_margin,
            overrides.bottom_scroll_margin.as_ref(),
        );
        set(
            &mut self.header_top_margin,
            overrides.header_top_margin.as_ref(),
        );
        set(
            &mut self.scroll_animation_time,
            overrides.scroll_animation_time.as_ref(),
        );
        if let Some(cutoff) = overrides.disable_floating_on_width_less_than {
            self.disable_floating_on_width_less_than = cutoff.0;
        }
        set(
            &mut self.jump_before_animating,
            overrides.jump_before_animating.as_ref(),
        );
        self
    }

    /// Selector for every section header, in document order.
    pub(crate) fn header_selector(&self) -> String {
        format!("{} {}", self.item_selector, self.item_header_selector)
    }

    /// Selector for the rendered list entries inside the box.
    pub(crate) fn link_selector(&self) -> String {
        format!("{} li", self.box_items_container_selector)
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
/// Partial configuration supplied by the page. Absent keys keep the configured value.
pub struct Overrides {
    /// See [`Config::items_container_selector`].
    pub items_container_selector: Option<String>,
    /// See [`Config::item_selector`].
    pub item_selector: Option<String>,
    /// See [`Config::item_header_selector`].
    pub item_header_selector: Option<String>,
    /// See [`Config::box_selector`].
    pub box_selector: Option<String>,
    /// See [`Config::box_floating_class`].
    pub box_floating_class: Option<String>,
    /// See [`Config::box_items_container_selector`].
    pub box_items_container_selector: Option<String>,
    /// See [`Config::item_active_class`].
    pub item_active_class: Option<String>,
    /// See [`Config::scroll_top_min_value`].
    pub scroll_top_min_value: Option<f64>,
    /// See [`Config::bottom_scroll_margin`].
    pub bottom_scroll_margin: Option<f64>,
    /// See [`Config::header_top_margin`].
    pub header_top_margin: Option<f64>,
    /// See [`Config::scroll_animation_time`].
    pub scroll_animation_time: Option<f64>,
    /// See [`Config::disable_floating_on_width_less_than`].
    pub disable_floating_on_width_less_than: Option<WidthCutoff>,
    /// See [`Config::jump_before_animating`].
    pub jump_before_animating: Option<bool>,
}

impl Overrides {
    /// Parse overrides from a JSON object such as `JSON.stringify(options)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an option has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    /// The overrides the documentation page mounts its sidebar with.
    pub fn page_defaults() -> Self {
        Self {
            scroll_top_min_value: Some(-40.0),
            bottom_scroll_margin: Some(40.0),
            disable_floating_on_width_less_than: Some(WidthCutoff(Some(991.0))),
            ..Self::default()
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "CutoffValue")]
/// Floating width threshold as written by the page: `false` or a width in pixels.
pub struct WidthCutoff(pub Option<f64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum CutoffValue {
    Flag(bool),
    Width(f64),
}

impl TryFrom<CutoffValue> for WidthCutoff {
    type Error = String;

    fn try_from(value: CutoffValue) -> std::result::Result<Self, Self::Error> {
        match value {
            CutoffValue::Flag(false) => Ok(Self(None)),
            CutoffValue::Flag(true) => {
                Err("expected `false` or a width in pixels, found `true`".to_string())
            }
            CutoffValue::Width(width) => Ok(Self(Some(width))),
        }
    }
}

#[derive(Clone)]
/// A config together with the function rendering each link.
pub struct Options {
    /// Selectors, classes and thresholds.
    pub config: Config,
    /// Maps a header's text to the markup of one list entry.
    pub item_template: ItemTemplate,
}

impl Options {
    #[must_use]
    /// Options using the default link markup.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            item_template: markup::default_template(),
        }
    }

    #[must_use]
    /// Replace the link markup function.
    pub fn with_item_template(mut self, template: impl Fn(&str) -> String + 'static) -> Self {
        self.item_template = Rc::new(template);
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl From<Config> for Options {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
