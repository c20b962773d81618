//! Browser binding: [`Page`] over `web-sys` and the `TocWidget` export.
//!
//! The widget owns every listener it registers. Scroll events go to the document, clicks are
//! delegated from the box's items list and resolved to a section through the controller's link
//! index, and navigation is driven by a single 10 ms interval that is cleared when the
//! animation finishes, when a new navigation replaces it, or on `destroy()`. Handler errors are
//! logged and swallowed so a broken sidebar cannot take the rest of the page down with it.

use crate::animation::TICK_MS;
use crate::config::{Config, Options, Overrides};
use crate::error::{Result, TocError};
use crate::page::Page;
use crate::toc::TableOfContents;
use js_sys::{Function, Reflect, JSON};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Window};

/// Root selector used by [`bootstrap`].
pub const PAGE_ROOT_SELECTOR: &str = ".row.toc";

#[allow(clippy::cast_possible_truncation)]
const TIMER_PERIOD_MS: i32 = TICK_MS as i32;

fn dom_error(value: &JsValue) -> TocError {
    TocError::Dom(format!("{value:?}"))
}

fn to_js(error: &TocError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[derive(Clone, Debug)]
/// The live document of the current window.
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// Bind to the global window and its document.
    ///
    /// # Errors
    ///
    /// Fails outside a browsing context.
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| TocError::Dom("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| TocError::Dom("window has no document".to_string()))?;
        Ok(Self { window, document })
    }

    fn html(&self) -> Option<Element> {
        self.document.document_element()
    }
}

impl Page for WebPage {
    type Element = Element;

    fn query(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, scope: &Element, selector: &str) -> Vec<Element> {
        let Ok(list) = scope.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn text(&self, element: &Element) -> String {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => element.text_content().unwrap_or_default(),
        }
    }

    fn set_inner_html(&self, element: &Element, html: &str) -> Result<()> {
        element.set_inner_html(html);
        Ok(())
    }

    fn add_class(&self, element: &Element, class: &str) -> Result<()> {
        element.class_list().add_1(class).map_err(|e| dom_error(&e))
    }

    fn remove_class(&self, element: &Element, class: &str) -> Result<()> {
        element
            .class_list()
            .remove_1(class)
            .map_err(|e| dom_error(&e))
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn set_top(&self, element: &Element, top: f64) -> Result<()> {
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| TocError::Dom("box is not an HTML element".to_string()))?;
        html.style()
            .set_property("top", &format!("{top}px"))
            .map_err(|e| dom_error(&e))
    }

    fn document_top(&self, element: &Element) -> f64 {
        self.viewport_top(element) + self.scroll_top()
    }

    fn viewport_top(&self, element: &Element) -> f64 {
        element.get_bounding_client_rect().top()
    }

    fn height(&self, element: &Element) -> f64 {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => f64::from(html.offset_height()),
            None => element.get_bounding_client_rect().height(),
        }
    }

    fn scroll_top(&self) -> f64 {
        self.html().map_or(0.0, |html| f64::from(html.scroll_top()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_scroll_top(&self, top: f64) {
        if let Some(html) = self.html() {
            html.set_scroll_top(top.round() as i32);
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }
}

type SharedToc = Rc<RefCell<TableOfContents<WebPage>>>;

/// Replaces any running interval with a fresh one driving `tick`.
fn restart_interval(window: &Window, interval: &Cell<Option<i32>>, tick: &Function) {
    if let Some(id) = interval.take() {
        window.clear_interval_with_handle(id);
    }
    match window.set_interval_with_callback_and_timeout_and_arguments_0(tick, TIMER_PERIOD_MS) {
        Ok(id) => interval.set(Some(id)),
        Err(e) => tracing::warn!("could not start scroll animation timer: {e:?}"),
    }
}

/// Read `itemTemplate` and the JSON-representable options from a JS object.
fn options_from_js(options: &JsValue) -> Result<Options> {
    if options.is_undefined() || options.is_null() {
        return Ok(Options::default());
    }
    let json = JSON::stringify(options).map_err(|e| dom_error(&e))?;
    let overrides = Overrides::from_json(&String::from(json))?;
    let mut merged = Options::new(Config::default().merged(&overrides));

    let template = Reflect::get(options, &JsValue::from_str("itemTemplate")).unwrap_or_default();
    if let Ok(template) = template.dyn_into::<Function>() {
        merged = merged.with_item_template(move |title| {
            template
                .call1(&JsValue::NULL, &JsValue::from_str(title))
                .ok()
                .and_then(|markup| markup.as_string())
                .unwrap_or_default()
        });
    }
    Ok(merged)
}

/// A mounted table of contents, exported to JavaScript.
#[wasm_bindgen]
pub struct TocWidget {
    toc: SharedToc,
    window: Window,
    document: Document,
    items_list: Element,
    interval: Rc<Cell<Option<i32>>>,
    tick: Function,
    _tick_listener: Closure<dyn FnMut()>,
    scroll_listener: Closure<dyn FnMut(Event)>,
    click_listener: Closure<dyn FnMut(Event)>,
    destroyed: bool,
}

#[wasm_bindgen]
impl TocWidget {
    /// Mount on `root` with an options object using the script option names.
    ///
    /// # Errors
    ///
    /// Throws if the options are malformed or the markup is missing the box or its list.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element, options: JsValue) -> std::result::Result<TocWidget, JsValue> {
        let options = options_from_js(&options).map_err(|e| to_js(&e))?;
        Self::mount(root, options).map_err(|e| to_js(&e))
    }

    /// Recompute floating state, box position and active link now.
    ///
    /// # Errors
    ///
    /// Throws if the document rejects a class or style change.
    pub fn refresh(&self) -> std::result::Result<(), JsValue> {
        self.toc
            .borrow_mut()
            .on_scroll()
            .map(|_| ())
            .map_err(|e| to_js(&e))
    }

    /// Animate to section `index`.
    ///
    /// # Errors
    ///
    /// Throws if there is no such section.
    #[wasm_bindgen(js_name = scrollToSection)]
    pub fn scroll_to_section(&self, index: usize) -> std::result::Result<(), JsValue> {
        self.toc
            .borrow_mut()
            .navigate(index)
            .map_err(|e| to_js(&e))?;
        restart_interval(&self.window, &self.interval, &self.tick);
        Ok(())
    }

    /// Remove every listener and stop any running animation. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Some(id) = self.interval.take() {
            self.window.clear_interval_with_handle(id);
        }
        if let Ok(mut toc) = self.toc.try_borrow_mut() {
            toc.cancel_animation();
        }
        if let Err(e) = self.document.remove_event_listener_with_callback(
            "scroll",
            self.scroll_listener.as_ref().unchecked_ref(),
        ) {
            tracing::warn!("could not remove scroll listener: {e:?}");
        }
        if let Err(e) = self.items_list.remove_event_listener_with_callback(
            "click",
            self.click_listener.as_ref().unchecked_ref(),
        ) {
            tracing::warn!("could not remove click listener: {e:?}");
        }
        tracing::debug!("table of contents destroyed");
    }
}

impl TocWidget {
    /// Mount with already-resolved options.
    ///
    /// # Errors
    ///
    /// Fails if there is no document, the markup is incomplete, or a listener cannot be added.
    pub fn mount(root: Element, options: Options) -> Result<Self> {
        let page = WebPage::new()?;
        let window = page.window.clone();
        let document = page.document.clone();

        let toc = TableOfContents::new(page, root, options)?;
        let items_list = toc
            .page()
            .query(toc.box_element(), &toc.config().box_items_container_selector)
            .ok_or_else(|| TocError::MissingElement {
                role: "box items list",
                selector: toc.config().box_items_container_selector.clone(),
            })?;
        let toc: SharedToc = Rc::new(RefCell::new(toc));
        let interval = Rc::new(Cell::new(None));

        let tick_listener = {
            let toc = Rc::clone(&toc);
            let interval = Rc::clone(&interval);
            let window = window.clone();
            Closure::<dyn FnMut()>::new(move || {
                let running = match toc.try_borrow_mut() {
                    Ok(mut toc) => toc.tick(TICK_MS),
                    Err(_) => {
                        tracing::warn!("skipping animation tick: controller busy");
                        return;
                    }
                };
                if !running {
                    if let Some(id) = interval.take() {
                        window.clear_interval_with_handle(id);
                    }
                }
            })
        };
        let tick: Function = tick_listener.as_ref().unchecked_ref::<Function>().clone();

        let scroll_listener = {
            let toc = Rc::clone(&toc);
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| match toc.try_borrow_mut() {
                Ok(mut toc) => {
                    if let Err(e) = toc.on_scroll() {
                        tracing::warn!("scroll update failed: {e}");
                    }
                }
                Err(_) => tracing::warn!("skipping scroll update: controller busy"),
            })
        };

        let click_listener = {
            let toc = Rc::clone(&toc);
            let interval = Rc::clone(&interval);
            let window = window.clone();
            let tick = tick.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(link) = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .and_then(|element| element.closest("li").ok().flatten())
                else {
                    return;
                };
                let clicked = match toc.try_borrow_mut() {
                    Ok(mut toc) => toc.on_link_click(&link),
                    Err(_) => {
                        tracing::warn!("ignoring click: controller busy");
                        return;
                    }
                };
                let Some(navigation) = clicked else {
                    return;
                };
                event.prevent_default();
                match navigation {
                    Ok(_) => restart_interval(&window, &interval, &tick),
                    Err(e) => tracing::warn!("navigation failed: {e}"),
                }
            })
        };

        document
            .add_event_listener_with_callback("scroll", scroll_listener.as_ref().unchecked_ref())
            .map_err(|e| dom_error(&e))?;
        if let Err(e) = items_list
            .add_event_listener_with_callback("click", click_listener.as_ref().unchecked_ref())
        {
            let _ = document.remove_event_listener_with_callback(
                "scroll",
                scroll_listener.as_ref().unchecked_ref(),
            );
            return Err(dom_error(&e));
        }

        tracing::debug!("table of contents mounted");
        Ok(Self {
            toc,
            window,
            document,
            items_list,
            interval,
            tick,
            _tick_listener: tick_listener,
            scroll_listener,
            click_listener,
            destroyed: false,
        })
    }
}

impl Drop for TocWidget {
    fn drop(&mut self) {
        self.destroy();
    }
}

thread_local! {
    static PAGE_WIDGET: RefCell<Option<TocWidget>> = const { RefCell::new(None) };
}

fn mount_page_widget() {
    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.query_selector(PAGE_ROOT_SELECTOR).ok().flatten());
    let Some(root) = root else {
        tracing::warn!("no element matches {PAGE_ROOT_SELECTOR}; table of contents not mounted");
        return;
    };
    let options = Options::new(Config::default().merged(&Overrides::page_defaults()));
    match TocWidget::mount(root, options) {
        Ok(widget) => PAGE_WIDGET.with(|slot| {
            if let Some(mut previous) = slot.borrow_mut().replace(widget) {
                previous.destroy();
            }
        }),
        Err(e) => tracing::warn!("table of contents not mounted: {e}"),
    }
}

/// Mount the documentation page's sidebar once the DOM is ready.
///
/// The widget lives for the rest of the page; calling this again replaces it.
///
/// # Errors
///
/// Throws outside a browsing context or if the ready listener cannot be added.
#[wasm_bindgen]
pub fn bootstrap() -> std::result::Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "loading" {
        let ready = Closure::once_into_js(mount_page_widget);
        document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
    } else {
        mount_page_widget();
    }
    Ok(())
}
