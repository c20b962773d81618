use super::{ScrollUpdate, TableOfContents};
use crate::config::{Config, Options, Overrides};
use crate::error::TocError;
use crate::layout::{Layout, SectionLayout};
use crate::page::memory::{MemoryPage, NodeId};
use crate::page::Page;
use pretty_assertions::assert_eq;

fn section(title: &str, offset: f64) -> SectionLayout {
    SectionLayout {
        title: title.to_string(),
        offset,
        height: 600.0,
    }
}

/// Root at y=300, 2000px tall, with a 300px box and sections every 600px.
fn docs_layout(titles: &[&str]) -> Layout {
    Layout {
        viewport_width: 1280.0,
        viewport_height: 800.0,
        root_selector: ".row.toc".to_string(),
        root_top: 300.0,
        root_height: 2000.0,
        box_offset: 0.0,
        box_height: 300.0,
        items_offset: 0.0,
        footer_height: 800.0,
        sections: titles
            .iter()
            .enumerate()
            .map(|(i, title)| section(title, 600.0 * i as f64))
            .collect(),
    }
}

fn mount(layout: &Layout, config: &Config) -> (MemoryPage, NodeId) {
    layout.mount(config)
}

fn scroll_to(toc: &mut TableOfContents<&MemoryPage>, top: f64) -> ScrollUpdate {
    toc.page().set_scroll_top(top);
    toc.on_scroll().unwrap()
}

fn active_links(page: &MemoryPage, toc: &TableOfContents<&MemoryPage>) -> Vec<usize> {
    toc.links()
        .iter()
        .enumerate()
        .filter(|(_, link)| page.has_class(link, "active"))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_links_follow_header_order() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let titles: Vec<String> = toc.links().iter().map(|link| page.text(link)).collect();
    assert_eq!(titles, vec!["Intro", "Setup", "Usage"]);
    assert_eq!(toc.headers().len(), toc.links().len());

    let anchor = page.query(&toc.links()[0], "a").unwrap();
    assert_eq!(page.attribute(anchor, "href").as_deref(), Some("#"));
}

#[test]
fn test_custom_item_template() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let options = Options::new(config).with_item_template(|title| format!("<b>{title}!</b>"));
    let toc = TableOfContents::new(&page, root, options).unwrap();

    assert_eq!(page.text(&toc.links()[1]), "Setup!");
    assert!(page.query(&toc.links()[1], "b").is_some());
}

#[test]
fn test_template_emitting_list_entries_is_rejected() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let options =
        Options::new(config).with_item_template(|title| format!("{title}</li><li>extra"));

    match TableOfContents::new(&page, root, options) {
        Err(TocError::LinkCountMismatch { headers, links }) => {
            assert_eq!((headers, links), (2, 4));
        }
        other => panic!("expected a count mismatch, got {:?}", other.err()),
    }
    assert!(page.query_all(&root, ".toc-items-list li").is_empty());
    assert!(page.query(&root, ".toc-items-list ul").is_none());
}

#[test]
fn test_child_combinator_header_selector() {
    let config = Config {
        item_header_selector: "> .header".to_string(),
        ..Config::default()
    };
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let titles: Vec<String> = toc.links().iter().map(|link| page.text(link)).collect();
    assert_eq!(titles, vec!["Intro", "Setup"]);
}

#[test]
fn test_invalid_config_fails_construction() {
    let (page, root) = mount(&docs_layout(&["Intro"]), &Config::default());

    let config = Config {
        item_header_selector: ".header >".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        TableOfContents::new(&page, root, Options::new(config)),
        Err(TocError::InvalidOption {
            option: "itemHeaderSelector",
            ..
        })
    ));

    let config = Config {
        scroll_animation_time: f64::INFINITY,
        ..Config::default()
    };
    assert!(matches!(
        TableOfContents::new(&page, root, Options::new(config)),
        Err(TocError::InvalidOption {
            option: "scrollAnimationTime",
            ..
        })
    ));
    assert!(page.query_all(&root, ".toc-items-list li").is_empty());
}

#[test]
fn test_missing_box_fails_construction() {
    let (page, root) = mount(&docs_layout(&["Intro"]), &Config::default());
    let config = Config {
        box_selector: ".sidebar".to_string(),
        ..Config::default()
    };

    match TableOfContents::new(&page, root, Options::new(config)) {
        Err(TocError::MissingElement { role, selector }) => {
            assert_eq!(role, "box");
            assert_eq!(selector, ".sidebar");
        }
        other => panic!("expected a missing box, got {:?}", other.err()),
    }
}

#[test]
fn test_missing_items_list_fails_construction() {
    let (page, root) = mount(&docs_layout(&["Intro"]), &Config::default());
    let config = Config {
        box_items_container_selector: ".links".to_string(),
        ..Config::default()
    };

    assert!(matches!(
        TableOfContents::new(&page, root, Options::new(config)),
        Err(TocError::MissingElement {
            role: "box items list",
            ..
        })
    ));
}

#[test]
fn test_active_link_before_scrolling_is_first() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let update = scroll_to(&mut toc, 0.0);
    assert_eq!(
        update,
        ScrollUpdate {
            scroll_top: 0.0,
            current_scroll: -300.0,
            floating: false,
            box_top: None,
            active: Some(0),
        }
    );
    assert_eq!(active_links(&page, &toc), vec![0]);
}

#[test]
fn test_several_qualifying_headers_resolve_to_the_last() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let update = scroll_to(&mut toc, 1000.0);
    assert_eq!(update.active, Some(1));

    // Box top lands on the viewport top; every header is at or above it.
    let update = scroll_to(&mut toc, 1500.0);
    assert_eq!(update.box_top, Some(1200.0));
    assert_eq!(update.active, Some(2));
    assert_eq!(active_links(&page, &toc), vec![2]);
}

#[test]
fn test_floating_class_and_cap() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();
    let boxed = *toc.box_element();

    let update = scroll_to(&mut toc, 2300.0);
    assert!(update.floating);
    assert!(page.has_class(&boxed, "floating"));
    // 2000 root - 300 box - 0 margin
    assert_eq!(update.box_top, Some(1700.0));
    assert_eq!(page.style_top(boxed), Some(1700.0));

    let update = scroll_to(&mut toc, 100.0);
    assert!(!update.floating);
    assert!(!page.has_class(&boxed, "floating"));
    assert_eq!(page.style_top(boxed), Some(1700.0), "position is left alone");
}

#[test]
fn test_scroll_threshold_boundary() {
    let config = Config::default().merged(&Overrides::page_defaults());
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    // current scroll = 260 - 300 = -40, exactly the threshold
    let update = scroll_to(&mut toc, 260.0);
    assert!(update.floating);
    // capped at 2000 - 300 - 40
    assert_eq!(scroll_to(&mut toc, 2300.0).box_top, Some(1660.0));

    assert!(!scroll_to(&mut toc, 259.0).floating);
}

#[test]
fn test_viewport_at_cutoff_never_floats() {
    let config = Config::default().merged(&Overrides::page_defaults());
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    page.set_viewport(991.0, 800.0);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();
    let boxed = *toc.box_element();

    for top in [0.0, 500.0, 1500.0, 2300.0] {
        let update = scroll_to(&mut toc, top);
        assert!(!update.floating);
        assert!(!page.has_class(&boxed, "floating"));
    }

    page.set_viewport(992.0, 800.0);
    assert!(scroll_to(&mut toc, 1500.0).floating);
}

#[test]
fn test_active_index_never_decreases_while_scrolling_down() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let mut previous = 0;
    let mut top = 0.0;
    while top <= page.max_scroll() {
        let active = scroll_to(&mut toc, top).active.unwrap();
        assert!(active >= previous, "active went from {previous} to {active} at {top}");
        previous = active;
        top += 25.0;
    }
    assert_eq!(previous, 2);
}

#[test]
fn test_no_headers_is_supported() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&[]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    assert!(toc.links().is_empty());
    let list = page.query(&root, ".toc-items-list ul").unwrap();
    assert!(page.children(list).is_empty());

    let update = scroll_to(&mut toc, 400.0);
    assert_eq!(update.active, None);
    assert!(matches!(
        toc.navigate(0),
        Err(TocError::SectionOutOfRange { index: 0, count: 0 })
    ));
}

#[test]
fn test_navigation_animates_to_header() {
    let config = Config {
        jump_before_animating: false,
        ..Config::default()
    };
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    // items top 300 + header offset 1200 - header margin 15
    let destination = toc.navigate(2).unwrap();
    assert_eq!(destination, 1485.0);
    assert_eq!(page.scroll_top(), 0.0);

    assert!(toc.tick(10.0));
    assert!((page.scroll_top() - 29.7).abs() < 1e-9);

    let ticks = toc.settle();
    assert_eq!(ticks, 49);
    assert!(!toc.is_animating());
    assert!((page.scroll_top() - destination).abs() < 1e-9);
}

#[test]
fn test_jump_before_animating_lands_immediately() {
    let config = Config::default();
    assert!(config.jump_before_animating);
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let destination = toc.navigate(1).unwrap();
    assert_eq!(destination, 885.0);
    assert_eq!(page.scroll_top(), destination);
    assert_eq!(toc.animation().map(|a| a.start()), Some(destination));

    // Every frame interpolates from the destination to itself.
    while toc.tick(10.0) {
        assert_eq!(page.scroll_top(), destination);
    }
    assert_eq!(page.scroll_top(), destination);
}

#[test]
fn test_new_navigation_supersedes_running_one() {
    let config = Config {
        jump_before_animating: false,
        ..Config::default()
    };
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    toc.navigate(2).unwrap();
    for _ in 0..10 {
        toc.tick(10.0);
    }
    let midway = page.scroll_top();
    assert!(midway > 0.0 && midway < 1485.0);

    let destination = toc.navigate(0).unwrap();
    let animation = *toc.animation().unwrap();
    assert_eq!(animation.start(), midway);
    assert_eq!(animation.destination(), destination);
    assert_eq!(animation.elapsed_ms(), 0.0);

    toc.settle();
    assert!((page.scroll_top() - 285.0).abs() < 1e-9);
}

#[test]
fn test_cancel_leaves_scroll_in_place() {
    let config = Config {
        jump_before_animating: false,
        ..Config::default()
    };
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    toc.navigate(1).unwrap();
    toc.tick(10.0);
    let position = page.scroll_top();

    assert!(toc.cancel_animation());
    assert!(!toc.cancel_animation());
    assert!(!toc.tick(10.0));
    assert_eq!(page.scroll_top(), position);
}

#[test]
fn test_link_click_navigates_to_its_section() {
    let config = Config {
        jump_before_animating: false,
        ..Config::default()
    };
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let link = toc.links()[1];
    assert_eq!(toc.link_index_of(&link), Some(1));
    assert_eq!(toc.on_link_click(&link).map(Result::ok), Some(Some(885.0)));
    assert_eq!(toc.animation().map(|a| a.destination()), Some(885.0));

    assert!(toc.on_link_click(&root).is_none());
    assert_eq!(toc.animation().map(|a| a.destination()), Some(885.0));

    toc.settle();
    assert!((page.scroll_top() - 885.0).abs() < 1e-9);
}

#[test]
fn test_navigation_out_of_range_is_rejected() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup", "Usage"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    assert!(matches!(
        toc.navigate(3),
        Err(TocError::SectionOutOfRange { index: 3, count: 3 })
    ));
    assert!(!toc.is_animating());
    assert_eq!(page.scroll_top(), 0.0);
}

#[test]
fn test_click_on_link_whose_section_is_gone_is_still_claimed() {
    let config = Config::default();
    let (page, root) = mount(&docs_layout(&["Intro", "Setup"]), &config);
    let mut toc = TableOfContents::new(&page, root, Options::new(config)).unwrap();

    let items = page.query(&root, ".toc-items").unwrap();
    page.set_text(items, "");

    let link = toc.links()[1];
    assert!(matches!(
        toc.on_link_click(&link),
        Some(Err(TocError::SectionOutOfRange { index: 1, count: 0 }))
    ));
    assert!(!toc.is_animating());
}
