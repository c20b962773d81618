//! Pure scroll-tracking rules: when the box floats, where it sits, and which link is active.

/// Whether the box floats at `current_scroll`.
///
/// The scroll threshold is inclusive; the width cutoff is exclusive, so a viewport exactly as
/// wide as the cutoff does not float.
#[must_use]
pub fn should_float(
    current_scroll: f64,
    scroll_top_min_value: f64,
    viewport_width: f64,
    width_cutoff: Option<f64>,
) -> bool {
    current_scroll >= scroll_top_min_value
        && width_cutoff.is_none_or(|cutoff| viewport_width > cutoff)
}

/// Top offset for a floating box, capped so it stays inside the root.
#[must_use]
pub fn capped_box_top(
    current_scroll: f64,
    root_height: f64,
    box_height: f64,
    bottom_scroll_margin: f64,
) -> f64 {
    current_scroll.min(root_height - box_height - bottom_scroll_margin)
}

/// Index of the last header whose top, less `header_top_margin`, is at or above `box_top`.
///
/// Returns `Some(0)` when no header qualifies and `None` when there are no headers at all.
/// All tops must be in the same (viewport) coordinate space.
#[must_use]
pub fn active_index(
    box_top: f64,
    header_tops: impl IntoIterator<Item = f64>,
    header_top_margin: f64,
) -> Option<usize> {
    let mut active = None;
    for (index, top) in header_tops.into_iter().enumerate() {
        if index == 0 {
            active = Some(0);
        }
        if top - header_top_margin <= box_top {
            active = Some(index);
        }
    }
    active
}
