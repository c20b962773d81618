//! Linear scroll animation driven by a fixed-period host timer.
//!
//! The animation owns no timer. The host calls [`ScrollAnimation::advance`] every
//! [`TICK_MS`] milliseconds and writes the returned offset to the page; the value tells the host
//! when to stop. Dropping the animation is the cancellation.

/// Timer period the host is expected to drive the animation with.
pub const TICK_MS: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
/// One in-flight navigation from a starting scroll offset to a destination.
pub struct ScrollAnimation {
    start: f64,
    destination: f64,
    duration_ms: f64,
    elapsed_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Result of advancing an animation by one tick.
pub struct Frame {
    /// Scroll offset to apply.
    pub scroll_top: f64,
    /// Whether this was the last frame.
    pub finished: bool,
}

impl ScrollAnimation {
    #[must_use]
    /// Animate from `start` to `destination` over `duration_ms`.
    pub fn new(start: f64, destination: f64, duration_ms: f64) -> Self {
        Self {
            start,
            destination,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `step_ms` and return the offset to apply.
    ///
    /// Progress is clamped to 1, so the finishing frame always lands exactly on the destination
    /// even when the duration is not a multiple of the step. A zero, negative or non-finite
    /// duration finishes on the first call.
    pub fn advance(&mut self, step_ms: f64) -> Frame {
        self.elapsed_ms += step_ms;
        let finished = !self.duration_ms.is_finite() || self.elapsed_ms >= self.duration_ms;
        let progress = if finished {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        };
        Frame {
            scroll_top: self.start + (self.destination - self.start) * progress,
            finished,
        }
    }

    #[must_use]
    /// Scroll offset the animation started from.
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    /// Scroll offset the animation ends on.
    pub fn destination(&self) -> f64 {
        self.destination
    }

    #[must_use]
    /// Milliseconds advanced so far.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}
