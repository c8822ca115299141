use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::feed::cursor::{Advance, FeedCursor};

// ============================================================================
// Timing Policies
// ============================================================================

/// Rate cap with leading-edge fire: the first signal in a window passes,
/// the rest of the window drops. Signals are never queued.
///
/// Built on [`tokio::time::Instant`] so a paused test clock drives it.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    fired: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            fired: Mutex::new(None),
        }
    }

    /// True if this signal falls outside the current window (and opens a
    /// new one).
    pub fn allow(&self) -> bool {
        let mut fired = self.fired.lock().expect("throttle lock poisoned");
        let now = Instant::now();
        match *fired {
            Some(at) if now.duration_since(at) < self.window => false,
            _ => {
                *fired = Some(now);
                true
            }
        }
    }
}

/// Delay-until-quiet: every `poke` re-arms the deadline; the wrapped work
/// runs only once the signal stream has been quiet for the whole window.
///
/// Polled from the UI tick rather than owning a timer, matching the event
/// loop's tick-driven style.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    armed: Mutex<Option<Instant>>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: Mutex::new(None),
        }
    }

    /// A signal arrived; restart the quiet window.
    pub fn poke(&self) {
        *self.armed.lock().expect("debounce lock poisoned") = Some(Instant::now());
    }

    /// True exactly once per armed cycle, after the window has been quiet.
    pub fn fire_ready(&self) -> bool {
        let mut armed = self.armed.lock().expect("debounce lock poisoned");
        match *armed {
            Some(at) if at.elapsed() >= self.window => {
                *armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&self) {
        *self.armed.lock().expect("debounce lock poisoned") = None;
    }

    pub fn pending(&self) -> bool {
        self.armed.lock().expect("debounce lock poisoned").is_some()
    }
}

// ============================================================================
// Load Trigger
// ============================================================================

/// Funnel for everything that can ask the feed for more content.
///
/// Three sources route through one throttled entry point: the explicit
/// load-more control, scroll proximity to the bottom of the list, and the
/// sentinel row becoming visible. The advance gate caps how often any of
/// them reach [`FeedCursor::advance`]; scroll and sentinel signals pass a
/// shorter per-source gate first, so the effective rate is bounded by the
/// coarser window.
pub struct LoadTrigger {
    cursor: Arc<FeedCursor>,
    advance_gate: Throttle,
    scroll_gate: Throttle,
    sentinel_gate: Throttle,
}

impl LoadTrigger {
    pub fn new(cursor: Arc<FeedCursor>, advance_window: Duration, signal_window: Duration) -> Self {
        Self {
            cursor,
            advance_gate: Throttle::new(advance_window),
            scroll_gate: Throttle::new(signal_window),
            sentinel_gate: Throttle::new(signal_window),
        }
    }

    /// Explicit control activation.
    pub async fn manual(&self) -> Option<Advance> {
        if !self.advance_gate.allow() {
            tracing::trace!("Load trigger throttled");
            return None;
        }
        Some(self.cursor.advance().await)
    }

    /// Selection scrolled near the bottom of the rendered list.
    pub async fn scroll_proximity(&self) -> Option<Advance> {
        if !self.scroll_gate.allow() {
            return None;
        }
        self.manual().await
    }

    /// The sentinel (last rendered row) became visible.
    pub async fn sentinel_visible(&self) -> Option<Advance> {
        if !self.sentinel_gate.allow() {
            return None;
        }
        self.manual().await
    }
}

// ============================================================================
// Tests
// ============================================================================
