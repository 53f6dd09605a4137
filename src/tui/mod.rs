//! Terminal User Interface module
//!
//! ratatui rendering of the three vibe components: the reveal button, the
//! fortune view with its question input, and the clarity view with the
//! countdown to the next fortune.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;

/// Spinner frames shown while a request is in flight
pub const SPINNER_FRAMES: &[&str] = &["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"]; // ◐ ◓ ◑ ◒

/// Spinner frame for a tick count
pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u64) as usize]
}
