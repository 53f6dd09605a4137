//! TUI theme and styles

use ratatui::style::{Color, Modifier, Style};

/// Application color theme
pub struct Theme;

impl Theme {
    /// Primary accent color
    pub const PRIMARY: Color = Color::Magenta;

    /// Secondary accent color
    pub const SECONDARY: Color = Color::Cyan;

    /// Muted text color
    pub const MUTED: Color = Color::DarkGray;

    /// Header style
    pub fn header() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Status bar style
    pub fn status_bar() -> Style {
        Style::default().bg(Color::DarkGray)
    }

    /// The reveal button
    pub fn button() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Fortune text
    pub fn fortune() -> Style {
        Style::default().fg(Self::SECONDARY).add_modifier(Modifier::BOLD)
    }

    /// Oracle's answer
    pub fn answer() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Question input border
    pub fn input() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Normal text style
    pub fn normal() -> Style {
        Style::default()
    }

    /// Muted text style
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    /// Countdown line
    pub fn countdown() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
