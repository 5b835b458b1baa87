use ratatui::style::Color;

use crate::model::config::{CompletedFilter, SortDirection};

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub green: Color,
    pub yellow: Color,
    pub cyan: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
        }
    }
}

impl Theme {
    /// Color for a row's completion state
    pub fn done_color(&self, done: bool) -> Color {
        if done { self.green } else { self.text }
    }

    /// Color for a section header's progress counter
    pub fn progress_color(&self, completed: usize, total: usize) -> Color {
        if total > 0 && completed == total {
            self.green
        } else if completed > 0 {
            self.yellow
        } else {
            self.dim
        }
    }
}

pub fn direction_arrow(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "\u{2191}",
        SortDirection::Descending => "\u{2193}",
    }
}

pub fn completed_label(filter: CompletedFilter) -> &'static str {
    match filter {
        CompletedFilter::All => "all",
        CompletedFilter::Complete => "complete",
        CompletedFilter::Incomplete => "incomplete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_color_by_completion() {
        let theme = Theme::default();
        assert_eq!(theme.progress_color(0, 3), theme.dim);
        assert_eq!(theme.progress_color(1, 3), theme.yellow);
        assert_eq!(theme.progress_color(3, 3), theme.green);
    }

    #[test]
    fn done_color() {
        let theme = Theme::default();
        assert_eq!(theme.done_color(true), theme.green);
        assert_eq!(theme.done_color(false), theme.text);
    }
}
