use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::tui::theme::Theme;

const NAVIGATE_HINT: &str = "space toggle  s sort  d dir  f show  r route  b/B bank  x remove  / filter  q quit";
const FILTER_HINT: &str = "Enter apply  Esc cancel";

fn with_hint<'a>(mut spans: Vec<Span<'a>>, hint: &'a str, width: usize, theme: &Theme) -> Line<'a> {
    let bg = theme.background;
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(theme.dim).bg(bg)));
    }
    Line::from(spans)
}

/// The status line for a mode, pending message and filter text
pub fn status_line<'a>(
    mode: Mode,
    filter_input: &'a str,
    text_filter: &'a str,
    message: Option<&'a str>,
    theme: &Theme,
    width: usize,
) -> Line<'a> {
    let bg = theme.background;
    match mode {
        Mode::Filter => {
            // Filter prompt: /text▌
            let spans = vec![
                Span::styled(
                    format!("/{}", filter_input),
                    Style::default().fg(theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(theme.highlight).bg(bg)),
            ];
            with_hint(spans, FILTER_HINT, width, theme)
        }
        Mode::Navigate => {
            let mut spans = Vec::new();
            if let Some(msg) = message {
                spans.push(Span::styled(msg, Style::default().fg(theme.yellow).bg(bg)));
            } else if !text_filter.is_empty() {
                spans.push(Span::styled(
                    format!("/{}", text_filter),
                    Style::default().fg(theme.dim).bg(bg),
                ));
            }
            with_hint(spans, NAVIGATE_HINT, width, theme)
        }
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let line = status_line(
        app.mode,
        &app.filter_input,
        &app.text_filter,
        app.message.as_deref(),
        &app.theme,
        area.width as usize,
    );
    let paragraph = Paragraph::new(line).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}
