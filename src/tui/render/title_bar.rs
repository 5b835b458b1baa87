use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::config::ListSettings;
use crate::render::list::PopulationState;
use crate::tui::app::App;
use crate::tui::theme::{Theme, completed_label, direction_arrow};

/// Spans for the title bar: tab, catalog, route, sort and filter state
pub fn title_spans(
    settings: &ListSettings,
    catalog: &str,
    route: Option<&str>,
    state: PopulationState,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let text = Style::default().fg(theme.text).bg(bg);
    let sep = Span::styled(" \u{2502} ", dim);

    let mut spans = vec![
        Span::styled(
            " trail ",
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(settings.tab.to_string(), text),
        sep.clone(),
        Span::styled(catalog.to_string(), text),
        sep.clone(),
        Span::styled(
            format!("route: {}", route.unwrap_or("none")),
            Style::default().fg(theme.cyan).bg(bg),
        ),
        sep.clone(),
        Span::styled(
            format!(
                "sort: {:?} {}",
                settings.sort,
                direction_arrow(settings.direction)
            )
            .to_lowercase(),
            text,
        ),
        sep,
        Span::styled(format!("show: {}", completed_label(settings.completed)), text),
    ];
    if let PopulationState::Populating { cursor, .. } = state {
        spans.push(Span::styled(format!("  loading {}\u{2026}", cursor), dim));
    }
    spans
}

pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let spans = title_spans(
        &app.settings,
        &app.session.catalog.type_key,
        app.renderer.active_route().map(|r| r.name.as_str()),
        app.renderer.state(),
        &app.theme,
    );
    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}
