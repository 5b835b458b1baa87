use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::render::list::{ListRenderer, PopulationState};
use crate::render::rows::RowView;
use crate::tui::app::ListViewState;
use crate::tui::theme::Theme;
use crate::util::unicode::{display_width, truncate_to_width};

fn check_symbol(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// Keep the cursor inside the visible window.
fn adjust_scroll(view: &mut ListViewState, len: usize, height: usize) {
    view.cursor = view.cursor.min(len.saturating_sub(1));
    if view.cursor < view.scroll_offset {
        view.scroll_offset = view.cursor;
    } else if height > 0 && view.cursor >= view.scroll_offset + height {
        view.scroll_offset = view.cursor + 1 - height;
    }
}

/// Render the task list content area
pub fn render_list_view(
    frame: &mut Frame,
    area: Rect,
    renderer: &ListRenderer,
    view: &mut ListViewState,
    theme: &Theme,
) {
    let bg = theme.background;
    let rows = renderer.visible_rows();

    if rows.is_empty() {
        let msg = if matches!(renderer.state(), PopulationState::Ready { .. }) {
            renderer.empty_message()
        } else {
            "Loading tasks\u{2026}"
        };
        let empty = Paragraph::new(format!(" {}", msg)).style(Style::default().fg(theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let height = area.height as usize;
    adjust_scroll(view, rows.len(), height);
    let width = area.width as usize;
    let indent = renderer.active_route().is_some();
    let end = rows.len().min(view.scroll_offset + height);

    let lines: Vec<Line> = rows[view.scroll_offset..end]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = view.scroll_offset + i == view.cursor;
            row_line(renderer, *row, theme, width, indent, selected)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn row_line(
    renderer: &ListRenderer,
    row: RowView<'_>,
    theme: &Theme,
    width: usize,
    indent: bool,
    selected: bool,
) -> Line<'static> {
    let bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().bg(bg);
    let lead = if indent { "   " } else { " " };
    let mut spans: Vec<Span<'static>> = Vec::new();

    match row {
        RowView::Header(h) => {
            let marker = if h.collapsed { "\u{25B8}" } else { "\u{25BE}" };
            let progress = format!(" {} ", h.progress());
            let label_width = width.saturating_sub(display_width(&progress) + 3);
            spans.push(Span::styled(format!(" {} ", marker), base.fg(theme.highlight)));
            spans.push(Span::styled(
                truncate_to_width(&h.label(), label_width),
                base.fg(theme.text_bright).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                progress,
                base.fg(theme.progress_color(h.completed, h.total)),
            ));
        }
        RowView::Task(r) => {
            let Some(task) = renderer.catalog().tasks.get(r.catalog_index) else {
                return Line::from(Span::styled(String::new(), base));
            };
            let done = task.is_completed();
            spans.push(Span::styled(lead.to_string(), base));
            spans.push(Span::styled(
                format!("{} ", check_symbol(done)),
                base.fg(theme.done_color(done)),
            ));
            let tier = task
                .def
                .tier
                .as_ref()
                .map(|t| format!("  {}", t))
                .unwrap_or_default();
            let name_width =
                width.saturating_sub(display_width(lead) + 4 + display_width(&tier));
            let name_style = if task.is_tracked() {
                base.fg(theme.cyan)
            } else if done {
                base.fg(theme.dim)
            } else {
                base.fg(theme.text)
            };
            spans.push(Span::styled(truncate_to_width(task.name(), name_width), name_style));
            spans.push(Span::styled(tier, base.fg(theme.dim)));
        }
        RowView::Placeholder(p) => {
            spans.push(Span::styled(lead.to_string(), base));
            spans.push(Span::styled(
                format!("{} ", check_symbol(p.completed)),
                base.fg(theme.done_color(p.completed)),
            ));
            let name_width = width.saturating_sub(display_width(lead) + 4);
            spans.push(Span::styled(
                truncate_to_width(&p.placeholder.display_name(), name_width),
                base.fg(theme.yellow).add_modifier(Modifier::ITALIC),
            ));
        }
    }

    // Pad the selection background to the full width
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv::MemoryStore;
    use crate::io::route_store::RouteStore;
    use crate::model::catalog::{Catalog, Task, TaskDefinition};
    use crate::model::config::{ListSettings, ListTab};
    use crate::model::route::{Item, Placeholder, PlaceholderKind, Route, Section};
    use crate::ops::filter::StandingFilter;
    use crate::tui::render::test_helpers::*;

    fn catalog() -> Catalog {
        let tasks = ["Chop a tree", "Light a fire", "Cook a shrimp"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Task::new(TaskDefinition {
                    id: i as i32 + 1,
                    name: name.to_string(),
                    tier: Some("easy".into()),
                    ..Default::default()
                })
            })
            .collect();
        Catalog::new("LEAGUE_5", tasks)
    }

    fn rendered(store: &mut RouteStore<MemoryStore>) -> ListRenderer {
        let settings = ListSettings::default();
        let filter = StandingFilter::from_settings(&settings);
        let mut renderer = ListRenderer::new(settings, Box::new(filter));
        renderer.populate(catalog()).unwrap();
        renderer.run_until_idle(store).unwrap();
        renderer
    }

    #[test]
    fn renders_plain_list() {
        let mut store = RouteStore::new(MemoryStore::new("p"));
        let renderer = rendered(&mut store);
        let mut view = ListViewState::default();
        let theme = Theme::default();
        let out = render_to_string(TERM_W, 5, |frame, area| {
            render_list_view(frame, area, &renderer, &mut view, &theme);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" [ ] Chop a tree"));
        assert!(lines[0].ends_with("easy"));
        assert!(lines[2].contains("Cook a shrimp"));
    }

    #[test]
    fn renders_route_sections_and_placeholders() {
        let mut store = RouteStore::new(MemoryStore::new("p"));
        let bank = Placeholder {
            id: "b1".into(),
            kind: PlaceholderKind::Bank,
        };
        let mut section = Section::new("Lumbridge", vec![Item::Task(1), Item::Placeholder(bank)]);
        section.description = Some("start".into());
        store.add_route_to_tab(ListTab::Tab1, "LEAGUE_5", Route::new("r", "LEAGUE_5", vec![section]));
        store.save_active_route_name(ListTab::Tab1, "LEAGUE_5", Some("r"));
        let renderer = rendered(&mut store);

        let mut view = ListViewState::default();
        let theme = Theme::default();
        let out = render_to_string(40, 5, |frame, area| {
            render_list_view(frame, area, &renderer, &mut view, &theme);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("Lumbridge - start"));
        assert!(lines[0].ends_with("0/2"));
        assert!(lines[1].starts_with("   [ ] Chop a tree"));
        assert_eq!(lines[2], "   [ ] Bank");
    }

    #[test]
    fn empty_list_shows_message() {
        let mut store = RouteStore::new(MemoryStore::new("p"));
        let settings = ListSettings::default();
        let mut renderer = ListRenderer::new(settings, Box::new(|_: &Task| false));
        renderer.populate(catalog()).unwrap();

        let mut view = ListViewState::default();
        let theme = Theme::default();
        let loading = render_to_string(TERM_W, 3, |frame, area| {
            render_list_view(frame, area, &renderer, &mut view, &theme);
        });
        assert_eq!(loading, " Loading tasks\u{2026}");

        renderer.run_until_idle(&mut store).unwrap();
        let out = render_to_string(TERM_W, 3, |frame, area| {
            render_list_view(frame, area, &renderer, &mut view, &theme);
        });
        assert_eq!(out, " No tasks match the current filters.");
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut view = ListViewState {
            cursor: 9,
            scroll_offset: 0,
        };
        adjust_scroll(&mut view, 20, 5);
        assert_eq!(view.scroll_offset, 5);
        view.cursor = 2;
        adjust_scroll(&mut view, 20, 5);
        assert_eq!(view.scroll_offset, 2);
        view.cursor = 50;
        adjust_scroll(&mut view, 20, 5);
        assert_eq!(view.cursor, 19);
    }
}
