use serde::Serialize;

use crate::model::catalog::{Catalog, Task};
use crate::model::route::{Item, Route};
use crate::ops::route_ops;
use crate::render::list::ListRenderer;
use crate::render::rows::{PlaceholderRow, RowView, SectionHeaderRow};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RouteSummaryJson {
    pub name: String,
    pub task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sections: usize,
    pub tasks: usize,
    pub active: bool,
}

#[derive(Serialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum RowJson {
    Header {
        section: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        completed: usize,
        total: usize,
        collapsed: bool,
    },
    Task {
        id: i32,
        name: String,
        completed: bool,
        tracked: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        tier: Option<String>,
    },
    Placeholder {
        id: String,
        kind: String,
        name: String,
        completed: bool,
    },
}

#[derive(Serialize)]
pub struct ListJson {
    pub tab: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub rows: Vec<RowJson>,
    pub empty: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn route_summary(route: &Route, active: bool) -> RouteSummaryJson {
    RouteSummaryJson {
        name: route.name.clone(),
        task_type: route.task_type.clone(),
        author: route.author.clone(),
        description: route.description.clone(),
        sections: route.sections.len(),
        tasks: route_ops::task_count(route),
        active,
    }
}

pub fn row_to_json(renderer: &ListRenderer, row: RowView<'_>) -> Option<RowJson> {
    match row {
        RowView::Header(h) => Some(RowJson::Header {
            section: h.section.clone(),
            description: h.description.clone(),
            completed: h.completed,
            total: h.total,
            collapsed: h.collapsed,
        }),
        RowView::Task(r) => {
            let task = renderer.catalog().tasks.get(r.catalog_index)?;
            Some(RowJson::Task {
                id: task.id(),
                name: task.def.name.clone(),
                completed: task.is_completed(),
                tracked: task.is_tracked(),
                tier: task.def.tier.clone(),
            })
        }
        RowView::Placeholder(p) => Some(RowJson::Placeholder {
            id: p.placeholder.id.clone(),
            kind: p.placeholder.kind.as_str().to_string(),
            name: p.placeholder.display_name(),
            completed: p.completed,
        }),
    }
}

pub fn list_to_json(renderer: &ListRenderer) -> ListJson {
    ListJson {
        tab: renderer.settings().tab.to_string(),
        catalog: renderer.catalog().type_key.clone(),
        route: renderer.active_route().map(|r| r.name.clone()),
        rows: renderer
            .visible_rows()
            .into_iter()
            .filter_map(|row| row_to_json(renderer, row))
            .collect(),
        empty: renderer.is_empty_message_visible(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(done: bool) -> char {
    if done { 'x' } else { ' ' }
}

pub fn format_task_line(task: &Task) -> String {
    let mut line = format!("[{}] {:>5} {}", check_char(task.is_completed()), task.id(), task.name());
    if let Some(tier) = &task.def.tier {
        line.push_str(&format!(" ({})", tier));
    }
    if task.is_tracked() {
        line.push_str(" *");
    }
    if !task.save.tags.is_empty() {
        let tags: Vec<String> = task.save.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push(' ');
        line.push_str(&tags.join(" "));
    }
    line
}

pub fn format_placeholder_line(row: &PlaceholderRow) -> String {
    format!(
        "[{}] {:>5} {} ({})",
        check_char(row.completed),
        "-",
        row.placeholder.display_name(),
        row.placeholder.id
    )
}

pub fn format_header_line(header: &SectionHeaderRow) -> String {
    let marker = if header.collapsed { '+' } else { '-' };
    format!("{} {} [{}]", marker, header.label(), header.progress())
}

/// One line per visible row, indented under section headers.
pub fn format_rows(renderer: &ListRenderer) -> Vec<String> {
    let indent = if renderer.active_route().is_some() { "  " } else { "" };
    renderer
        .visible_rows()
        .into_iter()
        .filter_map(|row| match row {
            RowView::Header(h) => Some(format_header_line(h)),
            RowView::Task(r) => renderer
                .catalog()
                .tasks
                .get(r.catalog_index)
                .map(|t| format!("{}{}", indent, format_task_line(t))),
            RowView::Placeholder(p) => Some(format!("{}{}", indent, format_placeholder_line(p))),
        })
        .collect()
}

pub fn format_route_line(route: &Route, active: bool) -> String {
    let marker = if active { '*' } else { ' ' };
    format!(
        "{} {} ({} sections, {} tasks)",
        marker,
        route.name,
        route.sections.len(),
        route_ops::task_count(route)
    )
}

/// Sections and items of a route; task names come from the catalog when known.
pub fn format_route_detail(route: &Route, catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![route.name.clone()];
    if let Some(author) = &route.author {
        lines.push(format!("by {}", author));
    }
    if let Some(desc) = &route.description {
        lines.push(desc.clone());
    }
    for section in &route.sections {
        lines.push(String::new());
        match &section.description {
            Some(d) => lines.push(format!("{} - {}", section.key(), d)),
            None => lines.push(section.key().to_string()),
        }
        for item in &section.items {
            let line = match item {
                Item::Task(id) => match catalog.task(*id) {
                    Some(task) => format!("  {}", format_task_line(task)),
                    None => format!("  [?] {:>5} (not in catalog)", id),
                },
                Item::Placeholder(p) => {
                    format!("  {:>9} {} ({})", "-", p.display_name(), p.id)
                }
            };
            lines.push(line);
        }
    }
    lines
}
