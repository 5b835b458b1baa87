use std::collections::HashMap;
use std::sync::Arc;

use crate::model::catalog::Catalog;
use crate::model::route::Placeholder;
use crate::ops::sort::SortedIndex;

/// Identity of a row in display order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Task(i32),
    Placeholder(String),
    Header(String),
}

/// Row view for one catalog task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task_id: i32,
    /// Index into the buffer's catalog
    pub catalog_index: usize,
    pub visible: bool,
}

/// Row view for a placeholder of the active route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRow {
    pub placeholder: Placeholder,
    /// Header key of the section holding it
    pub header: String,
    pub completed: bool,
    pub visible: bool,
}

/// Section header: name, progress and collapse state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeaderRow {
    /// Registry key; the section name, suffixed when a route repeats a name
    pub key: String,
    /// Section name as used by the collapse state
    pub section: String,
    pub description: Option<String>,
    pub completed: usize,
    pub total: usize,
    pub collapsed: bool,
    pub visible: bool,
    /// Rows of this section, in display order
    pub members: Vec<RowKey>,
}

impl SectionHeaderRow {
    pub fn new(section: &str, description: Option<String>, completed: usize, total: usize) -> Self {
        SectionHeaderRow {
            key: section.to_string(),
            section: section.to_string(),
            description,
            completed,
            total,
            collapsed: false,
            visible: true,
            members: Vec::new(),
        }
    }

    /// `Name - description` or just `Name`
    pub fn label(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => format!("{} - {}", self.section, d),
            _ => self.section.clone(),
        }
    }

    pub fn progress(&self) -> String {
        format!("{}/{}", self.completed, self.total)
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

/// A visible row, borrowed from the shown buffer
#[derive(Debug, Clone, Copy)]
pub enum RowView<'a> {
    Task(&'a TaskRow),
    Placeholder(&'a PlaceholderRow),
    Header(&'a SectionHeaderRow),
}

impl RowView<'_> {
    pub fn key(&self) -> RowKey {
        match self {
            RowView::Task(r) => RowKey::Task(r.task_id),
            RowView::Placeholder(r) => RowKey::Placeholder(r.placeholder.id.clone()),
            RowView::Header(h) => RowKey::Header(h.key.clone()),
        }
    }
}

/// One of the two interchangeable row containers.
///
/// Each buffer owns the rows of one generation together with the catalog
/// snapshot they were built from.
#[derive(Debug, Default)]
pub struct ListBuffer {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) sorted: Arc<SortedIndex>,
    pub(crate) task_rows: Vec<TaskRow>,
    pub(crate) task_index: HashMap<i32, usize>,
    pub(crate) placeholder_rows: HashMap<String, PlaceholderRow>,
    pub(crate) headers: HashMap<String, SectionHeaderRow>,
    /// Header key of the section each route task belongs to
    pub(crate) task_section: HashMap<i32, String>,
    pub(crate) order: Vec<RowKey>,
    pub(crate) shown: bool,
}

impl ListBuffer {
    /// Drop every row and point the buffer at a new catalog.
    pub fn reset(&mut self, catalog: Arc<Catalog>, sorted: Arc<SortedIndex>) {
        self.clear();
        self.catalog = catalog;
        self.sorted = sorted;
    }

    pub fn clear(&mut self) {
        self.catalog = Arc::default();
        self.sorted = Arc::default();
        self.task_rows.clear();
        self.task_index.clear();
        self.placeholder_rows.clear();
        self.headers.clear();
        self.task_section.clear();
        self.order.clear();
    }

    /// Append a row for the catalog task at `catalog_index`.
    pub fn push_task_row(&mut self, catalog_index: usize) {
        let Some(task) = self.catalog.tasks.get(catalog_index) else {
            return;
        };
        let task_id = task.id();
        self.task_index.insert(task_id, self.task_rows.len());
        self.task_rows.push(TaskRow {
            task_id,
            catalog_index,
            visible: false,
        });
        self.order.push(RowKey::Task(task_id));
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn task_row(&self, task_id: i32) -> Option<&TaskRow> {
        self.task_index.get(&task_id).map(|&i| &self.task_rows[i])
    }

    pub fn task_row_mut(&mut self, task_id: i32) -> Option<&mut TaskRow> {
        match self.task_index.get(&task_id) {
            Some(&i) => self.task_rows.get_mut(i),
            None => None,
        }
    }

    pub fn row(&self, key: &RowKey) -> Option<RowView<'_>> {
        match key {
            RowKey::Task(id) => self.task_row(*id).map(RowView::Task),
            RowKey::Placeholder(id) => self.placeholder_rows.get(id).map(RowView::Placeholder),
            RowKey::Header(k) => self.headers.get(k).map(RowView::Header),
        }
    }

    fn is_row_visible(&self, key: &RowKey) -> bool {
        match self.row(key) {
            Some(RowView::Task(r)) => r.visible,
            Some(RowView::Placeholder(r)) => r.visible,
            Some(RowView::Header(h)) => h.visible,
            None => false,
        }
    }

    /// Every row in display order, visible or not
    pub fn rows(&self) -> Vec<(RowKey, bool)> {
        self.order
            .iter()
            .map(|k| (k.clone(), self.is_row_visible(k)))
            .collect()
    }

    /// Visible rows in display order
    pub fn visible_rows(&self) -> Vec<RowView<'_>> {
        self.order
            .iter()
            .filter(|k| self.is_row_visible(k))
            .filter_map(|k| self.row(k))
            .collect()
    }

    pub fn display_order(&self, key: &RowKey) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    /// Whether any task or placeholder row is visible
    pub fn has_visible_items(&self) -> bool {
        self.task_rows.iter().any(|r| r.visible)
            || self.placeholder_rows.values().any(|r| r.visible)
    }
}
