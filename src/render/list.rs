use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::io::kv::KeyValueStore;
use crate::io::route_store::RouteStore;
use crate::model::catalog::{Catalog, Task};
use crate::model::config::{ListSettings, SortDirection};
use crate::model::route::{Item, Placeholder, PlaceholderKind, Route};
use crate::ops::filter::TaskFilter;
use crate::ops::route_ops;
use crate::ops::sort::SortedIndex;

use super::rows::{ListBuffer, PlaceholderRow, RowKey, RowView, SectionHeaderRow};
use super::scheduler::{RenderError, Scheduler};

/// Number of interchangeable row containers
pub const BUFFER_COUNT: usize = 2;

/// Population progress of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationState {
    /// No population has run yet
    Idle,
    /// Rows are being created in the hidden `slot`; `cursor` is the next
    /// catalog index to materialize
    Populating { slot: usize, cursor: usize },
    /// `slot` holds a complete generation and is shown
    Ready { slot: usize },
}

/// Continuations queued on the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    PopulateBatch { generation: u64 },
    Redraw,
}

/// Keeps the visible rows of the task list consistent with the catalog,
/// the active route, the filter and the sort settings.
///
/// Catalog changes rebuild rows in batches into the hidden buffer and swap
/// it in only when complete; everything else re-orders and re-filters the
/// rows of the shown buffer in place.
pub struct ListRenderer {
    scheduler: Scheduler<Job>,
    buffers: [ListBuffer; BUFFER_COUNT],
    current: usize,
    state: PopulationState,
    generation: u64,
    settings: ListSettings,
    filter: Box<dyn TaskFilter>,
    active_route: Option<Route>,
    route_task_ids: HashSet<i32>,
    collapsed_sections: BTreeSet<String>,
    completed_placeholders: BTreeSet<String>,
    empty_message_visible: bool,
}

impl ListRenderer {
    pub fn new(settings: ListSettings, filter: Box<dyn TaskFilter>) -> Self {
        let mut buffers: [ListBuffer; BUFFER_COUNT] = Default::default();
        buffers[0].shown = true;
        ListRenderer {
            scheduler: Scheduler::new(),
            buffers,
            current: 0,
            state: PopulationState::Idle,
            generation: 0,
            settings,
            filter,
            active_route: None,
            route_task_ids: HashSet::new(),
            collapsed_sections: BTreeSet::new(),
            completed_placeholders: BTreeSet::new(),
            empty_message_visible: false,
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> PopulationState {
        self.state
    }

    pub fn settings(&self) -> &ListSettings {
        &self.settings
    }

    /// Index of the buffer currently shown
    pub fn shown_slot(&self) -> usize {
        self.current
    }

    fn hidden_slot(&self) -> usize {
        (self.current + 1) % BUFFER_COUNT
    }

    pub fn shown(&self) -> &ListBuffer {
        &self.buffers[self.current]
    }

    pub fn buffer(&self, slot: usize) -> Option<&ListBuffer> {
        self.buffers.get(slot)
    }

    /// Catalog behind the shown rows
    pub fn catalog(&self) -> &Catalog {
        &self.shown().catalog
    }

    pub fn task(&self, task_id: i32) -> Option<&Task> {
        self.catalog().task(task_id)
    }

    pub fn active_route(&self) -> Option<&Route> {
        self.active_route.as_ref()
    }

    pub fn completed_placeholders(&self) -> &BTreeSet<String> {
        &self.completed_placeholders
    }

    pub fn collapsed_sections(&self) -> &BTreeSet<String> {
        &self.collapsed_sections
    }

    pub fn visible_rows(&self) -> Vec<RowView<'_>> {
        self.shown().visible_rows()
    }

    pub fn is_empty_message_visible(&self) -> bool {
        self.empty_message_visible
    }

    pub fn pending_jobs(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn header(&self, key: &str) -> Option<&SectionHeaderRow> {
        self.shown().headers.get(key)
    }

    pub fn empty_message(&self) -> &'static str {
        "No tasks match the current filters."
    }

    // --- Configuration ---

    /// Replace sort/filter settings; takes effect on the next redraw.
    pub fn set_settings(&mut self, settings: ListSettings) {
        self.settings = settings;
    }

    pub fn set_filter(&mut self, filter: Box<dyn TaskFilter>) {
        self.filter = filter;
    }

    // --- Scheduling ---

    /// Run the next queued continuation. Returns whether a job ran.
    pub fn run_next<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
    ) -> Result<bool, RenderError> {
        self.scheduler.check_thread("run_next")?;
        let Some(job) = self.scheduler.next_job() else {
            return Ok(false);
        };
        match job {
            Job::PopulateBatch { generation } => self.process_batch(generation),
            Job::Redraw => self.redraw(store)?,
        }
        Ok(true)
    }

    /// Drain the queue. Only for callers that may block (CLI, tests).
    pub fn run_until_idle<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
    ) -> Result<usize, RenderError> {
        let mut ran = 0;
        while self.run_next(store)? {
            ran += 1;
        }
        Ok(ran)
    }

    // --- Population ---

    /// Start building rows for a new catalog in the hidden buffer.
    ///
    /// An unfinished population is abandoned: its queued batches no longer
    /// match the current generation and its buffer is reset here.
    pub fn populate(&mut self, catalog: Catalog) -> Result<(), RenderError> {
        self.scheduler.check_thread("populate")?;
        log::debug!("drawing new catalog {}", catalog.type_key);

        if let PopulationState::Populating { slot, cursor } = self.state {
            log::debug!(
                "abandoning population of slot {} at {} (generation {})",
                slot,
                cursor,
                self.generation
            );
        }

        let slot = self.hidden_slot();
        let sorted = SortedIndex::build(&catalog.tasks);
        self.generation += 1;
        self.buffers[slot].reset(Arc::new(catalog), Arc::new(sorted));
        self.state = PopulationState::Populating { slot, cursor: 0 };
        self.scheduler.invoke_later(Job::PopulateBatch {
            generation: self.generation,
        });
        Ok(())
    }

    fn process_batch(&mut self, generation: u64) {
        let PopulationState::Populating { slot, cursor } = self.state else {
            log::debug!("dropping batch for generation {}: not populating", generation);
            return;
        };
        if generation != self.generation {
            log::debug!("dropping stale batch for generation {}", generation);
            return;
        }

        let batch_size = self.settings.batch_size.max(1);
        let buffer = &mut self.buffers[slot];
        let total = buffer.catalog.len();
        let end = (cursor + batch_size).min(total);
        log::debug!("process batch {}..{} of {} into slot {}", cursor, end, total, slot);
        for index in cursor..end {
            buffer.push_task_row(index);
        }

        if end < total {
            self.state = PopulationState::Populating { slot, cursor: end };
            self.scheduler.invoke_later(Job::PopulateBatch { generation });
        } else {
            self.swap_to(slot);
        }
    }

    /// Show `slot`, hide and clear the previously shown buffer, and queue a
    /// full refresh of the new generation.
    fn swap_to(&mut self, slot: usize) {
        log::debug!("showing task list buffer {}", slot);
        let previous = self.current;
        self.buffers[slot].shown = true;
        if previous != slot {
            self.buffers[previous].shown = false;
            self.buffers[previous].clear();
        }
        self.current = slot;
        self.state = PopulationState::Ready { slot };
        self.scheduler.invoke_later(Job::Redraw);
    }

    // --- Redraw ---

    /// Recompute order and visibility of the shown rows without rebuilding
    /// task rows.
    pub fn redraw<S: KeyValueStore>(&mut self, store: &RouteStore<S>) -> Result<(), RenderError> {
        self.scheduler.check_thread("redraw")?;
        log::debug!("redrawing task list");

        for header in self.buffers[self.current].headers.values_mut() {
            header.visible = false;
        }

        if self.buffers[self.current].task_rows.is_empty() {
            self.active_route = None;
            self.route_task_ids.clear();
            self.empty_message_visible = true;
            return Ok(());
        }

        let type_key = self.catalog().type_key.clone();
        match store.get_active_route(self.settings.tab, &type_key) {
            Some(route) => self.redraw_with_sections(store, route),
            None => self.redraw_without_sections(),
        }
        self.refresh_all();
        Ok(())
    }

    fn redraw_without_sections(&mut self) {
        self.active_route = None;
        self.route_task_ids.clear();
        self.collapsed_sections.clear();
        self.completed_placeholders.clear();

        let criteria = self.settings.sort;
        let descending = self.settings.direction == SortDirection::Descending;
        let buffer = &mut self.buffers[self.current];
        buffer.headers.clear();
        buffer.placeholder_rows.clear();
        buffer.task_section.clear();

        let count = buffer.task_rows.len();
        let mut order = Vec::with_capacity(count);
        for position in 0..count {
            let adjusted = if descending { count - (position + 1) } else { position };
            let index = buffer.sorted.index_at(criteria, adjusted).unwrap_or(adjusted);
            if let Some(row) = buffer.task_rows.get(index) {
                order.push(RowKey::Task(row.task_id));
            }
        }
        buffer.order = order;
    }

    fn redraw_with_sections<S: KeyValueStore>(&mut self, store: &RouteStore<S>, route: Route) {
        let tab = self.settings.tab;
        let completed_filter = self.settings.completed;
        let type_key = self.catalog().type_key.clone();

        self.completed_placeholders =
            store.load_custom_item_completion(tab, &type_key, &route.name);
        self.collapsed_sections = store.load_collapsed_sections(tab, &type_key, &route.name);
        self.route_task_ids = route_ops::flatten_order(&route).into_iter().collect();

        let buffer = &mut self.buffers[self.current];
        let catalog = Arc::clone(&buffer.catalog);
        let mut old_placeholders = std::mem::take(&mut buffer.placeholder_rows);
        let mut old_headers = std::mem::take(&mut buffer.headers);
        let mut placeholders = HashMap::new();
        let mut headers = HashMap::new();
        let mut task_section = HashMap::new();
        let mut positioned: HashSet<i32> = HashSet::new();
        let mut order = Vec::with_capacity(buffer.task_rows.len());

        for section in &route.sections {
            let items = route_ops::items(section);
            if items.is_empty() {
                continue;
            }

            let key = unique_header_key(section.key(), &headers);
            let mut members = Vec::new();
            let mut survivors = 0;
            let mut completed = 0;

            for item in items {
                match item {
                    Item::Task(task_id) => {
                        let Some(row) = buffer.task_row(*task_id) else {
                            continue;
                        };
                        if !positioned.insert(*task_id) {
                            continue;
                        }
                        if let Some(task) = catalog.tasks.get(row.catalog_index)
                            && self.filter.matches(task)
                        {
                            survivors += 1;
                            if task.is_completed() {
                                completed += 1;
                            }
                        }
                        task_section.insert(*task_id, key.clone());
                        members.push(RowKey::Task(*task_id));
                    }
                    Item::Placeholder(p) => {
                        let done = self.completed_placeholders.contains(&p.id);
                        if !completed_filter.admits(done) {
                            continue;
                        }
                        let mut row = old_placeholders.remove(&p.id).unwrap_or_else(|| {
                            PlaceholderRow {
                                placeholder: p.clone(),
                                header: key.clone(),
                                completed: done,
                                visible: true,
                            }
                        });
                        row.placeholder = p.clone();
                        row.header = key.clone();
                        row.completed = done;
                        survivors += 1;
                        if done {
                            completed += 1;
                        }
                        members.push(RowKey::Placeholder(p.id.clone()));
                        placeholders.insert(p.id.clone(), row);
                    }
                }
            }

            if survivors == 0 {
                // No header; the section's task rows stay in place, hidden.
                for member in members {
                    if let RowKey::Task(id) = member {
                        task_section.remove(&id);
                        order.push(RowKey::Task(id));
                    }
                }
                continue;
            }

            let section_name = section.key().to_string();
            let mut header = match old_headers.remove(&key) {
                Some(h)
                    if h.completed == completed
                        && h.total == survivors
                        && h.description == section.description =>
                {
                    h
                }
                _ => SectionHeaderRow::new(
                    &section_name,
                    section.description.clone(),
                    completed,
                    survivors,
                ),
            };
            header.key = key.clone();
            header.section = section_name.clone();
            header.collapsed = self.collapsed_sections.contains(&key);
            header.visible = true;
            header.members = members.clone();

            order.push(RowKey::Header(key.clone()));
            order.extend(members);
            headers.insert(key, header);
        }

        for row in &buffer.task_rows {
            if !positioned.contains(&row.task_id) {
                order.push(RowKey::Task(row.task_id));
            }
        }

        buffer.order = order;
        buffer.placeholder_rows = placeholders;
        buffer.headers = headers;
        buffer.task_section = task_section;
        self.active_route = Some(route);
    }

    /// Whether a task passes the standing filter and, in route mode, is
    /// part of the active route.
    fn task_passes(&self, task: &Task) -> bool {
        if self.active_route.is_some() && !self.route_task_ids.contains(&task.id()) {
            return false;
        }
        self.filter.matches(task)
    }

    fn is_task_row_visible(&self, buffer: &ListBuffer, task_id: i32, catalog_index: usize) -> bool {
        let Some(task) = buffer.catalog.tasks.get(catalog_index) else {
            return false;
        };
        if !self.task_passes(task) {
            return false;
        }
        let collapsed = buffer
            .task_section
            .get(&task_id)
            .and_then(|key| buffer.headers.get(key))
            .is_some_and(|h| h.collapsed);
        !collapsed
    }

    /// Re-evaluate the visibility of every shown row.
    fn refresh_all(&mut self) {
        let buffer = &self.buffers[self.current];
        let task_visibility: Vec<bool> = buffer
            .task_rows
            .iter()
            .map(|r| self.is_task_row_visible(buffer, r.task_id, r.catalog_index))
            .collect();

        let buffer = &mut self.buffers[self.current];
        for (row, visible) in buffer.task_rows.iter_mut().zip(task_visibility) {
            row.visible = visible;
        }
        let collapsed_headers: HashSet<String> = buffer
            .headers
            .values()
            .filter(|h| h.collapsed)
            .map(|h| h.key.clone())
            .collect();
        for row in buffer.placeholder_rows.values_mut() {
            row.visible = !collapsed_headers.contains(&row.header);
        }
        self.empty_message_visible = !buffer.has_visible_items();
    }

    /// Re-evaluate one task row, e.g. after its saved state changed.
    pub fn refresh_task(&mut self, task_id: i32) -> Result<bool, RenderError> {
        self.scheduler.check_thread("refresh")?;
        let buffer = &self.buffers[self.current];
        let Some(row) = buffer.task_row(task_id) else {
            log::debug!("attempted to refresh unknown task {}", task_id);
            return Ok(false);
        };
        let visible = self.is_task_row_visible(buffer, task_id, row.catalog_index);
        let buffer = &mut self.buffers[self.current];
        if let Some(row) = buffer.task_row_mut(task_id) {
            row.visible = visible;
        }
        self.empty_message_visible = !buffer.has_visible_items();
        Ok(true)
    }

    /// Replace a task's state in every buffer holding it and refresh its row.
    pub fn update_task(&mut self, task: Task) -> Result<bool, RenderError> {
        self.scheduler.check_thread("update_task")?;
        let task_id = task.id();
        for buffer in &mut self.buffers {
            if buffer.catalog.position(task_id).is_some()
                && let Some(slot) = Arc::make_mut(&mut buffer.catalog).task_mut(task_id)
            {
                *slot = task.clone();
            }
        }
        self.refresh_task(task_id)
    }

    // --- Collapse ---

    /// Flip a section header between collapsed and expanded.
    ///
    /// Member rows are hidden on collapse; on expand task rows are shown
    /// only if they still pass the filter. Row order is untouched.
    pub fn toggle_collapsed<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
        header_key: &str,
    ) -> Result<bool, RenderError> {
        self.scheduler.check_thread("toggle_collapsed")?;
        let buffer = &mut self.buffers[self.current];
        let Some(header) = buffer.headers.get_mut(header_key) else {
            return Ok(false);
        };
        header.collapsed = !header.collapsed;
        let collapsed = header.collapsed;
        let key = header.key.clone();
        let members = header.members.clone();

        if collapsed {
            self.collapsed_sections.insert(key);
        } else {
            self.collapsed_sections.remove(&key);
        }

        for member in &members {
            match member {
                RowKey::Task(task_id) => {
                    let buffer = &self.buffers[self.current];
                    let passes = buffer
                        .task_row(*task_id)
                        .and_then(|r| buffer.catalog.tasks.get(r.catalog_index))
                        .is_some_and(|t| self.task_passes(t));
                    if let Some(row) = self.buffers[self.current].task_row_mut(*task_id) {
                        row.visible = !collapsed && passes;
                    }
                }
                RowKey::Placeholder(id) => {
                    if let Some(row) = self.buffers[self.current].placeholder_rows.get_mut(id) {
                        row.visible = !collapsed;
                    }
                }
                RowKey::Header(_) => {}
            }
        }
        self.empty_message_visible = !self.buffers[self.current].has_visible_items();

        if let Some(route) = &self.active_route {
            let type_key = self.buffers[self.current].catalog.type_key.clone();
            store.save_collapsed_sections(
                self.settings.tab,
                &type_key,
                &route.name,
                &self.collapsed_sections,
            );
        }
        Ok(true)
    }

    // --- Placeholder edits ---

    /// Mark a placeholder of the active route done or not done, persist the
    /// completion set, and queue a redraw.
    pub fn set_placeholder_completed<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
        placeholder_id: &str,
        done: bool,
    ) -> Result<bool, RenderError> {
        self.scheduler.check_thread("set_placeholder_completed")?;
        let Some(route) = &self.active_route else {
            return Ok(false);
        };
        if route_ops::find_placeholder(route, placeholder_id).is_none() {
            return Ok(false);
        }
        if done {
            self.completed_placeholders.insert(placeholder_id.to_string());
        } else {
            self.completed_placeholders.remove(placeholder_id);
        }
        let type_key = self.catalog().type_key.clone();
        store.save_custom_item_completion(
            self.settings.tab,
            &type_key,
            &route.name,
            &self.completed_placeholders,
        );
        if let Some(row) = self.buffers[self.current]
            .placeholder_rows
            .get_mut(placeholder_id)
        {
            row.completed = done;
        }
        self.scheduler.invoke_later(Job::Redraw);
        Ok(true)
    }

    /// Insert a placeholder next to a task of the active route, save the
    /// route and redraw.
    pub fn insert_placeholder<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
        task_id: i32,
        kind: PlaceholderKind,
        insert_after: bool,
    ) -> Result<Option<Placeholder>, RenderError> {
        self.scheduler.check_thread("insert_placeholder")?;
        let tab = self.settings.tab;
        let type_key = self.catalog().type_key.clone();
        let Some(mut route) = store.get_active_route(tab, &type_key) else {
            return Ok(None);
        };
        let Some(placeholder) = route_ops::insert_placeholder(&mut route, task_id, kind, insert_after)
        else {
            return Ok(None);
        };
        store.update_route(tab, &type_key, route);
        self.redraw(store)?;
        Ok(Some(placeholder))
    }

    /// Remove a placeholder from the active route, save the route and redraw.
    pub fn remove_placeholder<S: KeyValueStore>(
        &mut self,
        store: &mut RouteStore<S>,
        placeholder_id: &str,
    ) -> Result<bool, RenderError> {
        self.scheduler.check_thread("remove_placeholder")?;
        let tab = self.settings.tab;
        let type_key = self.catalog().type_key.clone();
        let Some(mut route) = store.get_active_route(tab, &type_key) else {
            return Ok(false);
        };
        if !route_ops::remove_placeholder(&mut route, placeholder_id) {
            return Ok(false);
        }
        store.update_route(tab, &type_key, route);
        self.redraw(store)?;
        Ok(true)
    }
}

/// Header key for a section; repeated names get a `#n` suffix.
fn unique_header_key(name: &str, taken: &HashMap<String, SectionHeaderRow>) -> String {
    if !taken.contains_key(name) {
        return name.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}#{}", name, n);
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
