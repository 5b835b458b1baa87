use crate::model::route::{Item, Placeholder, PlaceholderKind, Route, Section};

/// All task ids of a route in traversal order, skipping placeholders.
pub fn flatten_order(route: &Route) -> Vec<i32> {
    route.sections.iter().flat_map(task_ids).collect()
}

/// Total number of task references across all sections.
pub fn task_count(route: &Route) -> usize {
    route
        .sections
        .iter()
        .map(|s| s.items.iter().filter(|i| i.is_task()).count())
        .sum()
}

/// Every item of every section, in route order.
pub fn flattened_items(route: &Route) -> Vec<&Item> {
    route.sections.iter().flat_map(|s| s.items.iter()).collect()
}

/// First section (in order) holding a reference to `task_id`.
pub fn find_section_for_task(route: &Route, task_id: i32) -> Option<&Section> {
    route
        .sections
        .iter()
        .find(|s| section_contains_task(s, task_id))
}

fn find_section_for_task_mut(route: &mut Route, task_id: i32) -> Option<&mut Section> {
    route
        .sections
        .iter_mut()
        .find(|s| section_contains_task(s, task_id))
}

pub fn section_contains_task(section: &Section, task_id: i32) -> bool {
    section.items.iter().any(|i| i.task_id() == Some(task_id))
}

/// Whether `task_id` is the first task reference of its containing section.
/// Placeholders ahead of it do not count.
pub fn is_first_task_in_section(route: &Route, task_id: i32) -> bool {
    find_section_for_task(route, task_id)
        .and_then(|s| s.items.iter().find_map(Item::task_id))
        .is_some_and(|first| first == task_id)
}

/// The canonical item sequence of a section.
pub fn items(section: &Section) -> &[Item] {
    &section.items
}

pub fn task_ids(section: &Section) -> Vec<i32> {
    section.items.iter().filter_map(Item::task_id).collect()
}

pub fn placeholders(section: &Section) -> Vec<&Placeholder> {
    section.items.iter().filter_map(Item::placeholder).collect()
}

/// Insert a new placeholder immediately before or after `task_id`.
///
/// Returns `None` and leaves the route untouched when no section
/// references the task.
pub fn insert_placeholder(
    route: &mut Route,
    task_id: i32,
    kind: PlaceholderKind,
    insert_after: bool,
) -> Option<Placeholder> {
    let section = find_section_for_task_mut(route, task_id)?;
    let position = section
        .items
        .iter()
        .position(|i| i.task_id() == Some(task_id))?;

    let placeholder = Placeholder::new(kind);
    let at = if insert_after { position + 1 } else { position };
    section
        .items
        .insert(at, Item::Placeholder(placeholder.clone()));
    Some(placeholder)
}

pub fn find_placeholder<'a>(route: &'a Route, id: &str) -> Option<&'a Placeholder> {
    route
        .sections
        .iter()
        .flat_map(|s| s.items.iter())
        .filter_map(Item::placeholder)
        .find(|p| p.id == id)
}

/// Remove the first placeholder with `id` from whichever section holds it.
pub fn remove_placeholder(route: &mut Route, id: &str) -> bool {
    for section in &mut route.sections {
        let found = section
            .items
            .iter()
            .position(|i| i.placeholder().is_some_and(|p| p.id == id));
        if let Some(pos) = found {
            section.items.remove(pos);
            return true;
        }
    }
    false
}
