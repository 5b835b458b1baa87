use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::catalog::Task;
use crate::model::config::SortCriteria;

/// Catalog indices sorted by each criterion, computed once per catalog.
#[derive(Debug, Clone, Default)]
pub struct SortedIndex {
    by_criteria: HashMap<SortCriteria, Vec<usize>>,
}

impl SortedIndex {
    pub fn build(tasks: &[Task]) -> Self {
        let by_criteria = SortCriteria::ALL
            .iter()
            .map(|&c| (c, sorted_indices(tasks, c)))
            .collect();
        SortedIndex { by_criteria }
    }

    /// Catalog index of the task at `position` in ascending order.
    pub fn index_at(&self, criteria: SortCriteria, position: usize) -> Option<usize> {
        self.by_criteria
            .get(&criteria)
            .and_then(|v| v.get(position))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_criteria
            .get(&SortCriteria::Default)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tier_rank(tier: Option<&str>) -> u8 {
    match tier.map(str::to_ascii_lowercase).as_deref() {
        Some("easy") => 0,
        Some("medium") => 1,
        Some("hard") => 2,
        Some("elite") => 3,
        Some("master") => 4,
        Some("grandmaster") => 5,
        Some(_) => 6,
        None => 7,
    }
}

/// Stable sort of catalog indices; ties keep catalog order.
pub fn sorted_indices(tasks: &[Task], criteria: SortCriteria) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..tasks.len()).collect();
    match criteria {
        SortCriteria::Default => {}
        SortCriteria::Name => indices.sort_by(|&a, &b| {
            tasks[a]
                .def
                .name
                .to_lowercase()
                .cmp(&tasks[b].def.name.to_lowercase())
        }),
        SortCriteria::Tier => indices.sort_by_key(|&i| tier_rank(tasks[i].def.tier.as_deref())),
        SortCriteria::Points => indices.sort_by_key(|&i| tasks[i].def.points.unwrap_or(0)),
        SortCriteria::Completion => indices.sort_by(|&a, &b| {
            match (tasks[a].def.completion_percent, tasks[b].def.completion_percent) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
    }
    indices
}
