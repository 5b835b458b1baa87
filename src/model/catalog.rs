use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Persisted per-task state (one entry of the `tasks-<type>` blob).
/// Timestamps are epoch millis; 0 means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSave {
    #[serde(default)]
    pub completed_on: i64,
    #[serde(default)]
    pub tracked_on: i64,
    #[serde(default)]
    pub ignored_on: i64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl TaskSave {
    /// Whether this entry carries anything worth writing out.
    pub fn is_empty(&self) -> bool {
        self.completed_on == 0 && self.tracked_on == 0 && self.ignored_on == 0 && self.tags.is_empty()
    }
}

/// Static definition of a task, as found in a catalog file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub completion_percent: Option<f32>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A catalog task: its definition plus the user's saved state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub def: TaskDefinition,
    pub save: TaskSave,
}

impl Task {
    pub fn new(def: TaskDefinition) -> Self {
        Task {
            def,
            save: TaskSave::default(),
        }
    }

    pub fn id(&self) -> i32 {
        self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_completed(&self) -> bool {
        self.save.completed_on != 0
    }

    pub fn is_tracked(&self) -> bool {
        self.save.tracked_on != 0
    }

    pub fn is_ignored(&self) -> bool {
        self.save.ignored_on != 0
    }

    pub fn set_completed(&mut self, done: bool, now_millis: i64) {
        self.save.completed_on = if done { now_millis } else { 0 };
    }

    pub fn set_tracked(&mut self, tracked: bool, now_millis: i64) {
        self.save.tracked_on = if tracked { now_millis } else { 0 };
    }

    pub fn set_ignored(&mut self, ignored: bool, now_millis: i64) {
        self.save.ignored_on = if ignored { now_millis } else { 0 };
    }
}

/// Catalog file layout: `{ "taskType": ..., "tasks": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    pub task_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

/// The external collection of trackable tasks for one catalog type
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Catalog type key (e.g. `LEAGUE_5`), used in storage keys
    pub type_key: String,
    pub name: String,
    pub tasks: Vec<Task>,
    index: HashMap<i32, usize>,
}

impl Catalog {
    pub fn new(type_key: &str, tasks: Vec<Task>) -> Self {
        let index = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id(), i))
            .collect();
        Catalog {
            type_key: type_key.to_string(),
            name: type_key.to_string(),
            tasks,
            index,
        }
    }

    pub fn from_file(file: CatalogFile) -> Self {
        let tasks = file.tasks.into_iter().map(Task::new).collect();
        let mut catalog = Catalog::new(&file.task_type, tasks);
        if let Some(name) = file.name {
            catalog.name = name;
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of a task in catalog order
    pub fn position(&self, task_id: i32) -> Option<usize> {
        self.index.get(&task_id).copied()
    }

    pub fn task(&self, task_id: i32) -> Option<&Task> {
        self.position(task_id).map(|i| &self.tasks[i])
    }

    pub fn task_mut(&mut self, task_id: i32) -> Option<&mut Task> {
        match self.position(task_id) {
            Some(i) => self.tasks.get_mut(i),
            None => None,
        }
    }

    /// Apply a loaded save blob. Entries for unknown tasks are ignored.
    pub fn apply_save(&mut self, saves: HashMap<i32, TaskSave>) {
        for (id, save) in saves {
            if let Some(task) = self.task_mut(id) {
                task.save = save;
            }
        }
    }

    /// Save entries for every task with non-default state
    pub fn save_data(&self) -> HashMap<i32, TaskSave> {
        self.tasks
            .iter()
            .filter(|t| !t.save.is_empty())
            .map(|t| (t.id(), t.save.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: i32, name: &str) -> TaskDefinition {
        TaskDefinition {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::new("LEAGUE", vec![Task::new(def(10, "a")), Task::new(def(20, "b"))]);
        assert_eq!(catalog.position(20), Some(1));
        assert_eq!(catalog.task(10).map(|t| t.name()), Some("a"));
        assert!(catalog.task(30).is_none());
    }

    #[test]
    fn save_data_skips_untouched_tasks() {
        let mut catalog =
            Catalog::new("LEAGUE", vec![Task::new(def(1, "a")), Task::new(def(2, "b"))]);
        catalog.task_mut(2).unwrap().set_completed(true, 1_700_000_000_000);
        let saves = catalog.save_data();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[&2].completed_on, 1_700_000_000_000);
    }

    #[test]
    fn apply_save_ignores_unknown_ids() {
        let mut catalog = Catalog::new("LEAGUE", vec![Task::new(def(1, "a"))]);
        let mut saves = HashMap::new();
        saves.insert(
            1,
            TaskSave {
                tracked_on: 5,
                ..Default::default()
            },
        );
        saves.insert(99, TaskSave::default());
        catalog.apply_save(saves);
        assert!(catalog.task(1).unwrap().is_tracked());
    }

    #[test]
    fn task_save_defaults_from_partial_json() {
        let save: TaskSave = serde_json::from_str(r#"{"completedOn":12}"#).unwrap();
        assert_eq!(save.completed_on, 12);
        assert!(save.tags.is_empty());
    }
}
