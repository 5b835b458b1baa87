use std::collections::HashMap;

use crate::io::kv::{GROUP, KeyValueStore, Scope};
use crate::model::catalog::{Catalog, TaskSave};

fn tasks_key(catalog_key: &str) -> String {
    format!("tasks-{}", catalog_key)
}

/// Load the saved task state for a catalog type and apply it.
///
/// A corrupt blob is logged and erased so the next load starts clean.
pub fn load_task_saves<S: KeyValueStore>(store: &mut S, catalog: &mut Catalog) {
    let key = tasks_key(&catalog.type_key);
    let json = match store.get(Scope::Profile, GROUP, &key) {
        Some(v) if !v.is_empty() => v,
        _ => {
            log::debug!("no save information for task type {}", catalog.type_key);
            return;
        }
    };
    match serde_json::from_str::<HashMap<i32, TaskSave>>(&json) {
        Ok(saves) => catalog.apply_save(saves),
        Err(e) => {
            log::error!("{} {} json invalid, wiping saved data: {}", GROUP, key, e);
            store.unset(Scope::Profile, GROUP, &key);
        }
    }
}

/// Write every task with non-default state.
pub fn save_task_saves<S: KeyValueStore>(store: &mut S, catalog: &Catalog) {
    let key = tasks_key(&catalog.type_key);
    match serde_json::to_string(&catalog.save_data()) {
        Ok(json) => store.set(Scope::Profile, GROUP, &key, &json),
        Err(e) => log::error!("could not encode task saves for {}: {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv::MemoryStore;
    use crate::model::catalog::{Task, TaskDefinition};

    fn catalog() -> Catalog {
        let tasks = (1..=3)
            .map(|id| {
                Task::new(TaskDefinition {
                    id,
                    name: format!("task {}", id),
                    ..Default::default()
                })
            })
            .collect();
        Catalog::new("LEAGUE_5", tasks)
    }

    #[test]
    fn save_and_load() {
        let mut store = MemoryStore::new("p");
        let mut c = catalog();
        c.task_mut(2).unwrap().set_completed(true, 99);
        c.task_mut(3).unwrap().save.tags.insert("boss".into());
        save_task_saves(&mut store, &c);

        let mut fresh = catalog();
        load_task_saves(&mut store, &mut fresh);
        assert!(fresh.task(2).unwrap().is_completed());
        assert!(fresh.task(3).unwrap().save.tags.contains("boss"));
        assert!(!fresh.task(1).unwrap().is_completed());
    }

    #[test]
    fn stored_keys_are_task_ids() {
        let mut store = MemoryStore::new("p");
        let mut c = catalog();
        c.task_mut(1).unwrap().set_tracked(true, 5);
        save_task_saves(&mut store, &c);
        let raw = store.get(Scope::Profile, GROUP, "tasks-LEAGUE_5").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["1"]["trackedOn"], 5);
        assert_eq!(value["1"]["completedOn"], 0);
    }

    #[test]
    fn corrupt_blob_is_erased() {
        let mut store = MemoryStore::new("p");
        store.set(Scope::Profile, GROUP, "tasks-LEAGUE_5", "[[[");
        let mut c = catalog();
        load_task_saves(&mut store, &mut c);
        assert!(store.get(Scope::Profile, GROUP, "tasks-LEAGUE_5").is_none());
        assert!(c.save_data().is_empty());
    }
}
