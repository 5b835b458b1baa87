//! Store-level integration tests: routes, task saves and scalar state
//! written through a `FileStore`, flushed, and read back from a fresh open.

use std::collections::{BTreeSet, HashMap};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use trail::io::kv::{FileStore, GROUP, KeyValueStore, Scope};
use trail::io::route_store::RouteStore;
use trail::io::task_store::{load_task_saves, save_task_saves};
use trail::model::catalog::{Catalog, Task, TaskDefinition};
use trail::model::config::ListTab;
use trail::model::route::{Item, Placeholder, PlaceholderKind, Route, Section};

const TYPE: &str = "LEAGUE_5";

fn catalog() -> Catalog {
    let tasks = (1..=4)
        .map(|id| {
            Task::new(TaskDefinition {
                id,
                name: format!("task {}", id),
                ..Default::default()
            })
        })
        .collect();
    Catalog::new(TYPE, tasks)
}

fn reopen(tmp: &TempDir) -> RouteStore<FileStore> {
    let store = FileStore::open(&tmp.path().join("store.json"), "tester").unwrap();
    RouteStore::new(store)
}

#[test]
fn legacy_routes_on_disk_load_as_items() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileStore::open(&tmp.path().join("store.json"), "tester").unwrap();
    store.set(
        Scope::Profile,
        GROUP,
        "routes-tab1-LEAGUE_5",
        r#"[{"name":"Old","taskType":"LEAGUE_5","sections":[{"name":"A","taskIds":[3,null,1]}]},null]"#,
    );
    store.flush().unwrap();

    let routes = reopen(&tmp).load(ListTab::Tab1, TYPE);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].sections[0].items, vec![Item::Task(3), Item::Task(1)]);
}

#[test]
fn route_state_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let mut routes = reopen(&tmp);
    let bank = Placeholder {
        id: "bank0001".into(),
        kind: PlaceholderKind::Bank,
    };
    let section = Section::new("Start", vec![Item::Task(1), Item::Placeholder(bank)]);
    routes.add_route_to_tab(ListTab::Tab2, TYPE, Route::new("Fast", TYPE, vec![section]));
    routes.save_active_route_name(ListTab::Tab2, TYPE, Some("Fast"));
    routes.save_custom_item_completion(
        ListTab::Tab2,
        TYPE,
        "Fast",
        &BTreeSet::from(["bank0001".to_string()]),
    );
    routes.save_collapsed_sections(
        ListTab::Tab2,
        TYPE,
        "Fast",
        &BTreeSet::from(["Start".to_string()]),
    );
    routes.inner_mut().flush().unwrap();

    let routes = reopen(&tmp);
    let active = routes.get_active_route(ListTab::Tab2, TYPE).unwrap();
    assert_eq!(active.name, "Fast");
    assert_eq!(active.sections[0].items.len(), 2);
    assert_eq!(
        routes.load_custom_item_completion(ListTab::Tab2, TYPE, "Fast"),
        BTreeSet::from(["bank0001".to_string()])
    );
    assert_eq!(
        routes.load_collapsed_sections(ListTab::Tab2, TYPE, "Fast"),
        BTreeSet::from(["Start".to_string()])
    );
    // Other tabs are untouched
    assert!(routes.load(ListTab::Tab1, TYPE).is_empty());
    assert!(routes.load_active_route_name(ListTab::Tab1, TYPE).is_none());
}

#[test]
fn task_saves_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileStore::open(&tmp.path().join("store.json"), "tester").unwrap();
    let mut cat = catalog();
    cat.task_mut(2).unwrap().set_completed(true, 1_700_000_000_000);
    cat.task_mut(3).unwrap().set_tracked(true, 1_700_000_000_001);
    save_task_saves(&mut store, &cat);
    store.flush().unwrap();

    let mut store = FileStore::open(&tmp.path().join("store.json"), "tester").unwrap();
    let mut fresh = catalog();
    load_task_saves(&mut store, &mut fresh);
    assert!(fresh.task(2).unwrap().is_completed());
    assert!(fresh.task(3).unwrap().is_tracked());
    assert!(!fresh.task(1).unwrap().is_completed());
    let expected: HashMap<i32, _> = cat.save_data();
    assert_eq!(fresh.save_data(), expected);
}

#[test]
fn corrupt_task_blob_is_wiped() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileStore::open(&tmp.path().join("store.json"), "tester").unwrap();
    store.set(Scope::Profile, GROUP, "tasks-LEAGUE_5", "{not json");

    let mut cat = catalog();
    load_task_saves(&mut store, &mut cat);
    assert!(cat.save_data().is_empty());
    assert!(store.get(Scope::Profile, GROUP, "tasks-LEAGUE_5").is_none());
}

#[test]
fn profiles_do_not_share_routes() {
    let tmp = TempDir::new().unwrap();
    let mut routes = reopen(&tmp);
    routes.add_route_to_tab(ListTab::Tab1, TYPE, Route::new("Mine", TYPE, Vec::new()));
    routes.inner_mut().flush().unwrap();

    let other = FileStore::open(&tmp.path().join("store.json"), "someone-else").unwrap();
    assert!(RouteStore::new(other).load(ListTab::Tab1, TYPE).is_empty());
    assert_eq!(reopen(&tmp).load(ListTab::Tab1, TYPE).len(), 1);
}
