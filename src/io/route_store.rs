use std::collections::BTreeSet;

use crate::io::kv::{GROUP, KeyValueStore, Scope};
use crate::model::config::ListTab;
use crate::model::route::Route;

const ROUTES_PREFIX: &str = "routes";
const ACTIVE_ROUTE_PREFIX: &str = "activeRoute";
const TAG_FILTER_PREFIX: &str = "tagFilter";
const CUSTOM_COMPLETION_PREFIX: &str = "customCompletion";
const COLLAPSED_PREFIX: &str = "collapsedSections";
const SEPARATOR: &str = "-";

fn scoped_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = prefix.to_string();
    for part in parts {
        key.push_str(SEPARATOR);
        key.push_str(part);
    }
    key
}

/// Comma-joined id set; the empty set is the empty string.
fn join_set(ids: &BTreeSet<String>) -> String {
    ids.iter().cloned().collect::<Vec<_>>().join(",")
}

fn split_set(value: Option<String>) -> BTreeSet<String> {
    match value {
        Some(v) if !v.is_empty() => v
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Routes and route-related scalar state, persisted in a key-value store.
#[derive(Debug, Default)]
pub struct RouteStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RouteStore<S> {
    pub fn new(store: S) -> Self {
        RouteStore { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // --- Routes ---

    /// Write the full route collection. An empty collection is written as
    /// the empty string so it reads back like a missing key.
    pub fn save(&mut self, tab: ListTab, catalog_key: &str, routes: &[Route]) {
        let key = scoped_key(ROUTES_PREFIX, &[tab.config_id(), catalog_key]);
        let value = if routes.is_empty() {
            String::new()
        } else {
            match serde_json::to_string(routes) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("could not encode routes for {}: {}", key, e);
                    return;
                }
            }
        };
        self.store.set(Scope::Profile, GROUP, &key, &value);
    }

    /// Read the route collection. Missing, empty and corrupt values all
    /// yield an empty list; routes without a name are dropped.
    pub fn load(&self, tab: ListTab, catalog_key: &str) -> Vec<Route> {
        let key = scoped_key(ROUTES_PREFIX, &[tab.config_id(), catalog_key]);
        let json = match self.store.get(Scope::Profile, GROUP, &key) {
            Some(v) if !v.is_empty() => v,
            _ => return Vec::new(),
        };
        match serde_json::from_str::<Option<Vec<Option<Route>>>>(&json) {
            Ok(routes) => routes
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter(|r| !r.name.is_empty())
                .collect(),
            Err(e) => {
                log::error!(
                    "failed to parse routes for tab {} task type {}: {}",
                    tab,
                    catalog_key,
                    e
                );
                Vec::new()
            }
        }
    }

    pub fn save_active_route_name(&mut self, tab: ListTab, catalog_key: &str, name: Option<&str>) {
        let key = scoped_key(ACTIVE_ROUTE_PREFIX, &[tab.config_id(), catalog_key]);
        self.store
            .set(Scope::Profile, GROUP, &key, name.unwrap_or(""));
    }

    pub fn load_active_route_name(&self, tab: ListTab, catalog_key: &str) -> Option<String> {
        let key = scoped_key(ACTIVE_ROUTE_PREFIX, &[tab.config_id(), catalog_key]);
        self.store
            .get(Scope::Profile, GROUP, &key)
            .filter(|v| !v.is_empty())
    }

    pub fn get_active_route(&self, tab: ListTab, catalog_key: &str) -> Option<Route> {
        let name = self.load_active_route_name(tab, catalog_key)?;
        self.load(tab, catalog_key)
            .into_iter()
            .find(|r| r.name == name)
    }

    /// Add a route, replacing any existing route with the same name.
    pub fn add_route_to_tab(&mut self, tab: ListTab, catalog_key: &str, route: Route) {
        let mut routes = self.load(tab, catalog_key);
        routes.retain(|r| r.name != route.name);
        routes.push(route);
        self.save(tab, catalog_key, &routes);
    }

    /// Replace a route in place, keeping its position; appends if unknown.
    pub fn update_route(&mut self, tab: ListTab, catalog_key: &str, route: Route) {
        let mut routes = self.load(tab, catalog_key);
        match routes.iter_mut().find(|r| r.name == route.name) {
            Some(slot) => *slot = route,
            None => routes.push(route),
        }
        self.save(tab, catalog_key, &routes);
    }

    /// Remove a route by name. If it was active, the first remaining route
    /// becomes active (or none).
    pub fn remove_route_from_tab(&mut self, tab: ListTab, catalog_key: &str, name: &str) -> bool {
        let mut routes = self.load(tab, catalog_key);
        let before = routes.len();
        routes.retain(|r| r.name != name);
        let removed = routes.len() != before;
        self.save(tab, catalog_key, &routes);

        if self.load_active_route_name(tab, catalog_key).as_deref() == Some(name) {
            let next = routes.first().map(|r| r.name.clone());
            self.save_active_route_name(tab, catalog_key, next.as_deref());
        }
        removed
    }

    // --- Tag filter (account scope) ---

    pub fn save_tag_filter(&mut self, tab: ListTab, tags: &BTreeSet<String>) {
        let key = scoped_key(TAG_FILTER_PREFIX, &[tab.config_id()]);
        self.store.set(Scope::Account, GROUP, &key, &join_set(tags));
    }

    pub fn load_tag_filter(&self, tab: ListTab) -> BTreeSet<String> {
        let key = scoped_key(TAG_FILTER_PREFIX, &[tab.config_id()]);
        split_set(self.store.get(Scope::Account, GROUP, &key))
    }

    // --- Placeholder completion ---

    pub fn save_custom_item_completion(
        &mut self,
        tab: ListTab,
        catalog_key: &str,
        route_name: &str,
        completed: &BTreeSet<String>,
    ) {
        let key = scoped_key(
            CUSTOM_COMPLETION_PREFIX,
            &[tab.config_id(), catalog_key, route_name],
        );
        self.store.set(Scope::Profile, GROUP, &key, &join_set(completed));
    }

    pub fn load_custom_item_completion(
        &self,
        tab: ListTab,
        catalog_key: &str,
        route_name: &str,
    ) -> BTreeSet<String> {
        let key = scoped_key(
            CUSTOM_COMPLETION_PREFIX,
            &[tab.config_id(), catalog_key, route_name],
        );
        split_set(self.store.get(Scope::Profile, GROUP, &key))
    }

    // --- Collapsed sections ---

    pub fn save_collapsed_sections(
        &mut self,
        tab: ListTab,
        catalog_key: &str,
        route_name: &str,
        collapsed: &BTreeSet<String>,
    ) {
        let key = scoped_key(COLLAPSED_PREFIX, &[tab.config_id(), catalog_key, route_name]);
        self.store.set(Scope::Profile, GROUP, &key, &join_set(collapsed));
    }

    pub fn load_collapsed_sections(
        &self,
        tab: ListTab,
        catalog_key: &str,
        route_name: &str,
    ) -> BTreeSet<String> {
        let key = scoped_key(COLLAPSED_PREFIX, &[tab.config_id(), catalog_key, route_name]);
        split_set(self.store.get(Scope::Profile, GROUP, &key))
    }
}
