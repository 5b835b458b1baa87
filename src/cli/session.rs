use std::error::Error;
use std::path::{Path, PathBuf};

use crate::io::catalog_io::read_catalog;
use crate::io::config_io::{self, ConfigError};
use crate::io::kv::{FileStore, StoreError};
use crate::io::route_store::RouteStore;
use crate::io::task_store;
use crate::model::catalog::Catalog;
use crate::model::config::{ListSettings, ListTab, TrackerConfig};
use crate::ops::filter::StandingFilter;
use crate::render::list::ListRenderer;

/// Everything a command needs: config, the opened store and the catalog
/// with its saved task state applied.
pub struct Session {
    pub dir: PathBuf,
    pub config: TrackerConfig,
    pub tab: ListTab,
    pub store: RouteStore<FileStore>,
    pub catalog: Catalog,
}

pub fn parse_tab(tab: Option<&str>, default: ListTab) -> Result<ListTab, Box<dyn Error>> {
    match tab {
        Some(t) => ListTab::parse_tab(t)
            .ok_or_else(|| format!("unknown tab '{}' (expected tab1, tab2 or tab3)", t).into()),
        None => Ok(default),
    }
}

impl Session {
    pub fn open(
        dir: &Path,
        config: TrackerConfig,
        tab: Option<&str>,
    ) -> Result<Self, Box<dyn Error>> {
        let tab = parse_tab(tab, config.list.tab)?;
        let store_path = config_io::resolve(dir, &config.store);
        let mut file_store = FileStore::open(&store_path, &config.profile)?;

        let catalog_path = config
            .catalog
            .as_deref()
            .ok_or("no catalog configured; set `catalog` in trail.toml")?;
        let mut catalog = read_catalog(&config_io::resolve(dir, catalog_path))?;
        task_store::load_task_saves(&mut file_store, &mut catalog);

        Ok(Session {
            dir: dir.to_path_buf(),
            config,
            tab,
            store: RouteStore::new(file_store),
            catalog,
        })
    }

    pub fn type_key(&self) -> &str {
        &self.catalog.type_key
    }

    /// Configured list settings with the session's tab applied
    pub fn list_settings(&self) -> ListSettings {
        let mut settings = self.config.list.clone();
        settings.tab = self.tab;
        settings
    }

    /// The standing filter for `settings` plus the tab's saved tag filter
    pub fn standing_filter(&self, settings: &ListSettings) -> StandingFilter {
        StandingFilter::from_settings(settings).with_tags(self.store.load_tag_filter(self.tab))
    }

    /// Populate a renderer with the catalog and drain its queue.
    pub fn render(
        &mut self,
        settings: ListSettings,
        filter: StandingFilter,
    ) -> Result<ListRenderer, Box<dyn Error>> {
        let mut renderer = ListRenderer::new(settings, Box::new(filter));
        renderer.populate(self.catalog.clone())?;
        renderer.run_until_idle(&mut self.store)?;
        Ok(renderer)
    }

    pub fn save_tasks(&mut self) {
        task_store::save_task_saves(self.store.inner_mut(), &self.catalog);
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.store.inner_mut().flush()
    }

    /// Remember the view's sort and completion filter in `trail.toml`.
    /// Returns whether the file was written.
    pub fn save_view_settings(&mut self, settings: &ListSettings) -> Result<bool, ConfigError> {
        let list = &mut self.config.list;
        if list.sort == settings.sort
            && list.direction == settings.direction
            && list.completed == settings.completed
        {
            return Ok(false);
        }
        list.sort = settings.sort;
        list.direction = settings.direction;
        list.completed = settings.completed;
        config_io::write_config(&self.dir, &self.config)?;
        log::debug!("saved view settings to {}", self.dir.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{SortCriteria, SortDirection};
    use std::fs;
    use tempfile::TempDir;

    fn open_session(dir: &Path) -> Session {
        fs::write(
            dir.join("catalog.json"),
            r#"{"taskType": "LEAGUE_5", "tasks": [{"id": 1, "name": "Chop a tree"}]}"#,
        )
        .unwrap();
        let config = TrackerConfig {
            catalog: Some("catalog.json".into()),
            ..Default::default()
        };
        Session::open(dir, config, Some("tab2")).unwrap()
    }

    #[test]
    fn tab_argument_overrides_config() {
        assert_eq!(parse_tab(Some("tab3"), ListTab::Tab1).unwrap(), ListTab::Tab3);
        assert_eq!(parse_tab(None, ListTab::Tab2).unwrap(), ListTab::Tab2);
        assert!(parse_tab(Some("tab9"), ListTab::Tab1).is_err());
    }

    #[test]
    fn view_settings_written_only_when_changed() {
        let tmp = TempDir::new().unwrap();
        let mut session = open_session(tmp.path());
        assert_eq!(session.tab, ListTab::Tab2);

        let mut settings = session.list_settings();
        assert!(!session.save_view_settings(&settings).unwrap());
        assert!(!tmp.path().join(config_io::CONFIG_FILE).exists());

        settings.sort = SortCriteria::Name;
        settings.direction = SortDirection::Descending;
        assert!(session.save_view_settings(&settings).unwrap());

        let saved = config_io::read_config(tmp.path()).unwrap();
        assert_eq!(saved.list.sort, SortCriteria::Name);
        assert_eq!(saved.list.direction, SortDirection::Descending);
        // The session tab is not written back
        assert_eq!(saved.list.tab, ListTab::Tab1);
        assert_eq!(saved.catalog.as_deref(), Some("catalog.json"));
    }
}
