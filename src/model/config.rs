use std::fmt;

use serde::{Deserialize, Serialize};

/// Configuration from trail.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Profile that scopes most stored keys
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Path of the key-value store file, relative to the config directory
    #[serde(default = "default_store")]
    pub store: String,
    /// Path of the catalog definition file
    #[serde(default)]
    pub catalog: Option<String>,
    /// Log level for the `log` facade (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub list: ListSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            profile: default_profile(),
            store: default_store(),
            catalog: None,
            log_level: default_log_level(),
            list: ListSettings::default(),
        }
    }
}

fn default_profile() -> String {
    "default".into()
}

fn default_store() -> String {
    "trail-store.json".into()
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_batch_size() -> usize {
    50
}

/// Live filter/sort configuration of the list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSettings {
    #[serde(default)]
    pub tab: ListTab,
    /// Rows created per population batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub sort: SortCriteria,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub completed: CompletedFilter,
    #[serde(default)]
    pub tracked: TrackedFilter,
    #[serde(default)]
    pub ignored: IgnoredFilter,
    /// Tiers to show; empty shows every tier
    #[serde(default)]
    pub tiers: Vec<String>,
}

impl Default for ListSettings {
    fn default() -> Self {
        ListSettings {
            tab: ListTab::default(),
            batch_size: default_batch_size(),
            sort: SortCriteria::default(),
            direction: SortDirection::default(),
            completed: CompletedFilter::default(),
            tracked: TrackedFilter::default(),
            ignored: IgnoredFilter::default(),
            tiers: Vec::new(),
        }
    }
}

/// A list-view context partitioning routes, filters and active-route pointers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListTab {
    #[default]
    Tab1,
    Tab2,
    Tab3,
}

impl ListTab {
    /// Identifier used inside storage keys
    pub fn config_id(self) -> &'static str {
        match self {
            ListTab::Tab1 => "tab1",
            ListTab::Tab2 => "tab2",
            ListTab::Tab3 => "tab3",
        }
    }

    pub fn parse_tab(s: &str) -> Option<Self> {
        match s {
            "tab1" | "1" => Some(ListTab::Tab1),
            "tab2" | "2" => Some(ListTab::Tab2),
            "tab3" | "3" => Some(ListTab::Tab3),
            _ => None,
        }
    }
}

impl fmt::Display for ListTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_id())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriteria {
    /// Catalog order
    #[default]
    Default,
    Name,
    Tier,
    Points,
    Completion,
}

impl SortCriteria {
    pub const ALL: [SortCriteria; 5] = [
        SortCriteria::Default,
        SortCriteria::Name,
        SortCriteria::Tier,
        SortCriteria::Points,
        SortCriteria::Completion,
    ];

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Which completion states are shown (applies to tasks and placeholders)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletedFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl CompletedFilter {
    pub fn admits(self, completed: bool) -> bool {
        match self {
            CompletedFilter::All => true,
            CompletedFilter::Complete => completed,
            CompletedFilter::Incomplete => !completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            CompletedFilter::All => CompletedFilter::Incomplete,
            CompletedFilter::Incomplete => CompletedFilter::Complete,
            CompletedFilter::Complete => CompletedFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedFilter {
    #[default]
    All,
    Tracked,
    Untracked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoredFilter {
    #[default]
    NotIgnored,
    Ignored,
    All,
}
