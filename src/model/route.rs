use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a non-task waypoint in a route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Bank,
    HomeTeleport,
    FairyRing,
    /// Any other wire value, kept verbatim. Empty means the kind was absent.
    Other(String),
}

impl PlaceholderKind {
    /// Wire value (`bank`, `home_teleport`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            PlaceholderKind::Bank => "bank",
            PlaceholderKind::HomeTeleport => "home_teleport",
            PlaceholderKind::FairyRing => "fairy_ring",
            PlaceholderKind::Other(s) => s,
        }
    }

    pub fn parse_kind(s: &str) -> Self {
        match s {
            "bank" => PlaceholderKind::Bank,
            "home_teleport" => PlaceholderKind::HomeTeleport,
            "fairy_ring" => PlaceholderKind::FairyRing,
            other => PlaceholderKind::Other(other.to_string()),
        }
    }

    /// Human-readable name derived from the kind.
    pub fn display_name(&self) -> String {
        match self {
            PlaceholderKind::Bank => "Bank".into(),
            PlaceholderKind::HomeTeleport => "Home Teleport".into(),
            PlaceholderKind::FairyRing => "Fairy Ring".into(),
            PlaceholderKind::Other(s) if s.is_empty() => "Custom".into(),
            PlaceholderKind::Other(s) => {
                let mut chars = s.chars();
                match chars.next() {
                    Some(first) => {
                        let rest: String = chars.collect();
                        format!("{}{}", first.to_uppercase(), rest.replace('_', " "))
                    }
                    None => "Custom".into(),
                }
            }
        }
    }
}

impl Default for PlaceholderKind {
    fn default() -> Self {
        PlaceholderKind::Other(String::new())
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-task waypoint (bank trip, teleport, ...) with its own identity
/// and completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    #[serde(default)]
    pub id: String,
    #[serde(
        rename = "type",
        default,
        with = "kind_serde",
        skip_serializing_if = "is_absent_kind"
    )]
    pub kind: PlaceholderKind,
}

impl Placeholder {
    /// Create a placeholder with a freshly generated 8-character id.
    pub fn new(kind: PlaceholderKind) -> Self {
        Placeholder {
            id: generate_placeholder_id(),
            kind,
        }
    }

    pub fn display_name(&self) -> String {
        self.kind.display_name()
    }
}

/// Short random token: the first 8 hex digits of a v4 UUID.
pub fn generate_placeholder_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn is_absent_kind(kind: &PlaceholderKind) -> bool {
    matches!(kind, PlaceholderKind::Other(s) if s.is_empty())
}

mod kind_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::PlaceholderKind;

    pub fn serialize<S: Serializer>(kind: &PlaceholderKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(kind.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PlaceholderKind, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw
            .map(|s| PlaceholderKind::parse_kind(&s))
            .unwrap_or_default())
    }
}

/// One entry of a section: a catalog task or a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Task(i32),
    Placeholder(Placeholder),
}

impl Item {
    pub fn is_task(&self) -> bool {
        matches!(self, Item::Task(_))
    }

    pub fn task_id(&self) -> Option<i32> {
        match self {
            Item::Task(id) => Some(*id),
            Item::Placeholder(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Item::Task(_) => None,
            Item::Placeholder(p) => Some(p),
        }
    }

    /// Stable key for this item (`task:<id>` or `custom:<id>`).
    pub fn item_key(&self) -> String {
        match self {
            Item::Task(id) => format!("task:{}", id),
            Item::Placeholder(p) => format!("custom:{}", p.id),
        }
    }
}

/// A named, ordered grouping of items within a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SectionJson", into = "SectionJson")]
pub struct Section {
    pub name: Option<String>,
    pub description: Option<String>,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(name: &str, items: Vec<Item>) -> Self {
        Section {
            name: Some(name.to_string()),
            description: None,
            items,
        }
    }

    /// Key used for headers and collapse state; unnamed sections share "Section".
    pub fn key(&self) -> &str {
        match self.name.as_deref() {
            Some(name) => name,
            None => "Section",
        }
    }
}

/// A user-defined ordered checklist, scoped to a tab and catalog type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RouteJson", into = "RouteJson")]
pub struct Route {
    pub name: String,
    pub task_type: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub sections: Vec<Section>,
}

impl Route {
    pub fn new(name: &str, task_type: &str, sections: Vec<Section>) -> Self {
        Route {
            name: name.to_string(),
            task_type: task_type.to_string(),
            author: None,
            description: None,
            sections,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire encoding
// ---------------------------------------------------------------------------

/// Route as stored: `{name, taskType, author?, description?, sections}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<SectionJson>>,
}

/// Section as stored. `taskIds` is the legacy flat form; `items` wins
/// whenever it is non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ids: Option<Vec<Option<i32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemJson>>,
}

/// Item as stored: exactly one of `taskId` / `customItem` is meaningful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_item: Option<Placeholder>,
}

/// Upgrade a stored section to the canonical item sequence.
///
/// A non-empty `items` list is authoritative. Otherwise the legacy
/// `taskIds` list is converted, dropping null entries. Items carrying
/// neither a task id nor a placeholder are dropped.
pub fn upgrade_section(json: SectionJson) -> Section {
    let items = match json.items {
        Some(items) if !items.is_empty() => items
            .into_iter()
            .filter_map(|item| match (item.task_id, item.custom_item) {
                (Some(id), _) => Some(Item::Task(id)),
                (None, Some(p)) => Some(Item::Placeholder(p)),
                (None, None) => None,
            })
            .collect(),
        _ => json
            .task_ids
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(Item::Task)
            .collect(),
    };
    Section {
        name: json.name,
        description: json.description,
        items,
    }
}

impl From<SectionJson> for Section {
    fn from(json: SectionJson) -> Self {
        upgrade_section(json)
    }
}

impl From<Section> for SectionJson {
    fn from(section: Section) -> Self {
        let items = section
            .items
            .into_iter()
            .map(|item| match item {
                Item::Task(id) => ItemJson {
                    task_id: Some(id),
                    custom_item: None,
                },
                Item::Placeholder(p) => ItemJson {
                    task_id: None,
                    custom_item: Some(p),
                },
            })
            .collect();
        SectionJson {
            name: section.name,
            description: section.description,
            task_ids: None,
            items: Some(items),
        }
    }
}

impl From<RouteJson> for Route {
    fn from(json: RouteJson) -> Self {
        Route {
            name: json.name.unwrap_or_default(),
            task_type: json.task_type.unwrap_or_default(),
            author: json.author,
            description: json.description,
            sections: json
                .sections
                .unwrap_or_default()
                .into_iter()
                .map(upgrade_section)
                .collect(),
        }
    }
}

impl From<Route> for RouteJson {
    fn from(route: Route) -> Self {
        RouteJson {
            name: Some(route.name),
            task_type: Some(route.task_type),
            author: route.author,
            description: route.description,
            sections: Some(route.sections.into_iter().map(SectionJson::from).collect()),
        }
    }
}
