//! Core data types for the dashboard configuration tree
//!
//! This module defines the documents exchanged with the config service:
//! - `DashboardConfig`: the root aggregate (groups, layout, ui)
//! - `Group` / `Subgroup` / `Item`: the service tree
//! - `LayoutPage` / `LayoutBlock`: dashboard pages and their visual blocks
//!
//! Every entity keeps unknown JSON fields in an `extra` map so a load/save
//! round trip never loses data this crate does not model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node key prefix for a directly rendered group
pub const GROUP_KEY_PREFIX: &str = "group:";

/// Node key prefix for a subgroup rendered on its own
pub const SUBGROUP_KEY_PREFIX: &str = "subgroup:";

/// Root dashboard configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub groups: Vec<Group>,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub ui: UiConfig,

    /// Fields owned by other parts of the product (app, widgets, security, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardConfig {
    /// Parse a config document from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// All layout pages in declaration order
    pub fn pages(&self) -> &[LayoutPage] {
        &self.layout.pages
    }

    /// Find a layout page by id
    pub fn page(&self, page_id: &str) -> Option<&LayoutPage> {
        self.layout.pages.iter().find(|page| page.id == page_id)
    }

    /// Iterate over every item together with its owning group and subgroup
    pub fn items(&self) -> impl Iterator<Item = (&Group, &Subgroup, &Item)> {
        self.groups.iter().flat_map(|group| {
            group.subgroups.iter().flat_map(move |subgroup| {
                subgroup.items.iter().map(move |item| (group, subgroup, item))
            })
        })
    }
}

/// A top-level group of services
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: String,

    /// Node key; `group:` prefixed keys mark a direct group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Rendering mode: auto, full or inline
    #[serde(default = "default_group_layout")]
    pub layout: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    #[serde(default)]
    pub subgroups: Vec<Subgroup>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_group_layout() -> String {
    "auto".to_string()
}

impl Group {
    /// Create an empty group
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            layout: default_group_layout(),
            ..Default::default()
        }
    }

    /// Builder method: add a subgroup
    pub fn subgroup(mut self, subgroup: Subgroup) -> Self {
        self.subgroups.push(subgroup);
        self
    }

    /// Builder method: set the node key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Builder method: set the site label
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Node key used by the navigation tree (`group:<id>`)
    pub fn node_key(&self) -> String {
        format!("{}{}", GROUP_KEY_PREFIX, self.id)
    }
}

/// A named bucket of items inside a group
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subgroup {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subgroup {
    /// Create an empty subgroup
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder method: add an item
    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Node key used by the navigation tree (`subgroup:<id>`)
    pub fn node_key(&self) -> String {
        format!("{}{}", SUBGROUP_KEY_PREFIX, self.id)
    }
}

/// How a service card is presented
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Link,
    Iframe,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Link => write!(f, "link"),
            ItemType::Iframe => write!(f, "iframe"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "link" => Ok(ItemType::Link),
            "iframe" => Ok(ItemType::Iframe),
            other => Err(format!("unknown item type: {}", other)),
        }
    }
}

/// Where a link opens
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    #[default]
    NewTab,
    SameTab,
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenMode::NewTab => write!(f, "new_tab"),
            OpenMode::SameTab => write!(f, "same_tab"),
        }
    }
}

impl std::str::FromStr for OpenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "new_tab" => Ok(OpenMode::NewTab),
            "same_tab" => Ok(OpenMode::SameTab),
            other => Err(format!("unknown open mode: {}", other)),
        }
    }
}

/// A single service card
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(rename = "type", default)]
    pub kind: ItemType,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub open: OpenMode,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_blocks: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_health: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create a link item
    pub fn link(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder method: set the site label
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Tags with surrounding whitespace removed and blanks dropped
    pub fn normalized_tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Layout section of the config
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    #[serde(default)]
    pub pages: Vec<LayoutPage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dashboard page (tab)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutPage {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutPage {
    /// Create an empty page
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a block
    pub fn block(mut self, block: LayoutBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

/// One visual unit of a layout page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutBlock {
    /// References to groups or subgroups by id
    Groups {
        #[serde(default)]
        group_ids: Vec<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A single row of widgets
    WidgetRow {
        #[serde(default)]
        widgets: Vec<WidgetRef>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A grid of widgets
    WidgetGrid {
        #[serde(default)]
        widgets: Vec<WidgetRef>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl LayoutBlock {
    /// Create a groups block
    pub fn groups<I, S>(group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LayoutBlock::Groups {
            group_ids: group_ids.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }

    /// Create a widget row block
    pub fn widget_row<I, S>(widget_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LayoutBlock::WidgetRow {
            widgets: widget_ids
                .into_iter()
                .map(|id| WidgetRef::Id(id.into()))
                .collect(),
            extra: Map::new(),
        }
    }

    /// Wire name of the block type
    pub fn type_name(&self) -> &'static str {
        match self {
            LayoutBlock::Groups { .. } => "groups",
            LayoutBlock::WidgetRow { .. } => "widget_row",
            LayoutBlock::WidgetGrid { .. } => "widget_grid",
        }
    }

    /// Group references if this is a groups block
    pub fn group_ids(&self) -> Option<&[String]> {
        match self {
            LayoutBlock::Groups { group_ids, .. } => Some(group_ids),
            _ => None,
        }
    }

    /// Widgets if this is a widget block
    pub fn widgets(&self) -> Option<&[WidgetRef]> {
        match self {
            LayoutBlock::WidgetRow { widgets, .. } | LayoutBlock::WidgetGrid { widgets, .. } => {
                Some(widgets)
            }
            LayoutBlock::Groups { .. } => None,
        }
    }
}

/// A widget placed in a block: either a widget id or an inline definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WidgetRef {
    Id(String),
    Inline(Map<String, Value>),
}

impl WidgetRef {
    /// The widget id, when one is available
    pub fn id(&self) -> Option<&str> {
        match self {
            WidgetRef::Id(id) => Some(id),
            WidgetRef::Inline(map) => map.get("id").and_then(Value::as_str),
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
