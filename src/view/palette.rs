//! Command palette search
//!
//! Every item of the config becomes a searchable entry, next to a few
//! built-in actions. Queries are split into whitespace tokens; an entry
//! matches when all tokens occur in its search blob and is ranked by where
//! the tokens hit.

use crate::tree::types::DashboardConfig;
use crate::view::index::TreeIndex;
use crate::view::selection::TreeState;
use crate::view::tree::{resolve_item_site, safe_url_host, SITE_FILTER_ALL};
use serde::Serialize;
use std::cmp::Ordering;

/// Result limit for a non-empty query
pub const COMMAND_PALETTE_LIMIT: usize = 18;

/// Result limit for an empty query
pub const COMMAND_PALETTE_EMPTY_LIMIT: usize = 10;

const SCORE_TITLE_PREFIX: u32 = 12;
const SCORE_TITLE_CONTAINS: u32 = 8;
const SCORE_HOST_PREFIX: u32 = 7;
const SCORE_HOST_CONTAINS: u32 = 4;
const SCORE_SITE: u32 = 5;
const SCORE_TAG: u32 = 3;

/// Built-in palette commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteAction {
    OpenSettingsPanel,
    OpenPluginPanel,
}

/// What activating an entry does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaletteTarget {
    Action { action: PaletteAction },
    Item {
        group_id: String,
        group_key: String,
        subgroup_id: String,
        item_id: String,
        url: String,
        /// Page rendering the item's group or subgroup
        page_id: Option<String>,
    },
}

/// One searchable palette row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub id: String,
    pub title: String,
    pub group_title: String,
    pub subgroup_title: String,
    pub target: PaletteTarget,

    #[serde(skip)]
    title_lower: String,
    #[serde(skip)]
    host: String,
    #[serde(skip)]
    site: String,
    #[serde(skip)]
    tags_lower: Vec<String>,
    #[serde(skip)]
    search_blob: String,
}

impl PaletteEntry {
    fn action(action: PaletteAction, title: &str, section: &str, keywords: &str) -> Self {
        Self {
            id: match action {
                PaletteAction::OpenSettingsPanel => "action:open-settings-panel".to_string(),
                PaletteAction::OpenPluginPanel => "action:open-plugin-panel".to_string(),
            },
            title: title.to_string(),
            group_title: "Command".to_string(),
            subgroup_title: section.to_string(),
            target: PaletteTarget::Action { action },
            title_lower: title.to_lowercase(),
            host: String::new(),
            site: String::new(),
            tags_lower: Vec::new(),
            search_blob: format!("{} {}", title, keywords).to_lowercase(),
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self.target, PaletteTarget::Action { .. })
    }

    fn score(&self, tokens: &[&str]) -> Option<u32> {
        let mut score = 0;
        for token in tokens {
            if !self.search_blob.contains(token) {
                return None;
            }

            if self.title_lower.starts_with(token) {
                score += SCORE_TITLE_PREFIX;
            } else if self.title_lower.contains(token) {
                score += SCORE_TITLE_CONTAINS;
            }
            if self.host.starts_with(token) {
                score += SCORE_HOST_PREFIX;
            } else if self.host.contains(token) {
                score += SCORE_HOST_CONTAINS;
            }
            if !self.site.is_empty() && self.site.contains(token) {
                score += SCORE_SITE;
            }
            if self.tags_lower.iter().any(|tag| tag.contains(token)) {
                score += SCORE_TAG;
            }
        }
        Some(score)
    }
}

fn by_title(left: &PaletteEntry, right: &PaletteEntry) -> Ordering {
    left.title_lower.cmp(&right.title_lower)
}

/// Build palette entries: built-in actions first, then every item that
/// passes the site filter
pub fn command_palette_entries(config: &DashboardConfig, index: &TreeIndex<'_>, site_filter: &str) -> Vec<PaletteEntry> {
    let mut entries = vec![
        PaletteEntry::action(
            PaletteAction::OpenSettingsPanel,
            "Open settings panel",
            "Interface",
            "settings ui interface control panel preferences filters",
        ),
        PaletteEntry::action(
            PaletteAction::OpenPluginPanel,
            "Open plugin panel",
            "Plugins",
            "plugins plugin store extensions",
        ),
    ];

    let filter_sites = !site_filter.is_empty() && site_filter != SITE_FILTER_ALL;

    for (group, subgroup, item) in config.items() {
        let site = resolve_item_site(item, group.site.as_deref());
        if filter_sites && site.to_lowercase() != site_filter {
            continue;
        }

        let host = safe_url_host(&item.url);
        let tags = item.normalized_tags();
        let title = item.title.trim().to_string();
        let page_id = index
            .page_for_block_ref(&group.id)
            .or_else(|| index.page_for_block_ref(&subgroup.id))
            .map(str::to_string);

        let mut blob_parts = vec![
            title.as_str(),
            item.id.as_str(),
            item.url.as_str(),
            host.as_str(),
            site.as_str(),
            group.title.as_str(),
            subgroup.title.as_str(),
        ];
        blob_parts.extend(tags.iter().map(String::as_str));
        let search_blob = blob_parts.join(" ").to_lowercase();

        entries.push(PaletteEntry {
            id: item.id.clone(),
            title_lower: title.to_lowercase(),
            title,
            group_title: group.title.clone(),
            subgroup_title: subgroup.title.clone(),
            target: PaletteTarget::Item {
                group_id: group.id.clone(),
                group_key: group.node_key(),
                subgroup_id: subgroup.id.clone(),
                item_id: item.id.clone(),
                url: item.url.clone(),
                page_id,
            },
            host: host.to_lowercase(),
            site: site.to_lowercase(),
            tags_lower: tags.iter().map(|tag| tag.to_lowercase()).collect(),
            search_blob,
        });
    }

    entries
}

/// Rank entries against a query
///
/// Empty query: actions, then items by title, at most
/// [`COMMAND_PALETTE_EMPTY_LIMIT`]. Otherwise matching entries by score, ties
/// by title, at most [`COMMAND_PALETTE_LIMIT`].
pub fn search_command_palette<'a>(entries: &'a [PaletteEntry], query: &str) -> Vec<&'a PaletteEntry> {
    let query = query.trim().to_lowercase();

    if query.is_empty() {
        let mut items: Vec<&PaletteEntry> = entries.iter().filter(|e| !e.is_action()).collect();
        items.sort_by(|l, r| by_title(l, r));
        return entries
            .iter()
            .filter(|e| e.is_action())
            .chain(items)
            .take(COMMAND_PALETTE_EMPTY_LIMIT)
            .collect();
    }

    let tokens: Vec<&str> = query.split_whitespace().collect();
    let mut scored: Vec<(u32, &PaletteEntry)> = entries
        .iter()
        .filter_map(|entry| entry.score(&tokens).map(|score| (score, entry)))
        .collect();

    scored.sort_by(|(ls, l), (rs, r)| rs.cmp(ls).then_with(|| by_title(l, r)));
    scored
        .into_iter()
        .take(COMMAND_PALETTE_LIMIT)
        .map(|(_, entry)| entry)
        .collect()
}

/// Focus an item entry in the tree: switch to its page and select it
///
/// Returns false for action entries.
pub fn focus_entry(state: &mut TreeState, index: &TreeIndex<'_>, entry: &PaletteEntry) -> bool {
    let PaletteTarget::Item {
        group_key,
        subgroup_id,
        item_id,
        page_id,
        ..
    } = &entry.target
    else {
        return false;
    };

    if let Some(page_id) = page_id {
        state.active_page_id = page_id.clone();
    }
    state.select_item_node(index, group_key, subgroup_id, item_id);
    true
}
