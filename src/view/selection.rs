//! Tree selection and expansion state

use crate::tree::types::DashboardConfig;
use crate::view::index::TreeIndex;
use crate::view::tree::TreeGroupNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Currently selected node of the navigation tree
///
/// Empty strings mean "nothing selected" at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedNode {
    pub group_key: String,
    pub subgroup_id: String,
    pub item_id: String,
}

impl SelectedNode {
    pub fn group(group_key: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            ..Default::default()
        }
    }

    pub fn subgroup(group_key: impl Into<String>, subgroup_id: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            subgroup_id: subgroup_id.into(),
            ..Default::default()
        }
    }

    pub fn item(group_key: impl Into<String>, subgroup_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            subgroup_id: subgroup_id.into(),
            item_id: item_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_key.is_empty() && self.subgroup_id.is_empty() && self.item_id.is_empty()
    }
}

/// Navigation state: active page, expanded nodes and selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeState {
    pub active_page_id: String,
    pub expanded_groups: BTreeMap<String, bool>,
    pub selected: SelectedNode,
}

impl TreeState {
    /// Existing page rendering `group_key`
    pub fn resolve_page_for_group_key<'a>(&self, index: &TreeIndex<'a>, group_key: &str) -> Option<&'a str> {
        index
            .page_for_group_key(group_key)
            .filter(|page_id| index.has_page(page_id))
    }

    /// Switch to the page rendering `group_key`, if that page exists
    pub fn activate_page_for_group_key(&mut self, index: &TreeIndex<'_>, group_key: &str) -> bool {
        match self.resolve_page_for_group_key(index, group_key) {
            Some(page_id) => {
                self.active_page_id = page_id.to_string();
                true
            }
            None => false,
        }
    }

    /// Flip a group node's expansion and select it
    pub fn toggle_group_node(&mut self, index: &TreeIndex<'_>, group_key: &str) {
        self.activate_page_for_group_key(index, group_key);
        let expanded = self.is_group_expanded(group_key);
        self.expanded_groups.insert(group_key.to_string(), !expanded);
        self.selected = SelectedNode::group(group_key);
    }

    /// Select a subgroup, expanding its group node
    pub fn select_subgroup_node(&mut self, index: &TreeIndex<'_>, group_key: &str, subgroup_id: &str) {
        self.activate_page_for_group_key(index, group_key);
        self.expanded_groups.insert(group_key.to_string(), true);
        self.selected = SelectedNode::subgroup(group_key, subgroup_id);
    }

    /// Select an item, expanding its group node
    pub fn select_item_node(&mut self, index: &TreeIndex<'_>, group_key: &str, subgroup_id: &str, item_id: &str) {
        self.activate_page_for_group_key(index, group_key);
        self.expanded_groups.insert(group_key.to_string(), true);
        self.selected = SelectedNode::item(group_key, subgroup_id, item_id);
    }

    pub fn is_group_expanded(&self, group_key: &str) -> bool {
        self.expanded_groups.get(group_key).copied().unwrap_or(false)
    }

    /// The group node itself is selected (not one of its children)
    pub fn is_group_selected(&self, group_key: &str) -> bool {
        self.selected.group_key == group_key && self.selected.subgroup_id.is_empty() && self.selected.item_id.is_empty()
    }

    pub fn is_subgroup_selected(&self, group_key: &str, subgroup_id: &str) -> bool {
        self.selected.group_key == group_key
            && self.selected.subgroup_id == subgroup_id
            && self.selected.item_id.is_empty()
    }

    pub fn is_item_selected(&self, item_id: &str) -> bool {
        self.selected.item_id == item_id
    }

    pub fn clear_selected_node(&mut self) {
        self.selected = SelectedNode::default();
    }

    /// Reconcile expansion and selection with the current tree nodes
    ///
    /// Stale keys are dropped, new keys start expanded and a selection whose
    /// group node disappeared is cleared.
    pub fn sync_tree_groups(&mut self, tree_groups: &[TreeGroupNode]) {
        let active: HashSet<&str> = tree_groups.iter().map(|node| node.key.as_str()).collect();

        self.expanded_groups.retain(|key, _| active.contains(key.as_str()));
        for node in tree_groups {
            self.expanded_groups.entry(node.key.clone()).or_insert(true);
        }

        if !self.selected.group_key.is_empty() && !active.contains(self.selected.group_key.as_str()) {
            self.clear_selected_node();
        }
    }

    /// Point the active page at an existing page (first page as fallback)
    ///
    /// Returns true when the active page changed.
    pub fn ensure_active_page(&mut self, config: &DashboardConfig) -> bool {
        if !self.active_page_id.is_empty() && config.page(&self.active_page_id).is_some() {
            return false;
        }

        let next = config.layout.pages.first().map(|page| page.id.clone()).unwrap_or_default();
        let changed = next != self.active_page_id;
        self.active_page_id = next;
        changed
    }
}
