//! Lookup tables over a committed config
//!
//! Built once per config revision and borrowed by the selection, filter and
//! palette views.

use crate::tree::types::{
    DashboardConfig, Group, LayoutBlock, Subgroup, GROUP_KEY_PREFIX, SUBGROUP_KEY_PREFIX,
};
use std::collections::{HashMap, HashSet};

/// Id → entity maps for one config
#[derive(Debug, Default)]
pub struct TreeIndex<'a> {
    group_by_id: HashMap<&'a str, &'a Group>,
    subgroup_by_id: HashMap<&'a str, (&'a Group, &'a Subgroup)>,
    page_by_block_group_id: HashMap<&'a str, &'a str>,
    page_ids: HashSet<&'a str>,
}

impl<'a> TreeIndex<'a> {
    /// Index every group, subgroup and groups-block reference
    ///
    /// For a reference used on several pages the first page wins.
    pub fn build(config: &'a DashboardConfig) -> Self {
        let mut index = Self::default();

        for group in &config.groups {
            if !group.id.is_empty() {
                index.group_by_id.insert(group.id.as_str(), group);
            }
            for subgroup in &group.subgroups {
                if !subgroup.id.is_empty() {
                    index.subgroup_by_id.insert(subgroup.id.as_str(), (group, subgroup));
                }
            }
        }

        for page in &config.layout.pages {
            index.page_ids.insert(page.id.as_str());
            for block in &page.blocks {
                let LayoutBlock::Groups { group_ids, .. } = block else {
                    continue;
                };
                for id in group_ids {
                    let id = id.trim();
                    if !id.is_empty() {
                        index.page_by_block_group_id.entry(id).or_insert(page.id.as_str());
                    }
                }
            }
        }

        index
    }

    pub fn group(&self, group_id: &str) -> Option<&'a Group> {
        self.group_by_id.get(group_id).copied()
    }

    /// Subgroup and its owning group
    pub fn subgroup(&self, subgroup_id: &str) -> Option<(&'a Group, &'a Subgroup)> {
        self.subgroup_by_id.get(subgroup_id).copied()
    }

    /// First page whose groups blocks reference `id`
    pub fn page_for_block_ref(&self, id: &str) -> Option<&'a str> {
        self.page_by_block_group_id.get(id).copied()
    }

    pub fn has_page(&self, page_id: &str) -> bool {
        self.page_ids.contains(page_id)
    }

    /// Group behind a `group:<id>` node key
    pub fn group_for_node_key(&self, key: &str) -> Option<&'a Group> {
        key.strip_prefix(GROUP_KEY_PREFIX).and_then(|id| self.group(id))
    }

    /// Page that renders the node identified by a tree group key
    ///
    /// `group:<id>` looks the group up directly. `subgroup:<id>` prefers the
    /// page of the owning group, then a page referencing the subgroup itself.
    pub fn page_for_group_key(&self, key: &str) -> Option<&'a str> {
        if let Some(group_id) = key.strip_prefix(GROUP_KEY_PREFIX) {
            return self.page_for_block_ref(group_id);
        }

        let subgroup_id = key.strip_prefix(SUBGROUP_KEY_PREFIX)?;
        match self.subgroup(subgroup_id) {
            Some((group, _)) => self
                .page_for_block_ref(&group.id)
                .or_else(|| self.page_for_block_ref(subgroup_id)),
            None => self.page_for_block_ref(subgroup_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::types::{LayoutPage, Subgroup};

    fn config() -> DashboardConfig {
        let mut config = DashboardConfig {
            groups: vec![
                Group::new("infra", "Infra").subgroup(Subgroup::new("infra-core", "Core")),
                Group::new("media", "Media")
                    .subgroup(Subgroup::new("media-main", "Main"))
                    .subgroup(Subgroup::new("media-extra", "Extra")),
            ],
            ..Default::default()
        };
        config.layout.pages = vec![
            LayoutPage::new("home", "Home").block(LayoutBlock::groups(["infra", "media-extra"])),
            LayoutPage::new("media", "Media").block(LayoutBlock::groups(["media", " infra "])),
        ];
        config
    }

    #[test]
    fn test_lookups() {
        let config = config();
        let index = TreeIndex::build(&config);

        assert_eq!(index.group("media").map(|g| g.title.as_str()), Some("Media"));
        let (group, subgroup) = index.subgroup("media-extra").unwrap();
        assert_eq!((group.id.as_str(), subgroup.id.as_str()), ("media", "media-extra"));
        assert!(index.has_page("media"));
        assert!(!index.has_page("ops"));
        assert!(index.group_for_node_key("group:infra").is_some());
        assert!(index.group_for_node_key("subgroup:infra").is_none());
    }

    #[test]
    fn test_first_page_wins() {
        let config = config();
        let index = TreeIndex::build(&config);
        assert_eq!(index.page_for_block_ref("infra"), Some("home"));
        assert_eq!(index.page_for_block_ref("media"), Some("media"));
    }

    #[test]
    fn test_page_for_group_key() {
        let config = config();
        let index = TreeIndex::build(&config);

        assert_eq!(index.page_for_group_key("group:media"), Some("media"));
        // owning group's page beats the page referencing the subgroup
        assert_eq!(index.page_for_group_key("subgroup:media-extra"), Some("media"));
        assert_eq!(index.page_for_group_key("subgroup:ghost"), None);
        assert_eq!(index.page_for_group_key("media"), None);
        assert_eq!(index.page_for_group_key(""), None);
    }
}
