//! Layout-block normalizer
//!
//! Reconciles layout pages against the live group/subgroup set. A page that
//! ends up with no blocks stays empty; no default block is synthesized.

use crate::tree::ids::{all_group_ids, all_subgroup_ids};
use crate::tree::types::{DashboardConfig, LayoutBlock, LayoutPage};
use std::collections::HashSet;

/// Prune dangling group references and empty blocks from every page
///
/// Surviving blocks keep their relative order.
pub fn normalize_layout_blocks(config: &mut DashboardConfig) {
    let mut valid_refs = all_group_ids(config);
    valid_refs.extend(all_subgroup_ids(config));

    let mut pruned_blocks = 0usize;

    for page in &mut config.layout.pages {
        let before = page.blocks.len();

        page.blocks.retain_mut(|block| match block {
            LayoutBlock::Groups { group_ids, .. } => {
                let kept: Vec<String> = group_ids
                    .iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty() && valid_refs.contains(*id))
                    .map(str::to_string)
                    .collect();
                *group_ids = kept;
                !group_ids.is_empty()
            }
            LayoutBlock::WidgetRow { widgets, .. } | LayoutBlock::WidgetGrid { widgets, .. } => {
                !widgets.is_empty()
            }
        });

        pruned_blocks += before - page.blocks.len();
    }

    if pruned_blocks > 0 {
        tracing::debug!(pruned_blocks, "Removed empty layout blocks");
    }
}

/// Make sure a page has a groups block referencing `group_id`
///
/// Falls back to the first page when `page_id` is unknown; does nothing when
/// there are no pages or `group_id` is blank.
pub fn ensure_page_groups_reference(config: &mut DashboardConfig, page_id: &str, group_id: &str) {
    let group_id = group_id.trim();
    if group_id.is_empty() || config.layout.pages.is_empty() {
        return;
    }

    let page_id = page_id.trim();
    let index = config
        .layout
        .pages
        .iter()
        .position(|page| page.id.trim() == page_id)
        .unwrap_or(0);
    let page = &mut config.layout.pages[index];

    let existing = page.blocks.iter_mut().find_map(|block| match block {
        LayoutBlock::Groups { group_ids, .. } => Some(group_ids),
        _ => None,
    });

    match existing {
        Some(group_ids) => {
            if !group_ids.iter().any(|id| id.trim() == group_id) {
                group_ids.push(group_id.to_string());
            }
        }
        None => page.blocks.push(LayoutBlock::groups([group_id])),
    }
}

/// De-duplicated group references of a page, in block order
pub fn page_group_refs(page: &LayoutPage) -> Vec<String> {
    let mut seen = HashSet::new();
    page.blocks
        .iter()
        .filter_map(LayoutBlock::group_ids)
        .flatten()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::types::{Group, Subgroup, WidgetRef};
    use serde_json::Map;

    fn config_with_pages(pages: Vec<LayoutPage>) -> DashboardConfig {
        let mut config = DashboardConfig {
            groups: vec![
                Group::new("a", "A").subgroup(Subgroup::new("s1", "S1")),
                Group::new("b", "B").subgroup(Subgroup::new("s2", "S2")),
            ],
            ..Default::default()
        };
        config.layout.pages = pages;
        config
    }

    #[test]
    fn test_ghost_reference_block_removed() {
        let mut config = config_with_pages(vec![LayoutPage::new("home", "Home")
            .block(LayoutBlock::groups(["ghost"]))
            .block(LayoutBlock::groups(["a", "ghost", "s2"]))]);

        normalize_layout_blocks(&mut config);

        let blocks = &config.layout.pages[0].blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].group_ids().unwrap(), ["a".to_string(), "s2".to_string()]);
    }

    #[test]
    fn test_empty_widget_blocks_removed_and_order_kept() {
        let mut config = config_with_pages(vec![LayoutPage::new("home", "Home")
            .block(LayoutBlock::widget_row(["cpu"]))
            .block(LayoutBlock::WidgetGrid {
                widgets: Vec::<WidgetRef>::new(),
                extra: Map::new(),
            })
            .block(LayoutBlock::groups(["b"]))]);

        normalize_layout_blocks(&mut config);

        let types: Vec<_> = config.layout.pages[0]
            .blocks
            .iter()
            .map(LayoutBlock::type_name)
            .collect();
        assert_eq!(types, vec!["widget_row", "groups"]);
    }

    #[test]
    fn test_page_left_empty_without_fallback() {
        let mut config = config_with_pages(vec![
            LayoutPage::new("home", "Home").block(LayoutBlock::groups(["ghost"]))
        ]);

        normalize_layout_blocks(&mut config);

        assert!(config.layout.pages[0].blocks.is_empty());
    }

    #[test]
    fn test_all_references_resolve_after_normalize() {
        let mut config = config_with_pages(vec![
            LayoutPage::new("one", "One").block(LayoutBlock::groups([" a ", "", "x", "s1"])),
            LayoutPage::new("two", "Two").block(LayoutBlock::groups(["y"])),
        ]);

        normalize_layout_blocks(&mut config);

        let mut valid = all_group_ids(&config);
        valid.extend(all_subgroup_ids(&config));
        for page in &config.layout.pages {
            for block in &page.blocks {
                let ids = block.group_ids().unwrap();
                assert!(!ids.is_empty());
                assert!(ids.iter().all(|id| valid.contains(id)));
            }
        }
    }

    #[test]
    fn test_ensure_reference_appends_once() {
        let mut config = config_with_pages(vec![
            LayoutPage::new("home", "Home").block(LayoutBlock::groups(["a"]))
        ]);

        ensure_page_groups_reference(&mut config, "home", "b");
        ensure_page_groups_reference(&mut config, "home", "b");

        assert_eq!(
            config.layout.pages[0].blocks[0].group_ids().unwrap(),
            ["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_ensure_reference_creates_block_on_first_page() {
        let mut config = config_with_pages(vec![
            LayoutPage::new("home", "Home").block(LayoutBlock::widget_row(["cpu"])),
            LayoutPage::new("other", "Other"),
        ]);

        ensure_page_groups_reference(&mut config, "missing", "a");

        let blocks = &config.layout.pages[0].blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].group_ids().unwrap(), ["a".to_string()]);
        assert!(config.layout.pages[1].blocks.is_empty());
    }

    #[test]
    fn test_ensure_reference_without_pages_is_noop() {
        let mut config = config_with_pages(Vec::new());
        ensure_page_groups_reference(&mut config, "home", "a");
        assert!(config.layout.pages.is_empty());
    }

    #[test]
    fn test_page_group_refs_dedup() {
        let page = LayoutPage::new("home", "Home")
            .block(LayoutBlock::groups(["a", "b"]))
            .block(LayoutBlock::widget_row(["cpu"]))
            .block(LayoutBlock::groups(["b", "s1"]));
        assert_eq!(page_group_refs(&page), vec!["a", "b", "s1"]);
    }
}
