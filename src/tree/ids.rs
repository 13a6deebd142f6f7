//! Tree-ID utilities
//!
//! Id normalization, uniqueness and lookup helpers shared by the layout
//! normalizer, the move engine and the CRUD helpers.

use crate::tree::types::{DashboardConfig, Group, Subgroup, GROUP_KEY_PREFIX};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Fallback used when an id normalizes to nothing
pub const DEFAULT_ID_FALLBACK: &str = "node";

fn separator_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"))
}

/// Normalize a free-form value into an id slug
///
/// Lower-cases, replaces every run of characters outside `[a-z0-9]` with a
/// single `-` and strips one leading/trailing `-`. Returns `fallback` when
/// nothing is left.
pub fn normalize_id(value: &str, fallback: &str) -> String {
    let lowered = value.to_lowercase();
    let dashed = separator_run().replace_all(&lowered, "-");
    let trimmed = dashed.strip_prefix('-').unwrap_or(&dashed);
    let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalize `base` and suffix it with `-2`, `-3`, ... until it is unused
pub fn make_unique_id(base: &str, existing: &HashSet<String>) -> String {
    let normalized = normalize_id(base, DEFAULT_ID_FALLBACK);
    let mut candidate = normalized.clone();
    let mut index = 2;

    while existing.contains(&candidate) {
        candidate = format!("{}-{}", normalized, index);
        index += 1;
    }

    candidate
}

/// Ids of all top-level groups
pub fn all_group_ids(config: &DashboardConfig) -> HashSet<String> {
    config
        .groups
        .iter()
        .map(|group| group.id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ids of every subgroup in the config (one global namespace)
pub fn all_subgroup_ids(config: &DashboardConfig) -> HashSet<String> {
    config
        .groups
        .iter()
        .flat_map(|group| group.subgroups.iter())
        .map(|subgroup| subgroup.id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ids of every item in the config
pub fn all_item_ids(config: &DashboardConfig) -> HashSet<String> {
    config
        .items()
        .map(|(_, _, item)| item.id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Find a group by id
pub fn find_group<'a>(config: &'a DashboardConfig, group_id: &str) -> Option<&'a Group> {
    config.groups.iter().find(|group| group.id == group_id)
}

/// Find a group by id, mutably
pub fn find_group_mut<'a>(config: &'a mut DashboardConfig, group_id: &str) -> Option<&'a mut Group> {
    config.groups.iter_mut().find(|group| group.id == group_id)
}

/// Find a subgroup inside a specific group
pub fn find_subgroup<'a>(
    config: &'a DashboardConfig,
    group_id: &str,
    subgroup_id: &str,
) -> Option<&'a Subgroup> {
    find_group(config, group_id)?
        .subgroups
        .iter()
        .find(|subgroup| subgroup.id == subgroup_id)
}

/// Find a subgroup inside a specific group, mutably
pub fn find_subgroup_mut<'a>(
    config: &'a mut DashboardConfig,
    group_id: &str,
    subgroup_id: &str,
) -> Option<&'a mut Subgroup> {
    find_group_mut(config, group_id)?
        .subgroups
        .iter_mut()
        .find(|subgroup| subgroup.id == subgroup_id)
}

/// Whether a node key denotes a directly rendered group
pub fn is_direct_group_node(key: Option<&str>) -> bool {
    key.map(|k| k.starts_with(GROUP_KEY_PREFIX)).unwrap_or(false)
}

/// Ids that appear more than once where uniqueness is required
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIds {
    pub groups: BTreeSet<String>,
    pub subgroups: BTreeSet<String>,
    pub items: BTreeSet<String>,
}

impl DuplicateIds {
    /// True when no duplicates were found
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.subgroups.is_empty() && self.items.is_empty()
    }
}

/// Report duplicated group, subgroup and item ids
pub fn duplicate_ids(config: &DashboardConfig) -> DuplicateIds {
    fn collect<'a>(ids: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
        let mut seen = HashSet::new();
        ids.filter(|id| !seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    DuplicateIds {
        groups: collect(config.groups.iter().map(|group| group.id.as_str())),
        subgroups: collect(
            config
                .groups
                .iter()
                .flat_map(|group| group.subgroups.iter())
                .map(|subgroup| subgroup.id.as_str()),
        ),
        items: collect(config.items().map(|(_, _, item)| item.id.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::types::Item;

    fn sample() -> DashboardConfig {
        DashboardConfig {
            groups: vec![
                Group::new("a", "A").subgroup(
                    Subgroup::new("s1", "S1")
                        .item(Item::link("i1", "I1", "https://one.lan"))
                        .item(Item::link("i2", "I2", "https://two.lan")),
                ),
                Group::new("b", "B").subgroup(Subgroup::new("s2", "S2")),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("Hello World", "node"), "hello-world");
        assert_eq!(normalize_id("  --Grafana__Main!! ", "node"), "grafana-main");
        assert_eq!(normalize_id("ÄÖÜ", "node"), "node");
        assert_eq!(normalize_id("", "service"), "service");
        assert_eq!(normalize_id("a...b", "node"), "a-b");
    }

    #[test]
    fn test_normalize_id_idempotent() {
        for input in ["Hello World", "--x--", "Proxmox VE 8", "already-normal", "___", "Ünïcode Tëxt"] {
            let once = normalize_id(input, "node");
            assert_eq!(normalize_id(&once, "node"), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_make_unique_id() {
        let mut existing = HashSet::new();
        assert_eq!(make_unique_id("Core", &existing), "core");

        existing.insert("core".to_string());
        existing.insert("core-2".to_string());
        assert_eq!(make_unique_id("Core", &existing), "core-3");
        assert_eq!(make_unique_id("Core", &existing), "core-3");
        assert!(!existing.contains(&make_unique_id("core", &existing)));

        assert_eq!(make_unique_id("", &existing), "node");
    }

    #[test]
    fn test_collectors() {
        let config = sample();
        assert_eq!(all_group_ids(&config).len(), 2);
        assert!(all_subgroup_ids(&config).contains("s2"));
        let items = all_item_ids(&config);
        assert!(items.contains("i1") && items.contains("i2"));
    }

    #[test]
    fn test_find_helpers() {
        let config = sample();
        assert_eq!(find_group(&config, "b").map(|g| g.title.as_str()), Some("B"));
        assert!(find_group(&config, "zzz").is_none());
        assert!(find_subgroup(&config, "a", "s1").is_some());
        assert!(find_subgroup(&config, "b", "s1").is_none());
        assert!(find_subgroup(&config, "missing", "s1").is_none());
    }

    #[test]
    fn test_is_direct_group_node() {
        assert!(is_direct_group_node(Some("group:infra")));
        assert!(!is_direct_group_node(Some("subgroup:infra")));
        assert!(!is_direct_group_node(None));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut config = sample();
        assert!(duplicate_ids(&config).is_empty());

        config.groups[1].subgroups.push(Subgroup::new("s1", "Again"));
        let duplicates = duplicate_ids(&config);
        assert!(duplicates.subgroups.contains("s1"));
        assert!(duplicates.groups.is_empty());
    }
}
