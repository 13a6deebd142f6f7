//! Navigation tree derived from the active page
//!
//! A page's groups blocks reference groups or subgroups. Each reference
//! becomes one [`TreeGroupNode`]: a group reference carries all of its
//! subgroups, a subgroup reference carries only that subgroup.

use crate::tree::layout::page_group_refs;
use crate::tree::types::{DashboardConfig, Item, LayoutPage, Subgroup};
use crate::view::index::TreeIndex;
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

/// Site filter value that disables site filtering
pub const SITE_FILTER_ALL: &str = "all";

const SITE_TAG_PREFIX: &str = "site:";

/// One top-level node of the navigation tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeGroupNode {
    /// `group:<group id>` or `subgroup:<subgroup id>`
    pub key: String,
    /// Id of the (owning) group
    pub group_id: String,
    pub title: String,
    pub icon: Option<String>,
    pub description: String,
    pub layout: String,
    pub site: Option<String>,
    pub subgroups: Vec<Subgroup>,
}

/// Resolve groups-block references into tree nodes, skipping unknown ids
pub fn resolve_block_groups(index: &TreeIndex<'_>, refs: &[String]) -> Vec<TreeGroupNode> {
    refs.iter()
        .filter_map(|id| {
            if let Some(group) = index.group(id) {
                return Some(TreeGroupNode {
                    key: group.node_key(),
                    group_id: group.id.clone(),
                    title: group.title.clone(),
                    icon: group.icon.clone(),
                    description: group.description.clone(),
                    layout: group.layout.clone(),
                    site: group.site.clone(),
                    subgroups: group.subgroups.clone(),
                });
            }

            index.subgroup(id).map(|(group, subgroup)| TreeGroupNode {
                key: subgroup.node_key(),
                group_id: group.id.clone(),
                title: group.title.clone(),
                icon: group.icon.clone(),
                description: group.description.clone(),
                layout: group.layout.clone(),
                site: group.site.clone(),
                subgroups: vec![subgroup.clone()],
            })
        })
        .collect()
}

/// The page with `page_id`, or the first page
pub fn active_page<'a>(config: &'a DashboardConfig, page_id: &str) -> Option<&'a LayoutPage> {
    config
        .layout
        .pages
        .iter()
        .find(|page| page.id == page_id)
        .or_else(|| config.layout.pages.first())
}

/// Tree nodes of the active page
pub fn tree_groups(config: &DashboardConfig, index: &TreeIndex<'_>, page_id: &str) -> Vec<TreeGroupNode> {
    match active_page(config, page_id) {
        Some(page) => resolve_block_groups(index, &page_group_refs(page)),
        None => Vec::new(),
    }
}

/// Host name of a URL, empty when it does not parse
pub fn safe_url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Site label: the item's site, then the group's, then a `site:` tag
pub fn resolve_item_site(item: &Item, group_site: Option<&str>) -> String {
    if let Some(site) = item.site.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return site.to_string();
    }
    if let Some(site) = group_site.map(str::trim).filter(|s| !s.is_empty()) {
        return site.to_string();
    }

    item.normalized_tags()
        .iter()
        .find(|tag| tag.to_lowercase().starts_with(SITE_TAG_PREFIX))
        .map(|tag| tag.get(SITE_TAG_PREFIX.len()..).unwrap_or("").trim().to_string())
        .unwrap_or_default()
}

/// A selectable site filter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteOption {
    /// Lower-cased site, or `all`
    pub value: String,
    pub label: String,
}

/// `all` followed by every distinct site, sorted case-insensitively
pub fn site_filter_options(config: &DashboardConfig) -> Vec<SiteOption> {
    let mut sites: Vec<SiteOption> = Vec::new();
    for (group, _, item) in config.items() {
        let site = resolve_item_site(item, group.site.as_deref());
        if site.is_empty() {
            continue;
        }
        let value = site.to_lowercase();
        if !sites.iter().any(|option| option.value == value) {
            sites.push(SiteOption { value, label: site });
        }
    }
    sites.sort_by_key(|option| option.label.to_lowercase());

    let mut options = vec![SiteOption {
        value: SITE_FILTER_ALL.to_string(),
        label: "All sites".to_string(),
    }];
    options.extend(sites);
    options
}

/// Lower-case a site filter; unknown values fall back to `all`
pub fn normalize_site_filter(value: &str, options: &[SiteOption]) -> String {
    let normalized = value.trim().to_lowercase();
    if options.iter().any(|option| option.value == normalized) {
        normalized
    } else {
        SITE_FILTER_ALL.to_string()
    }
}

/// Keep only items whose site matches; drop emptied subgroups and groups
pub fn filter_groups_by_site(groups: Vec<TreeGroupNode>, site_filter: &str) -> Vec<TreeGroupNode> {
    if site_filter == SITE_FILTER_ALL || site_filter.is_empty() {
        return groups;
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            let group_site = group.site.clone();
            group.subgroups = group
                .subgroups
                .into_iter()
                .filter_map(|mut subgroup| {
                    subgroup.items.retain(|item| {
                        resolve_item_site(item, group_site.as_deref()).to_lowercase() == site_filter
                    });
                    (!subgroup.items.is_empty()).then_some(subgroup)
                })
                .collect();
            (!group.subgroups.is_empty()).then_some(group)
        })
        .collect()
}

fn extra_str<'a>(extra: &'a Map<String, Value>, key: &str) -> &'a str {
    extra.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Whether every token occurs in the joined, lower-cased parts
fn matches_tokens(tokens: &[String], parts: &[&str]) -> bool {
    let text = parts
        .iter()
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    !text.is_empty() && tokens.iter().all(|token| text.contains(token.as_str()))
}

/// Text filter over the navigation tree
///
/// A matching group keeps all of its content, a matching subgroup keeps all
/// of its items, otherwise only matching items survive.
pub fn filter_tree_groups(groups: Vec<TreeGroupNode>, query: &str) -> Vec<TreeGroupNode> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return groups;
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            if matches_tokens(&tokens, &[&group.title, &group.description, &group.group_id]) {
                return Some(group);
            }

            let group_site = group.site.clone();
            group.subgroups = group
                .subgroups
                .into_iter()
                .filter_map(|mut subgroup| {
                    let subgroup_matches = matches_tokens(
                        &tokens,
                        &[
                            &subgroup.title,
                            extra_str(&subgroup.extra, "name"),
                            extra_str(&subgroup.extra, "description"),
                            &subgroup.id,
                        ],
                    );
                    if subgroup_matches {
                        return Some(subgroup);
                    }

                    subgroup.items.retain(|item| {
                        let site = resolve_item_site(item, group_site.as_deref());
                        let mut parts = vec![
                            item.id.as_str(),
                            item.title.as_str(),
                            extra_str(&item.extra, "name"),
                            extra_str(&item.extra, "description"),
                            extra_str(&item.extra, "desc"),
                            item.url.as_str(),
                            item.check_url.as_deref().unwrap_or(""),
                            site.as_str(),
                        ];
                        parts.extend(item.tags.iter().map(String::as_str));
                        matches_tokens(&tokens, &parts)
                    });
                    (!subgroup.items.is_empty()).then_some(subgroup)
                })
                .collect();

            (!group.subgroups.is_empty()).then_some(group)
        })
        .collect()
}

/// Site filter followed by the text filter
pub fn filtered_tree_groups(groups: Vec<TreeGroupNode>, site_filter: &str, query: &str) -> Vec<TreeGroupNode> {
    filter_tree_groups(filter_groups_by_site(groups, site_filter), query)
}
