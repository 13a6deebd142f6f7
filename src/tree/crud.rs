//! Create/edit/remove helpers for the configuration tree
//!
//! Each helper is a pure mutator over `&mut DashboardConfig`: it validates its
//! input, returns `TreeError` when the edit is rejected, and otherwise applies
//! the change. Callers run them through the mutation orchestrator, which works
//! on a copy, so a rejected edit never reaches the committed config.

use crate::tree::error::{TreeError, TreeResult};
use crate::tree::ids::{
    all_group_ids, all_item_ids, all_subgroup_ids, find_group_mut, find_subgroup,
    find_subgroup_mut, make_unique_id, normalize_id,
};
use crate::tree::layout::ensure_page_groups_reference;
use crate::tree::types::{
    DashboardConfig, Group, Item, ItemType, LayoutBlock, LayoutPage, OpenMode, Subgroup,
};
use reqwest::Url;
use std::collections::HashSet;

/// URL given to freshly created items
pub const DEFAULT_ITEM_URL: &str = "https://example.com";

const DEFAULT_ITEM_TITLE: &str = "New service";
const DEFAULT_GROUP_ICON: &str = "folder";
const DEFAULT_PAGE_ICON: &str = "layout-dashboard";
const GROUP_LAYOUTS: [&str; 3] = ["auto", "full", "inline"];

/// Ids of the nodes created by an add operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNodes {
    pub group_id: String,
    pub subgroup_id: String,
    pub item_id: String,
}

/// Location of an item in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLocation {
    pub group_id: String,
    pub subgroup_id: String,
    pub item_id: String,
}

impl ItemLocation {
    pub fn new(group_id: impl Into<String>, subgroup_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            subgroup_id: subgroup_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// Raw item editor input, validated by [`build_item`]
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    /// Explicit id; generated from subgroup and title when blank
    pub id: String,
    pub title: String,
    /// Blank means [`DEFAULT_ITEM_URL`]
    pub url: String,
    /// `link` or `iframe`; blank means `link`
    pub kind: String,
    /// `new_tab` or `same_tab`; blank means `new_tab`
    pub open: String,
    pub icon: String,
    pub site: String,
    pub tags: Vec<String>,
    /// Enables health monitoring against `check_url` (or the item URL)
    pub monitor_health: bool,
    pub check_url: String,
}

/// Input for a new group
#[derive(Debug, Clone, Default)]
pub struct GroupDraft {
    pub title: String,
    pub id: String,
    pub icon: String,
    pub description: String,
}

/// Validate a user supplied URL and return it in absolute http(s) form
///
/// A missing scheme is completed with `https://`.
pub fn ensure_absolute_http_url(raw: &str) -> TreeResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let lowered = trimmed.to_ascii_lowercase();
    let with_scheme = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| TreeError::InvalidUrl(trimmed.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(TreeError::InvalidUrl(trimmed.to_string()));
    }

    Ok(parsed.to_string())
}

/// Split comma separated input into trimmed, non-empty entries
pub fn normalize_string_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// A link item pointing at [`DEFAULT_ITEM_URL`]
pub fn build_default_item(id: impl Into<String>, title: impl Into<String>) -> Item {
    Item::link(id, title, DEFAULT_ITEM_URL)
}

fn required_title(raw: &str, entity: &'static str) -> TreeResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TreeError::EmptyTitle { entity });
    }
    Ok(title.to_string())
}

/// Resolve an explicit id (must be free) or generate a unique one from `base`
fn resolve_new_id(
    raw_id: &str,
    base: &str,
    fallback: &str,
    existing: &HashSet<String>,
    entity: &'static str,
) -> TreeResult<String> {
    let raw_id = raw_id.trim();
    if raw_id.is_empty() {
        return Ok(make_unique_id(&normalize_id(base, fallback), existing));
    }

    let id = normalize_id(raw_id, fallback);
    if existing.contains(&id) {
        return Err(TreeError::DuplicateId { entity, id });
    }
    Ok(id)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build a validated item from editor input
///
/// `replacing` is the item being edited: its id is released for reuse and its
/// unmodelled fields are carried over.
pub fn build_item(
    config: &DashboardConfig,
    draft: &ItemDraft,
    target_subgroup_id: &str,
    replacing: Option<&Item>,
) -> TreeResult<Item> {
    let title = required_title(&draft.title, "Item")?;

    let kind = if draft.kind.trim().is_empty() {
        ItemType::Link
    } else {
        draft
            .kind
            .parse::<ItemType>()
            .map_err(|_| TreeError::InvalidItemType(draft.kind.trim().to_string()))?
    };
    let open = if draft.open.trim().is_empty() {
        OpenMode::NewTab
    } else {
        draft
            .open
            .parse::<OpenMode>()
            .map_err(|_| TreeError::InvalidOpenMode(draft.open.trim().to_string()))?
    };

    let url = ensure_absolute_http_url(non_blank(&draft.url).as_deref().unwrap_or(DEFAULT_ITEM_URL))?;

    let mut existing = all_item_ids(config);
    if let Some(original) = replacing {
        existing.remove(&original.id);
    }
    let id = resolve_new_id(
        &draft.id,
        &format!("{}-{}", target_subgroup_id, title),
        "service",
        &existing,
        "Item",
    )?;

    let mut item = replacing.cloned().unwrap_or_default();
    item.id = id;
    item.title = title;
    item.kind = kind;
    item.open = open;
    item.icon = non_blank(&draft.icon);
    item.site = non_blank(&draft.site);
    item.tags = draft
        .tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    item.monitor_health = Some(draft.monitor_health);
    item.check_url = if draft.monitor_health {
        Some(ensure_absolute_http_url(non_blank(&draft.check_url).as_deref().unwrap_or(&url))?)
    } else {
        None
    };
    item.url = url;

    Ok(item)
}

/// Append a new item to a subgroup and return its id
pub fn add_item(
    config: &mut DashboardConfig,
    group_id: &str,
    subgroup_id: &str,
    draft: &ItemDraft,
) -> TreeResult<String> {
    if find_subgroup(config, group_id, subgroup_id).is_none() {
        return Err(TreeError::NotFound {
            entity: "Subgroup",
            id: subgroup_id.to_string(),
        });
    }

    let item = build_item(config, draft, subgroup_id, None)?;
    let id = item.id.clone();
    if let Some(subgroup) = find_subgroup_mut(config, group_id, subgroup_id) {
        subgroup.items.push(item);
    }
    Ok(id)
}

/// Replace an existing item, optionally moving it to another subgroup
///
/// Returns the (possibly changed) item id. Moving the only item out of its
/// subgroup is rejected.
pub fn update_item(
    config: &mut DashboardConfig,
    source: &ItemLocation,
    target_group_id: &str,
    target_subgroup_id: &str,
    draft: &ItemDraft,
) -> TreeResult<String> {
    if find_subgroup(config, target_group_id, target_subgroup_id).is_none() {
        return Err(TreeError::NotFound {
            entity: "Subgroup",
            id: target_subgroup_id.to_string(),
        });
    }
    let source_subgroup = find_subgroup(config, &source.group_id, &source.subgroup_id).ok_or_else(|| {
        TreeError::NotFound {
            entity: "Subgroup",
            id: source.subgroup_id.clone(),
        }
    })?;
    let index = source_subgroup
        .items
        .iter()
        .position(|item| item.id == source.item_id)
        .ok_or_else(|| TreeError::NotFound {
            entity: "Item",
            id: source.item_id.clone(),
        })?;

    let parent_changed = target_group_id != source.group_id || target_subgroup_id != source.subgroup_id;
    if parent_changed && source_subgroup.items.len() <= 1 {
        return Err(TreeError::LastRemaining("item"));
    }

    let next = build_item(config, draft, target_subgroup_id, Some(&source_subgroup.items[index]))?;
    let id = next.id.clone();

    if let Some(subgroup) = find_subgroup_mut(config, &source.group_id, &source.subgroup_id) {
        if parent_changed {
            subgroup.items.remove(index);
        } else {
            subgroup.items[index] = next.clone();
        }
    }
    if parent_changed {
        if let Some(target) = find_subgroup_mut(config, target_group_id, target_subgroup_id) {
            target.items.push(next);
        }
    }

    Ok(id)
}

/// Add a group with one subgroup and one placeholder item
///
/// The group is referenced from `page_id` (or the first page).
pub fn add_group(config: &mut DashboardConfig, page_id: &str, draft: &GroupDraft) -> TreeResult<CreatedNodes> {
    let title = required_title(&draft.title, "Group")?;

    let group_id = resolve_new_id(&draft.id, &title, "group", &all_group_ids(config), "Group")?;
    let subgroup_id = make_unique_id(&format!("{}-core", group_id), &all_subgroup_ids(config));
    let item_id = make_unique_id(&format!("{}-service", group_id), &all_item_ids(config));

    let mut group = Group::new(&group_id, title).subgroup(
        Subgroup::new(&subgroup_id, "Core").item(build_default_item(&item_id, DEFAULT_ITEM_TITLE)),
    );
    group.icon = Some(non_blank(&draft.icon).unwrap_or_else(|| DEFAULT_GROUP_ICON.to_string()));
    group.description = draft.description.trim().to_string();
    config.groups.push(group);

    ensure_page_groups_reference(config, page_id, &group_id);

    Ok(CreatedNodes {
        group_id,
        subgroup_id,
        item_id,
    })
}

/// Add a subgroup with one placeholder item to an existing group
pub fn add_subgroup(
    config: &mut DashboardConfig,
    group_id: &str,
    title: &str,
    raw_id: &str,
) -> TreeResult<CreatedNodes> {
    let title = required_title(title, "Subgroup")?;
    if !config.groups.iter().any(|group| group.id == group_id) {
        return Err(TreeError::NotFound {
            entity: "Group",
            id: group_id.to_string(),
        });
    }

    let subgroup_id = resolve_new_id(
        raw_id,
        &format!("{}-{}", group_id, title),
        "subgroup",
        &all_subgroup_ids(config),
        "Subgroup",
    )?;
    let item_id = make_unique_id(&format!("{}-service", subgroup_id), &all_item_ids(config));

    if let Some(group) = find_group_mut(config, group_id) {
        group.subgroups.push(
            Subgroup::new(&subgroup_id, title).item(build_default_item(&item_id, DEFAULT_ITEM_TITLE)),
        );
    }

    Ok(CreatedNodes {
        group_id: group_id.to_string(),
        subgroup_id,
        item_id,
    })
}

/// Update a group's title, description and layout mode
///
/// A blank title keeps the current one; a blank layout means `auto`.
pub fn edit_group(
    config: &mut DashboardConfig,
    group_id: &str,
    title: &str,
    description: &str,
    layout: &str,
) -> TreeResult<()> {
    let layout = match layout.trim().to_lowercase() {
        l if l.is_empty() => "auto".to_string(),
        l if GROUP_LAYOUTS.contains(&l.as_str()) => l,
        other => return Err(TreeError::InvalidGroupLayout(other)),
    };

    let group = find_group_mut(config, group_id).ok_or_else(|| TreeError::NotFound {
        entity: "Group",
        id: group_id.to_string(),
    })?;
    if let Some(title) = non_blank(title) {
        group.title = title;
    }
    group.description = description.trim().to_string();
    group.layout = layout;
    Ok(())
}

/// Rename a subgroup; a blank title keeps the current one
pub fn rename_subgroup(config: &mut DashboardConfig, group_id: &str, subgroup_id: &str, title: &str) -> TreeResult<()> {
    let subgroup = find_subgroup_mut(config, group_id, subgroup_id).ok_or_else(|| TreeError::NotFound {
        entity: "Subgroup",
        id: subgroup_id.to_string(),
    })?;
    if let Some(title) = non_blank(title) {
        subgroup.title = title;
    }
    Ok(())
}

/// Remove a group; `Ok(false)` when it does not exist
pub fn remove_group(config: &mut DashboardConfig, group_id: &str) -> TreeResult<bool> {
    let Some(index) = config.groups.iter().position(|group| group.id == group_id) else {
        return Ok(false);
    };
    if config.groups.len() <= 1 {
        return Err(TreeError::LastRemaining("group"));
    }
    config.groups.remove(index);
    Ok(true)
}

/// Remove a subgroup; `Ok(false)` when it does not exist
pub fn remove_subgroup(config: &mut DashboardConfig, group_id: &str, subgroup_id: &str) -> TreeResult<bool> {
    let Some(group) = find_group_mut(config, group_id) else {
        return Ok(false);
    };
    let Some(index) = group.subgroups.iter().position(|s| s.id == subgroup_id) else {
        return Ok(false);
    };
    if group.subgroups.len() <= 1 {
        return Err(TreeError::LastRemaining("subgroup"));
    }
    group.subgroups.remove(index);
    Ok(true)
}

/// Remove an item; `Ok(false)` when it does not exist
pub fn remove_item(config: &mut DashboardConfig, location: &ItemLocation) -> TreeResult<bool> {
    let Some(subgroup) = find_subgroup_mut(config, &location.group_id, &location.subgroup_id) else {
        return Ok(false);
    };
    let Some(index) = subgroup.items.iter().position(|item| item.id == location.item_id) else {
        return Ok(false);
    };
    if subgroup.items.len() <= 1 {
        return Err(TreeError::LastRemaining("item"));
    }
    subgroup.items.remove(index);
    Ok(true)
}

/// Append an empty dashboard page and return its id
pub fn create_dashboard_page(config: &mut DashboardConfig, title: &str, raw_id: &str, icon: &str) -> TreeResult<String> {
    let title = required_title(title, "Dashboard")?;
    let existing: HashSet<String> = config
        .layout
        .pages
        .iter()
        .map(|page| page.id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let page_id = resolve_new_id(raw_id, &title, "dashboard", &existing, "Dashboard")?;

    let mut page = LayoutPage::new(&page_id, title);
    page.icon = Some(non_blank(icon).unwrap_or_else(|| DEFAULT_PAGE_ICON.to_string()));
    config.layout.pages.push(page);
    Ok(page_id)
}

/// Result of seeding an empty dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub page_id: String,
    /// First group/subgroup/item, for the initial selection
    pub first: Option<CreatedNodes>,
}

/// Seed a config that has no pages with a home page (and a starter group
/// when there are no groups either)
///
/// Returns `None` when pages already exist.
pub fn bootstrap_initial_dashboard(config: &mut DashboardConfig) -> Option<Bootstrap> {
    if !config.layout.pages.is_empty() {
        return None;
    }

    if config.groups.is_empty() {
        let group_id = make_unique_id("core", &all_group_ids(config));
        let subgroup_id = make_unique_id(&format!("{}-main", group_id), &all_subgroup_ids(config));
        let item_id = make_unique_id(&format!("{}-service", subgroup_id), &all_item_ids(config));

        let mut group = Group::new(&group_id, "Core Services").subgroup(
            Subgroup::new(&subgroup_id, "Main").item(build_default_item(&item_id, DEFAULT_ITEM_TITLE)),
        );
        group.icon = Some(DEFAULT_PAGE_ICON.to_string());
        group.description = "Starter group of services.".to_string();
        config.groups.push(group);
    }

    let page_id = "home".to_string();
    let mut page = LayoutPage::new(&page_id, "Home")
        .block(LayoutBlock::groups(config.groups.iter().map(|group| group.id.clone())));
    page.icon = Some(DEFAULT_PAGE_ICON.to_string());
    config.layout.pages.push(page);

    let first = config.groups.first().map(|group| {
        let subgroup = group.subgroups.first();
        CreatedNodes {
            group_id: group.id.clone(),
            subgroup_id: subgroup.map(|s| s.id.clone()).unwrap_or_default(),
            item_id: subgroup
                .and_then(|s| s.items.first())
                .map(|item| item.id.clone())
                .unwrap_or_default(),
        }
    });

    Some(Bootstrap { page_id, first })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ids::find_group;

    fn base() -> DashboardConfig {
        let mut config = DashboardConfig {
            groups: vec![
                Group::new("infra", "Infra").subgroup(
                    Subgroup::new("infra-core", "Core")
                        .item(Item::link("grafana", "Grafana", "https://grafana.lan/"))
                        .item(Item::link("proxmox", "Proxmox", "https://pve.lan/")),
                ),
                Group::new("media", "Media").subgroup(
                    Subgroup::new("media-main", "Main").item(Item::link("jellyfin", "Jellyfin", "https://jf.lan/")),
                ),
            ],
            ..Default::default()
        };
        config.layout.pages.push(LayoutPage::new("home", "Home").block(LayoutBlock::groups(["infra"])));
        config
    }

    fn draft(title: &str) -> ItemDraft {
        ItemDraft {
            title: title.to_string(),
            url: "nas.lan:5000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ensure_absolute_http_url() {
        assert_eq!(ensure_absolute_http_url("grafana.lan").unwrap(), "https://grafana.lan/");
        assert_eq!(
            ensure_absolute_http_url(" HTTP://10.0.0.2:8080/x ").unwrap(),
            "http://10.0.0.2:8080/x"
        );
        assert!(matches!(ensure_absolute_http_url("   "), Err(TreeError::InvalidUrl(_))));
        assert!(ensure_absolute_http_url("https://").is_err());
        assert!(ensure_absolute_http_url("http://exa mple.com").is_err());
    }

    #[test]
    fn test_normalize_string_list() {
        assert_eq!(normalize_string_list(" a, ,b ,c"), vec!["a", "b", "c"]);
        assert!(normalize_string_list("").is_empty());
    }

    #[test]
    fn test_add_item_generates_unique_id() {
        let mut config = base();
        let id = add_item(&mut config, "infra", "infra-core", &draft("NAS")).unwrap();
        assert_eq!(id, "infra-core-nas");

        let again = add_item(&mut config, "infra", "infra-core", &draft("NAS")).unwrap();
        assert_eq!(again, "infra-core-nas-2");

        let subgroup = find_subgroup(&config, "infra", "infra-core").unwrap();
        assert_eq!(subgroup.items.len(), 4);
        assert_eq!(subgroup.items[2].url, "https://nas.lan:5000/");
    }

    #[test]
    fn test_add_item_validation() {
        let mut config = base();
        let before = config.clone();

        let mut bad = draft("   ");
        assert_eq!(
            add_item(&mut config, "infra", "infra-core", &bad),
            Err(TreeError::EmptyTitle { entity: "Item" })
        );

        bad = draft("NAS");
        bad.kind = "popup".to_string();
        assert!(matches!(
            add_item(&mut config, "infra", "infra-core", &bad),
            Err(TreeError::InvalidItemType(_))
        ));

        bad = draft("NAS");
        bad.open = "window".to_string();
        assert!(matches!(
            add_item(&mut config, "infra", "infra-core", &bad),
            Err(TreeError::InvalidOpenMode(_))
        ));

        bad = draft("NAS");
        bad.id = "Grafana".to_string();
        assert!(matches!(
            add_item(&mut config, "infra", "infra-core", &bad),
            Err(TreeError::DuplicateId { .. })
        ));

        assert!(matches!(
            add_item(&mut config, "infra", "nope", &draft("NAS")),
            Err(TreeError::NotFound { .. })
        ));
        assert_eq!(config, before);
    }

    #[test]
    fn test_build_item_health_check() {
        let config = base();
        let mut input = draft("NAS");
        input.monitor_health = true;
        let item = build_item(&config, &input, "infra-core", None).unwrap();
        assert_eq!(item.check_url.as_deref(), Some("https://nas.lan:5000/"));
        assert_eq!(item.monitor_health, Some(true));

        input.monitor_health = false;
        let item = build_item(&config, &input, "infra-core", None).unwrap();
        assert!(item.check_url.is_none());
    }

    #[test]
    fn test_update_item_in_place_keeps_id_and_extra() {
        let mut config = base();
        config.groups[0].subgroups[0].items[0]
            .extra
            .insert("healthcheck".to_string(), serde_json::json!({"type": "http"}));

        let mut input = draft("Grafana 2");
        input.id = "grafana".to_string();
        let id = update_item(
            &mut config,
            &ItemLocation::new("infra", "infra-core", "grafana"),
            "infra",
            "infra-core",
            &input,
        )
        .unwrap();

        assert_eq!(id, "grafana");
        let item = &config.groups[0].subgroups[0].items[0];
        assert_eq!(item.title, "Grafana 2");
        assert!(item.extra.contains_key("healthcheck"));
    }

    #[test]
    fn test_update_item_moves_between_subgroups() {
        let mut config = base();
        let id = update_item(
            &mut config,
            &ItemLocation::new("infra", "infra-core", "proxmox"),
            "media",
            "media-main",
            &draft("Proxmox"),
        )
        .unwrap();

        assert_eq!(config.groups[0].subgroups[0].items.len(), 1);
        assert_eq!(config.groups[1].subgroups[0].items[1].id, id);

        let err = update_item(
            &mut config,
            &ItemLocation::new("infra", "infra-core", "grafana"),
            "media",
            "media-main",
            &draft("Grafana"),
        );
        assert_eq!(err, Err(TreeError::LastRemaining("item")));
    }

    #[test]
    fn test_add_group_references_page() {
        let mut config = base();
        let created = add_group(
            &mut config,
            "home",
            &GroupDraft {
                title: "Home Lab".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(created.group_id, "home-lab");
        assert_eq!(created.subgroup_id, "home-lab-core");
        assert_eq!(created.item_id, "home-lab-service");
        let group = find_group(&config, "home-lab").unwrap();
        assert_eq!(group.icon.as_deref(), Some("folder"));
        assert_eq!(
            config.layout.pages[0].blocks[0].group_ids().unwrap(),
            ["infra".to_string(), "home-lab".to_string()]
        );

        let duplicate = add_group(
            &mut config,
            "home",
            &GroupDraft {
                title: "Again".to_string(),
                id: "Infra".to_string(),
                ..Default::default()
            },
        );
        assert!(matches!(duplicate, Err(TreeError::DuplicateId { .. })));
    }

    #[test]
    fn test_add_subgroup_ids_are_global() {
        let mut config = base();
        config.groups[1].subgroups.push(Subgroup::new("infra-extra", "Clash"));

        let created = add_subgroup(&mut config, "infra", "Extra", "").unwrap();
        assert_eq!(created.subgroup_id, "infra-extra-2");

        assert!(matches!(
            add_subgroup(&mut config, "ghost", "Extra", ""),
            Err(TreeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_edit_group_and_rename_subgroup() {
        let mut config = base();
        edit_group(&mut config, "infra", "", " Core infra ", "FULL").unwrap();
        let group = find_group(&config, "infra").unwrap();
        assert_eq!(group.title, "Infra");
        assert_eq!(group.description, "Core infra");
        assert_eq!(group.layout, "full");

        assert!(matches!(
            edit_group(&mut config, "infra", "x", "", "grid"),
            Err(TreeError::InvalidGroupLayout(_))
        ));

        rename_subgroup(&mut config, "infra", "infra-core", "Primary").unwrap();
        assert_eq!(config.groups[0].subgroups[0].title, "Primary");
    }

    #[test]
    fn test_remove_guards() {
        let mut config = base();
        assert_eq!(remove_group(&mut config, "ghost"), Ok(false));
        assert_eq!(remove_group(&mut config, "media"), Ok(true));
        assert_eq!(remove_group(&mut config, "infra"), Err(TreeError::LastRemaining("group")));

        assert_eq!(
            remove_subgroup(&mut config, "infra", "infra-core"),
            Err(TreeError::LastRemaining("subgroup"))
        );

        let location = ItemLocation::new("infra", "infra-core", "grafana");
        assert_eq!(remove_item(&mut config, &location), Ok(true));
        let last = ItemLocation::new("infra", "infra-core", "proxmox");
        assert_eq!(remove_item(&mut config, &last), Err(TreeError::LastRemaining("item")));
    }

    #[test]
    fn test_create_dashboard_page() {
        let mut config = base();
        assert_eq!(create_dashboard_page(&mut config, "Home", "", "").unwrap(), "home-2");
        assert_eq!(create_dashboard_page(&mut config, "Ops", "ops", "server").unwrap(), "ops");
        assert!(matches!(
            create_dashboard_page(&mut config, "Ops", "ops", ""),
            Err(TreeError::DuplicateId { .. })
        ));
        assert!(create_dashboard_page(&mut config, " ", "", "").is_err());
        assert_eq!(config.layout.pages.len(), 3);
    }

    #[test]
    fn test_bootstrap_empty_config() {
        let mut config = DashboardConfig::default();
        let bootstrap = bootstrap_initial_dashboard(&mut config).unwrap();

        assert_eq!(bootstrap.page_id, "home");
        let first = bootstrap.first.unwrap();
        assert_eq!(first.group_id, "core");
        assert_eq!(first.subgroup_id, "core-main");
        assert_eq!(first.item_id, "core-main-service");
        assert_eq!(
            config.layout.pages[0].blocks[0].group_ids().unwrap(),
            ["core".to_string()]
        );

        assert!(bootstrap_initial_dashboard(&mut config).is_none());
    }
}
