//! Move/reorder engine
//!
//! Relocates groups, subgroups and items while keeping exactly one copy of
//! every element. Every operation resolves all of its ids before touching the
//! tree, so a `false` return always means the config is unchanged.

use crate::tree::types::DashboardConfig;

/// Position of a subgroup: (group index, subgroup index)
type SubgroupPos = (usize, usize);

fn group_index(config: &DashboardConfig, group_id: &str) -> Option<usize> {
    config.groups.iter().position(|group| group.id == group_id)
}

fn subgroup_pos(config: &DashboardConfig, group_id: &str, subgroup_id: &str) -> Option<SubgroupPos> {
    let gi = group_index(config, group_id)?;
    let si = config.groups[gi]
        .subgroups
        .iter()
        .position(|subgroup| subgroup.id == subgroup_id)?;
    Some((gi, si))
}

fn item_index(config: &DashboardConfig, pos: SubgroupPos, item_id: &str) -> Option<usize> {
    config.groups[pos.0].subgroups[pos.1]
        .items
        .iter()
        .position(|item| item.id == item_id)
}

/// Index to insert at after removing `source` from the same list
fn adjusted_target(source: usize, target: usize) -> usize {
    if source < target {
        target - 1
    } else {
        target
    }
}

/// Moving the subgroup to another group would leave its group empty
pub fn subgroup_move_empties_source(config: &DashboardConfig, source_group_id: &str, target_group_id: &str) -> bool {
    source_group_id != target_group_id
        && group_index(config, source_group_id).is_some_and(|gi| config.groups[gi].subgroups.len() <= 1)
}

/// Moving the item to another subgroup would leave its subgroup empty
pub fn item_move_empties_source(
    config: &DashboardConfig,
    source_group_id: &str,
    source_subgroup_id: &str,
    target_group_id: &str,
    target_subgroup_id: &str,
) -> bool {
    (source_group_id, source_subgroup_id) != (target_group_id, target_subgroup_id)
        && subgroup_pos(config, source_group_id, source_subgroup_id)
            .is_some_and(|(gi, si)| config.groups[gi].subgroups[si].items.len() <= 1)
}

/// Move a group so it sits immediately before `target_id`
pub fn move_group(config: &mut DashboardConfig, source_id: &str, target_id: &str) -> bool {
    if source_id == target_id {
        return false;
    }
    let (Some(source), Some(target)) = (group_index(config, source_id), group_index(config, target_id)) else {
        return false;
    };

    let moved = config.groups.remove(source);
    config.groups.insert(adjusted_target(source, target), moved);
    true
}

/// Move a subgroup before `target_subgroup_id` in the target group
///
/// An empty or unknown `target_subgroup_id` appends the subgroup at the end
/// of the target group.
pub fn move_subgroup(
    config: &mut DashboardConfig,
    source_group_id: &str,
    source_subgroup_id: &str,
    target_group_id: &str,
    target_subgroup_id: &str,
) -> bool {
    let Some((sg, ss)) = subgroup_pos(config, source_group_id, source_subgroup_id) else {
        return false;
    };
    let Some(tg) = group_index(config, target_group_id) else {
        return false;
    };

    let target = if target_subgroup_id.is_empty() {
        None
    } else {
        config.groups[tg]
            .subgroups
            .iter()
            .position(|subgroup| subgroup.id == target_subgroup_id)
    };
    if sg == tg && target == Some(ss) {
        return false;
    }

    let moved = config.groups[sg].subgroups.remove(ss);
    let subgroups = &mut config.groups[tg].subgroups;
    match target {
        Some(ts) if sg == tg => subgroups.insert(adjusted_target(ss, ts), moved),
        Some(ts) => subgroups.insert(ts, moved),
        None => subgroups.push(moved),
    }
    true
}

/// Move an item so it sits immediately before `target_item_id`
#[allow(clippy::too_many_arguments)]
pub fn move_item_before(
    config: &mut DashboardConfig,
    source_group_id: &str,
    source_subgroup_id: &str,
    source_item_id: &str,
    target_group_id: &str,
    target_subgroup_id: &str,
    target_item_id: &str,
) -> bool {
    let Some(source_pos) = subgroup_pos(config, source_group_id, source_subgroup_id) else {
        return false;
    };
    let Some(target_pos) = subgroup_pos(config, target_group_id, target_subgroup_id) else {
        return false;
    };
    let (Some(source), Some(target)) = (
        item_index(config, source_pos, source_item_id),
        item_index(config, target_pos, target_item_id),
    ) else {
        return false;
    };

    let same_subgroup = source_pos == target_pos;
    if same_subgroup && source == target {
        return false;
    }

    let moved = config.groups[source_pos.0].subgroups[source_pos.1]
        .items
        .remove(source);
    let insert_at = if same_subgroup {
        adjusted_target(source, target)
    } else {
        target
    };
    config.groups[target_pos.0].subgroups[target_pos.1]
        .items
        .insert(insert_at, moved);
    true
}

/// Move an item to the end of the target subgroup
pub fn move_item_to_subgroup_end(
    config: &mut DashboardConfig,
    source_group_id: &str,
    source_subgroup_id: &str,
    source_item_id: &str,
    target_group_id: &str,
    target_subgroup_id: &str,
) -> bool {
    let Some(source_pos) = subgroup_pos(config, source_group_id, source_subgroup_id) else {
        return false;
    };
    let Some(target_pos) = subgroup_pos(config, target_group_id, target_subgroup_id) else {
        return false;
    };
    let Some(source) = item_index(config, source_pos, source_item_id) else {
        return false;
    };

    let moved = config.groups[source_pos.0].subgroups[source_pos.1]
        .items
        .remove(source);
    config.groups[target_pos.0].subgroups[target_pos.1]
        .items
        .push(moved);
    true
}
