//! Dashboard configuration tree
//!
//! Three-level service tree (group → subgroup → item) plus layout pages whose
//! blocks reference groups or subgroups. Everything here is synchronous and
//! operates on plain values; orchestration lives in [`crate::store`].

pub mod crud;
pub mod error;
pub mod ids;
pub mod layout;
pub mod moves;
pub mod types;

pub use crud::{
    add_group, add_item, add_subgroup, bootstrap_initial_dashboard, create_dashboard_page,
    edit_group, ensure_absolute_http_url, remove_group, remove_item, remove_subgroup,
    rename_subgroup, update_item, Bootstrap, CreatedNodes, GroupDraft, ItemDraft, ItemLocation,
};
pub use error::{TreeError, TreeResult};
pub use ids::{duplicate_ids, make_unique_id, normalize_id, DuplicateIds};
pub use layout::{ensure_page_groups_reference, normalize_layout_blocks};
pub use moves::{move_group, move_item_before, move_item_to_subgroup_end, move_subgroup};
pub use types::{
    DashboardConfig, Group, Item, ItemType, Layout, LayoutBlock, LayoutPage, OpenMode, Subgroup,
    UiConfig, WidgetRef,
};
