//! Derived read views
//!
//! Everything in this module is a pure function of a committed config plus
//! navigation state:
//!
//! - **index**: id → entity lookup tables
//! - **selection**: active page, expanded nodes, selected node
//! - **tree**: navigation tree nodes, site and text filters
//! - **palette**: command palette entries and ranking

mod index;
mod palette;
mod selection;
mod tree;

pub use index::TreeIndex;
pub use palette::{
    command_palette_entries, focus_entry, search_command_palette, PaletteAction, PaletteEntry, PaletteTarget,
    COMMAND_PALETTE_EMPTY_LIMIT, COMMAND_PALETTE_LIMIT,
};
pub use selection::{SelectedNode, TreeState};
pub use tree::{
    active_page, filter_groups_by_site, filter_tree_groups, filtered_tree_groups, normalize_site_filter,
    resolve_block_groups, resolve_item_site, safe_url_host, site_filter_options, tree_groups, SiteOption,
    TreeGroupNode, SITE_FILTER_ALL,
};
