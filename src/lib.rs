//! # Oko Dashboard
//!
//! Configuration tree engine for a self-hosted service dashboard. A dashboard
//! is a three-level tree of groups, subgroups and service items, plus layout
//! pages whose blocks reference groups or subgroups.
//!
//! ## Features
//!
//! - **Tree model**: typed config that round-trips unknown fields
//! - **Move engine**: drag-and-drop reordering of groups, subgroups and items
//! - **Optimistic persistence**: edits apply locally, persist remotely and roll
//!   back on failure
//! - **Derived views**: navigation tree, site and text filters, command palette
//!
//! ## Modules
//!
//! - [`tree`]: config model, id helpers, layout normalization, moves and CRUD
//! - [`store`]: transactional mutation pipeline and save status
//! - [`view`]: lookup index, navigation tree, selection and command palette
//! - [`remote`]: backend seam and the HTTP config client
//! - [`ui_state`]: per-route navigation state persistence
//! - [`config`]: TOML config with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oko_dashboard::config::Config;
//! use oko_dashboard::remote::HttpConfigBackend;
//! use oko_dashboard::store::{DashboardStore, StoreSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let backend = Arc::new(HttpConfigBackend::new(&config.remote)?);
//!     let store = DashboardStore::new(backend, StoreSettings::from(&config.store));
//!
//!     store.load_config().await?;
//!     store.move_group("media", "infra").await?;
//!
//!     for group in store.filtered_tree_groups().await {
//!         println!("{} ({} subgroups)", group.title, group.subgroups.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod remote;
pub mod store;
pub mod tree;
pub mod ui_state;
pub mod view;

// Re-export top-level types for convenience
pub use config::{generate_default_config, Config, ConfigError};

pub use remote::{ConfigBackend, ConfigUpdate, HttpConfigBackend, RemoteError};

pub use store::{DashboardError, DashboardResult, DashboardStore, SaveState, SaveStatus, StoreSettings};

pub use tree::{
    DashboardConfig, Group, Item, ItemType, LayoutBlock, LayoutPage, OpenMode, Subgroup, TreeError,
    TreeResult,
};

pub use ui_state::{PersistedUiState, UiStatePersistence};

pub use view::{PaletteEntry, SelectedNode, TreeGroupNode, TreeIndex, TreeState};
