//! Dashboard Store
//!
//! Owns the committed config and the navigation state around it. Every edit
//! goes through [`DashboardStore::apply_config_mutation`]:
//!
//! 1. snapshot the live config
//! 2. run the mutator on a working copy
//! 3. normalize layout blocks and swap the copy in
//! 4. persist remotely, restoring the snapshot if that fails
//!
//! Mutations are serialized so a rollback never overwrites a later edit.

use crate::config::StoreConfig;
use crate::remote::{ConfigBackend, RemoteError};
use crate::store::error::{DashboardError, DashboardResult};
use crate::store::status::{SaveState, SaveStatus};
use crate::tree::crud::{self, CreatedNodes, GroupDraft, ItemDraft, ItemLocation};
use crate::tree::layout::normalize_layout_blocks;
use crate::tree::moves;
use crate::tree::types::GROUP_KEY_PREFIX;
use crate::tree::{DashboardConfig, TreeError, TreeResult};
use crate::ui_state::PersistedUiState;
use crate::view::{
    command_palette_entries, filtered_tree_groups, normalize_site_filter, search_command_palette,
    site_filter_options, tree_groups, PaletteEntry, TreeGroupNode, TreeIndex, TreeState, SITE_FILTER_ALL,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Store tuning
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// How long `Saved` lingers before falling back to `Idle`
    pub save_status_reset: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            save_status_reset: Duration::from_millis(1400),
        }
    }
}

impl From<&StoreConfig> for StoreSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            save_status_reset: config.save_status_reset(),
        }
    }
}

#[derive(Debug)]
struct StoreInner {
    config: Option<DashboardConfig>,
    tree: TreeState,
    tree_filter: String,
    site_filter: String,
    save: SaveState,
    load_error: Option<String>,
    /// Bumped on every save status transition; guards the reset timer
    status_generation: u64,
}

impl Default for StoreInner {
    fn default() -> Self {
        Self {
            config: None,
            tree: TreeState::default(),
            tree_filter: String::new(),
            site_filter: SITE_FILTER_ALL.to_string(),
            save: SaveState::default(),
            load_error: None,
            status_generation: 0,
        }
    }
}

impl StoreInner {
    fn set_status(&mut self, status: SaveStatus, error: Option<String>) -> u64 {
        self.save.status = status;
        self.save.error = error;
        self.status_generation += 1;
        self.status_generation
    }

    /// Repair the active page and reconcile expansion/selection
    fn refresh_tree(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        self.tree.ensure_active_page(config);
        let index = TreeIndex::build(config);
        let groups = tree_groups(config, &index, &self.tree.active_page_id);
        self.tree.sync_tree_groups(&groups);
    }
}

fn group_node_key(group_id: &str) -> String {
    format!("{}{}", GROUP_KEY_PREFIX, group_id)
}

/// Mutation/persistence orchestrator for one dashboard
pub struct DashboardStore {
    backend: Arc<dyn ConfigBackend>,
    inner: Arc<RwLock<StoreInner>>,
    gate: Mutex<()>,
    settings: StoreSettings,
}

impl DashboardStore {
    /// Create an empty store; call [`load_config`](Self::load_config) next
    pub fn new(backend: Arc<dyn ConfigBackend>, settings: StoreSettings) -> Self {
        Self {
            backend,
            inner: Arc::new(RwLock::new(StoreInner::default())),
            gate: Mutex::new(()),
            settings,
        }
    }

    /// Clone of the committed config
    pub async fn config(&self) -> Option<DashboardConfig> {
        self.inner.read().await.config.clone()
    }

    pub async fn save_state(&self) -> SaveState {
        self.inner.read().await.save.clone()
    }

    pub async fn tree_state(&self) -> TreeState {
        self.inner.read().await.tree.clone()
    }

    /// Message of the last failed load
    pub async fn load_error(&self) -> Option<String> {
        self.inner.read().await.load_error.clone()
    }

    /// Fetch the config from the backend
    ///
    /// On failure the config is cleared and the error is kept for display.
    pub async fn load_config(&self) -> Result<(), RemoteError> {
        let _gate = self.gate.lock().await;
        {
            let mut inner = self.inner.write().await;
            inner.load_error = None;
            inner.save.error = None;
            inner.set_status(SaveStatus::Idle, None);
        }

        match self.backend.fetch_config().await {
            Ok(config) => {
                tracing::info!(
                    groups = config.groups.len(),
                    pages = config.layout.pages.len(),
                    "Dashboard config loaded"
                );
                let mut inner = self.inner.write().await;
                inner.config = Some(config);
                inner.refresh_tree();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load dashboard config");
                let mut inner = self.inner.write().await;
                inner.config = None;
                inner.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Save the committed config as is
    pub async fn persist_config(&self) -> Result<(), RemoteError> {
        let _gate = self.gate.lock().await;
        self.persist_locked().await
    }

    /// Persist while holding the mutation gate
    async fn persist_locked(&self) -> Result<(), RemoteError> {
        let config = {
            let mut inner = self.inner.write().await;
            let Some(config) = inner.config.clone() else {
                return Ok(());
            };
            inner.set_status(SaveStatus::Saving, None);
            config
        };

        match self.backend.update_config(&config).await {
            Ok(update) => {
                let generation = {
                    let mut inner = self.inner.write().await;
                    if let Some(next) = update.config {
                        inner.config = Some(next);
                    }
                    inner.refresh_tree();
                    inner.save.last_saved_at = Some(Utc::now());
                    inner.set_status(SaveStatus::Saved, None)
                };
                tracing::debug!("Dashboard config persisted");
                self.schedule_status_reset(generation);
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.write().await;
                inner.set_status(SaveStatus::Error, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Return to `Idle` after the reset delay unless the status moved on
    fn schedule_status_reset(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = self.settings.save_status_reset;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.write().await;
            if inner.status_generation == generation && inner.save.status == SaveStatus::Saved {
                inner.set_status(SaveStatus::Idle, None);
            }
        });
    }

    /// Run a mutator through snapshot → mutate → normalize → persist
    ///
    /// `Ok(None)` from the mutator, or no loaded config, means nothing
    /// happened. A validation error or a failed persist leaves the committed
    /// config exactly as it was.
    async fn run_mutation<T, F>(&self, mutator: F) -> DashboardResult<Option<T>>
    where
        F: FnOnce(&mut DashboardConfig) -> TreeResult<Option<T>> + Send,
        T: Send,
    {
        let _gate = self.gate.lock().await;

        let (snapshot, output) = {
            let mut inner = self.inner.write().await;
            let Some(current) = inner.config.as_ref() else {
                return Ok(None);
            };
            let snapshot = current.clone();
            let mut working = snapshot.clone();

            let output = match mutator(&mut working) {
                Ok(Some(output)) => output,
                Ok(None) => return Ok(None),
                Err(e) => {
                    tracing::debug!(error = %e, "Config mutation rejected");
                    return Err(e.into());
                }
            };

            normalize_layout_blocks(&mut working);
            inner.config = Some(working);
            inner.refresh_tree();
            (snapshot, output)
        };

        if let Err(e) = self.persist_locked().await {
            tracing::warn!(error = %e, "Persist failed, rolling back config");
            let mut inner = self.inner.write().await;
            inner.config = Some(snapshot);
            inner.refresh_tree();
            return Err(e.into());
        }

        Ok(Some(output))
    }

    /// Apply an edit; `Ok(true)` when it was applied and saved
    pub async fn apply_config_mutation<F>(&self, mutator: F) -> DashboardResult<bool>
    where
        F: FnOnce(&mut DashboardConfig) -> TreeResult<bool> + Send,
    {
        let applied = self
            .run_mutation(|config| mutator(config).map(|changed| changed.then_some(())))
            .await?;
        Ok(applied.is_some())
    }

    pub async fn move_group(&self, source_id: &str, target_id: &str) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| Ok(moves::move_group(config, source_id, target_id)))
            .await
    }

    /// Move a subgroup; moving a group's only subgroup elsewhere is rejected
    pub async fn move_subgroup(
        &self,
        source_group_id: &str,
        source_subgroup_id: &str,
        target_group_id: &str,
        target_subgroup_id: &str,
    ) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| {
            let empties = moves::subgroup_move_empties_source(config, source_group_id, target_group_id);
            let moved = moves::move_subgroup(
                config,
                source_group_id,
                source_subgroup_id,
                target_group_id,
                target_subgroup_id,
            );
            if moved && empties {
                return Err(TreeError::LastRemaining("subgroup"));
            }
            Ok(moved)
        })
        .await
    }

    /// Move an item before `target.item_id` in the target subgroup
    ///
    /// Moving a subgroup's only item elsewhere is rejected.
    pub async fn move_item_before(&self, source: &ItemLocation, target: &ItemLocation) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| {
            let empties = moves::item_move_empties_source(
                config,
                &source.group_id,
                &source.subgroup_id,
                &target.group_id,
                &target.subgroup_id,
            );
            let moved = moves::move_item_before(
                config,
                &source.group_id,
                &source.subgroup_id,
                &source.item_id,
                &target.group_id,
                &target.subgroup_id,
                &target.item_id,
            );
            if moved && empties {
                return Err(TreeError::LastRemaining("item"));
            }
            Ok(moved)
        })
        .await
    }

    pub async fn move_item_to_subgroup_end(
        &self,
        source: &ItemLocation,
        target_group_id: &str,
        target_subgroup_id: &str,
    ) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| {
            let empties = moves::item_move_empties_source(
                config,
                &source.group_id,
                &source.subgroup_id,
                target_group_id,
                target_subgroup_id,
            );
            let moved = moves::move_item_to_subgroup_end(
                config,
                &source.group_id,
                &source.subgroup_id,
                &source.item_id,
                target_group_id,
                target_subgroup_id,
            );
            if moved && empties {
                return Err(TreeError::LastRemaining("item"));
            }
            Ok(moved)
        })
        .await
    }

    /// Add a group to the active page and select its placeholder item
    pub async fn add_group(&self, draft: &GroupDraft) -> DashboardResult<Option<CreatedNodes>> {
        let page_id = self.inner.read().await.tree.active_page_id.clone();
        let created = self
            .run_mutation(|config| crud::add_group(config, &page_id, draft).map(Some))
            .await?;

        if let Some(created) = &created {
            let key = group_node_key(&created.group_id);
            self.with_tree(|tree, index| {
                tree.select_item_node(index, &key, &created.subgroup_id, &created.item_id)
            })
            .await;
        }
        Ok(created)
    }

    pub async fn add_subgroup(&self, group_id: &str, title: &str, raw_id: &str) -> DashboardResult<Option<CreatedNodes>> {
        let created = self
            .run_mutation(|config| crud::add_subgroup(config, group_id, title, raw_id).map(Some))
            .await?;

        if let Some(created) = &created {
            let key = group_node_key(&created.group_id);
            self.with_tree(|tree, index| {
                tree.select_item_node(index, &key, &created.subgroup_id, &created.item_id)
            })
            .await;
        }
        Ok(created)
    }

    /// Create (`source == None`) or edit an item; returns its id
    pub async fn submit_item(
        &self,
        source: Option<&ItemLocation>,
        target_group_id: &str,
        target_subgroup_id: &str,
        draft: &ItemDraft,
    ) -> DashboardResult<Option<String>> {
        let item_id: Option<String> = self
            .run_mutation(|config| {
                let id = match source {
                    Some(source) => crud::update_item(config, source, target_group_id, target_subgroup_id, draft)?,
                    None => crud::add_item(config, target_group_id, target_subgroup_id, draft)?,
                };
                Ok(Some(id))
            })
            .await?;

        if let Some(item_id) = &item_id {
            let key = group_node_key(target_group_id);
            self.with_tree(|tree, index| tree.select_item_node(index, &key, target_subgroup_id, item_id))
                .await;
        }
        Ok(item_id)
    }

    pub async fn edit_group(&self, group_id: &str, title: &str, description: &str, layout: &str) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| {
            crud::edit_group(config, group_id, title, description, layout)?;
            Ok(true)
        })
        .await
    }

    pub async fn rename_subgroup(&self, group_id: &str, subgroup_id: &str, title: &str) -> DashboardResult<bool> {
        self.apply_config_mutation(|config| {
            crud::rename_subgroup(config, group_id, subgroup_id, title)?;
            Ok(true)
        })
        .await
    }

    pub async fn remove_group(&self, group_id: &str) -> DashboardResult<bool> {
        let removed = self
            .apply_config_mutation(|config| crud::remove_group(config, group_id))
            .await?;
        if removed {
            self.with_tree(|tree, _| tree.clear_selected_node()).await;
        }
        Ok(removed)
    }

    pub async fn remove_subgroup(&self, group_id: &str, subgroup_id: &str) -> DashboardResult<bool> {
        let removed = self
            .apply_config_mutation(|config| crud::remove_subgroup(config, group_id, subgroup_id))
            .await?;
        if removed {
            self.with_tree(|tree, _| {
                tree.selected.subgroup_id.clear();
                tree.selected.item_id.clear();
            })
            .await;
        }
        Ok(removed)
    }

    pub async fn remove_item(&self, location: &ItemLocation) -> DashboardResult<bool> {
        let removed = self
            .apply_config_mutation(|config| crud::remove_item(config, location))
            .await?;
        if removed {
            self.with_tree(|tree, _| {
                if tree.selected.item_id == location.item_id {
                    tree.selected.item_id.clear();
                }
            })
            .await;
        }
        Ok(removed)
    }

    /// Create a page and make it active
    pub async fn create_dashboard_page(&self, title: &str, raw_id: &str, icon: &str) -> DashboardResult<Option<String>> {
        let page_id = self
            .run_mutation(|config| crud::create_dashboard_page(config, title, raw_id, icon).map(Some))
            .await?;

        if let Some(page_id) = &page_id {
            self.with_tree(|tree, _| tree.active_page_id = page_id.clone()).await;
        }
        Ok(page_id)
    }

    /// Seed a config without pages; `Ok(false)` when pages already exist
    pub async fn bootstrap_initial_dashboard(&self) -> DashboardResult<bool> {
        let bootstrap = self
            .run_mutation(|config| Ok(crud::bootstrap_initial_dashboard(config)))
            .await?;

        let Some(bootstrap) = bootstrap else {
            self.with_tree(|_, _| ()).await;
            return Ok(false);
        };

        tracing::info!(page = %bootstrap.page_id, "Bootstrapped initial dashboard");
        self.with_tree(|tree, index| {
            tree.active_page_id = bootstrap.page_id.clone();
            if let Some(first) = &bootstrap.first {
                let key = group_node_key(&first.group_id);
                tree.select_item_node(index, &key, &first.subgroup_id, &first.item_id);
            }
        })
        .await;
        Ok(true)
    }

    /// Run `f` against the navigation state, then reconcile it with the tree
    ///
    /// Returns `None` when no config is loaded.
    pub async fn with_tree<R>(&self, f: impl FnOnce(&mut TreeState, &TreeIndex<'_>) -> R) -> Option<R> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let config = inner.config.as_ref()?;

        let index = TreeIndex::build(config);
        let result = f(&mut inner.tree, &index);

        inner.tree.ensure_active_page(config);
        let groups = tree_groups(config, &index, &inner.tree.active_page_id);
        inner.tree.sync_tree_groups(&groups);
        Some(result)
    }

    pub async fn set_tree_filter(&self, query: &str) {
        self.inner.write().await.tree_filter = query.to_string();
    }

    /// Set the site filter; unknown sites fall back to `all`
    pub async fn set_site_filter(&self, site: &str) {
        let mut inner = self.inner.write().await;
        let normalized = match inner.config.as_ref() {
            Some(config) => normalize_site_filter(site, &site_filter_options(config)),
            None => SITE_FILTER_ALL.to_string(),
        };
        inner.site_filter = normalized;
    }

    /// Navigation tree of the active page after site and text filters
    pub async fn filtered_tree_groups(&self) -> Vec<TreeGroupNode> {
        let inner = self.inner.read().await;
        let Some(config) = inner.config.as_ref() else {
            return Vec::new();
        };
        let index = TreeIndex::build(config);
        let groups = tree_groups(config, &index, &inner.tree.active_page_id);
        filtered_tree_groups(groups, &inner.site_filter, &inner.tree_filter)
    }

    /// Command palette results for a query, honoring the site filter
    pub async fn search_palette(&self, query: &str) -> Vec<PaletteEntry> {
        let inner = self.inner.read().await;
        let Some(config) = inner.config.as_ref() else {
            return Vec::new();
        };
        let index = TreeIndex::build(config);
        let entries = command_palette_entries(config, &index, &inner.site_filter);
        search_command_palette(&entries, query).into_iter().cloned().collect()
    }

    /// Snapshot of the navigation state for persistence
    pub async fn ui_snapshot(&self) -> PersistedUiState {
        let inner = self.inner.read().await;
        PersistedUiState {
            active_page_id: inner.tree.active_page_id.clone(),
            tree_filter: inner.tree_filter.clone(),
            site_filter: inner.site_filter.clone(),
            selected_node: inner.tree.selected.clone(),
            expanded_groups: inner.tree.expanded_groups.clone(),
            ..Default::default()
        }
    }

    /// Restore navigation state saved by [`ui_snapshot`](Self::ui_snapshot)
    ///
    /// Stale pages, keys and selections are repaired against the live tree.
    pub async fn restore_ui_state(&self, snapshot: &PersistedUiState) {
        {
            let mut inner = self.inner.write().await;
            inner.tree = TreeState {
                active_page_id: snapshot.active_page_id.clone(),
                expanded_groups: snapshot.expanded_groups.clone(),
                selected: snapshot.selected_node.clone(),
            };
            inner.tree_filter = snapshot.tree_filter.clone();
            inner.site_filter = match inner.config.as_ref() {
                Some(config) => normalize_site_filter(&snapshot.site_filter, &site_filter_options(config)),
                None => SITE_FILTER_ALL.to_string(),
            };
            inner.refresh_tree();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ConfigUpdate;
    use crate::tree::types::{Group, Item, LayoutBlock, LayoutPage, Subgroup};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockBackend {
        config: std::sync::Mutex<Option<DashboardConfig>>,
        fail_updates: AtomicBool,
        echo: AtomicBool,
        updates: AtomicUsize,
    }

    impl MockBackend {
        fn with_config(config: DashboardConfig) -> Arc<Self> {
            let backend = Self::default();
            *backend.config.lock().unwrap() = Some(config);
            Arc::new(backend)
        }
    }

    #[async_trait]
    impl ConfigBackend for MockBackend {
        async fn fetch_config(&self) -> Result<DashboardConfig, RemoteError> {
            self.config.lock().unwrap().clone().ok_or_else(|| RemoteError::Http {
                status: 404,
                message: "Config not found".to_string(),
            })
        }

        async fn update_config(&self, config: &DashboardConfig) -> Result<ConfigUpdate, RemoteError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(RemoteError::Network {
                    message: "connection refused".to_string(),
                });
            }

            let mut stored = config.clone();
            if self.echo.load(Ordering::SeqCst) {
                stored.extra.insert("revision".to_string(), serde_json::json!(2));
            }
            *self.config.lock().unwrap() = Some(stored.clone());
            Ok(ConfigUpdate {
                config: self.echo.load(Ordering::SeqCst).then_some(stored),
            })
        }
    }

    fn sample() -> DashboardConfig {
        let mut config = DashboardConfig {
            groups: vec![
                Group::new("A", "Alpha").subgroup(
                    Subgroup::new("S1", "One")
                        .item(Item::link("I1", "Item 1", "https://one.lan"))
                        .item(Item::link("I2", "Item 2", "https://two.lan")),
                ),
                Group::new("B", "Beta").subgroup(Subgroup::new("S2", "Two")),
            ],
            ..Default::default()
        };
        config.layout.pages = vec![LayoutPage::new("home", "Home").block(LayoutBlock::groups(["A", "B"]))];
        config
    }

    async fn loaded_store(backend: Arc<MockBackend>) -> DashboardStore {
        let store = DashboardStore::new(backend, StoreSettings::default());
        store.load_config().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_load_config() {
        let store = loaded_store(MockBackend::with_config(sample())).await;

        let tree = store.tree_state().await;
        assert_eq!(tree.active_page_id, "home");
        assert_eq!(tree.expanded_groups.get("group:A"), Some(&true));
        assert_eq!(store.save_state().await.status, SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_load_failure_clears_config() {
        let store = DashboardStore::new(Arc::new(MockBackend::default()), StoreSettings::default());
        let err = store.load_config().await.unwrap_err();

        assert_eq!(err.status(), 404);
        assert!(store.config().await.is_none());
        assert_eq!(store.load_error().await.as_deref(), Some("Config not found"));
        assert!(!store.move_group("B", "A").await.unwrap());
    }

    #[tokio::test]
    async fn test_mutation_persists() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;

        assert!(store.move_group("B", "A").await.unwrap());

        let config = store.config().await.unwrap();
        assert_eq!(config.groups[0].id, "B");
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
        let stored = backend.config.lock().unwrap().clone().unwrap();
        assert_eq!(stored, config);
        let save = store.save_state().await;
        assert_eq!(save.status, SaveStatus::Saved);
        assert!(save.last_saved_at.is_some());
    }

    #[tokio::test]
    async fn test_unresolved_move_skips_persist() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;

        assert!(!store.move_group("A", "A").await.unwrap());
        assert_eq!(backend.updates.load(Ordering::SeqCst), 0);
        assert_eq!(store.save_state().await.status, SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;
        let before = store.config().await.unwrap();
        backend.fail_updates.store(true, Ordering::SeqCst);

        let source = ItemLocation::new("A", "S1", "I1");
        let err = store.move_item_to_subgroup_end(&source, "B", "S2").await.unwrap_err();

        assert!(matches!(err, DashboardError::Remote(RemoteError::Network { .. })));
        assert_eq!(store.config().await.unwrap(), before);
        let save = store.save_state().await;
        assert_eq!(save.status, SaveStatus::Error);
        assert!(save.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_validation_error_leaves_config() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;
        let before = store.config().await.unwrap();

        let result = store
            .apply_config_mutation(|config| {
                config.groups.clear();
                Err(TreeError::LastRemaining("group"))
            })
            .await;

        assert_eq!(result, Err(DashboardError::Validation(TreeError::LastRemaining("group"))));
        assert_eq!(store.config().await.unwrap(), before);
        assert_eq!(backend.updates.load(Ordering::SeqCst), 0);
        assert_eq!(store.save_state().await.status, SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_move_keeps_source_item() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;

        let first = ItemLocation::new("A", "S1", "I1");
        assert!(store.move_item_to_subgroup_end(&first, "B", "S2").await.unwrap());
        let before = store.config().await.unwrap();

        let last = ItemLocation::new("A", "S1", "I2");
        let err = store.move_item_to_subgroup_end(&last, "B", "S2").await.unwrap_err();
        assert_eq!(err, DashboardError::Validation(TreeError::LastRemaining("item")));

        let target = ItemLocation::new("B", "S2", "I1");
        let err = store.move_item_before(&last, &target).await.unwrap_err();
        assert_eq!(err, DashboardError::Validation(TreeError::LastRemaining("item")));

        assert_eq!(store.config().await.unwrap(), before);
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);

        // unresolved targets still report "nothing moved"
        assert!(!store.move_item_to_subgroup_end(&last, "B", "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_move_keeps_source_subgroup() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;
        let before = store.config().await.unwrap();

        let err = store.move_subgroup("A", "S1", "B", "S2").await.unwrap_err();
        assert_eq!(err, DashboardError::Validation(TreeError::LastRemaining("subgroup")));
        let err = store.move_subgroup("B", "S2", "A", "").await.unwrap_err();
        assert_eq!(err, DashboardError::Validation(TreeError::LastRemaining("subgroup")));

        assert_eq!(store.config().await.unwrap(), before);
        assert_eq!(backend.updates.load(Ordering::SeqCst), 0);
        assert_eq!(store.save_state().await.status, SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_mutation_normalizes_layout() {
        let store = loaded_store(MockBackend::with_config(sample())).await;

        let removed = store.remove_group("B").await.unwrap();
        assert!(removed);

        let config = store.config().await.unwrap();
        assert_eq!(config.layout.pages[0].blocks[0].group_ids().unwrap(), ["A".to_string()]);
        assert!(!store.tree_state().await.expanded_groups.contains_key("group:B"));
    }

    #[tokio::test]
    async fn test_adopts_echoed_config() {
        let backend = MockBackend::with_config(sample());
        backend.echo.store(true, Ordering::SeqCst);
        let store = loaded_store(backend).await;

        assert!(store.rename_subgroup("A", "S1", "Primary").await.unwrap());
        let config = store.config().await.unwrap();
        assert_eq!(config.extra.get("revision"), Some(&serde_json::json!(2)));
        assert_eq!(config.groups[0].subgroups[0].title, "Primary");
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_status_resets_to_idle() {
        let store = loaded_store(MockBackend::with_config(sample())).await;

        assert!(store.move_group("B", "A").await.unwrap());
        assert_eq!(store.save_state().await.status, SaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_state().await.status, SaveStatus::Saved);

        // a second save restarts the countdown
        assert!(store.move_group("A", "B").await.unwrap());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_state().await.status, SaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.save_state().await.status, SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_sticky() {
        let backend = MockBackend::with_config(sample());
        let store = loaded_store(backend.clone()).await;
        backend.fail_updates.store(true, Ordering::SeqCst);

        assert!(store.move_group("B", "A").await.is_err());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.save_state().await.status, SaveStatus::Error);

        backend.fail_updates.store(false, Ordering::SeqCst);
        assert!(store.move_group("B", "A").await.unwrap());
        assert_eq!(store.save_state().await.status, SaveStatus::Saved);
        assert!(store.save_state().await.error.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_mutations_serialize() {
        let backend = MockBackend::with_config(sample());
        let store = Arc::new(loaded_store(backend.clone()).await);

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.move_group("B", "A").await })
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.rename_subgroup("A", "S1", "Renamed").await })
        };

        assert!(first.await.unwrap().unwrap());
        assert!(second.await.unwrap().unwrap());

        let config = store.config().await.unwrap();
        assert_eq!(config.groups[0].id, "B");
        assert_eq!(config.groups[1].subgroups[0].title, "Renamed");
        assert_eq!(backend.updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_add_group_selects_new_item() {
        let store = loaded_store(MockBackend::with_config(sample())).await;
        let created = store
            .add_group(&GroupDraft {
                title: "Home Lab".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        let tree = store.tree_state().await;
        assert!(tree.is_item_selected(&created.item_id));
        assert_eq!(tree.selected.group_key, "group:home-lab");
        assert!(tree.is_group_expanded("group:home-lab"));
    }

    #[tokio::test]
    async fn test_submit_item_create_and_edit() {
        let store = loaded_store(MockBackend::with_config(sample())).await;
        let draft = ItemDraft {
            title: "Grafana".to_string(),
            url: "grafana.lan".to_string(),
            ..Default::default()
        };

        let id = store.submit_item(None, "B", "S2", &draft).await.unwrap().unwrap();
        assert_eq!(id, "s2-grafana");

        let edited = ItemDraft {
            id: id.clone(),
            title: "Grafana (prod)".to_string(),
            ..draft.clone()
        };
        let source = ItemLocation::new("B", "S2", &id);
        let same = store.submit_item(Some(&source), "B", "S2", &edited).await.unwrap().unwrap();
        assert_eq!(same, id);

        let config = store.config().await.unwrap();
        assert_eq!(config.groups[1].subgroups[0].items[0].title, "Grafana (prod)");
        assert!(store.tree_state().await.is_item_selected(&id));
    }

    #[tokio::test]
    async fn test_bootstrap_and_pages() {
        let store = loaded_store(MockBackend::with_config(DashboardConfig::default())).await;

        assert!(store.bootstrap_initial_dashboard().await.unwrap());
        assert!(!store.bootstrap_initial_dashboard().await.unwrap());

        let tree = store.tree_state().await;
        assert_eq!(tree.active_page_id, "home");
        assert!(tree.is_item_selected("core-main-service"));

        let page = store.create_dashboard_page("Ops", "", "").await.unwrap().unwrap();
        assert_eq!(page, "ops");
        assert_eq!(store.tree_state().await.active_page_id, "ops");
    }

    #[tokio::test]
    async fn test_ui_state_snapshot_restore() {
        let store = loaded_store(MockBackend::with_config(sample())).await;
        store
            .with_tree(|tree, index| tree.select_subgroup_node(index, "group:A", "S1"))
            .await;
        store.set_tree_filter("item").await;

        let snapshot = store.ui_snapshot().await;
        assert_eq!(snapshot.selected_node.subgroup_id, "S1");

        let other = loaded_store(MockBackend::with_config(sample())).await;
        let mut stale = snapshot.clone();
        stale.active_page_id = "gone".to_string();
        stale.expanded_groups.insert("group:ghost".to_string(), true);
        other.restore_ui_state(&stale).await;

        let tree = other.tree_state().await;
        assert_eq!(tree.active_page_id, "home");
        assert!(!tree.expanded_groups.contains_key("group:ghost"));
        assert!(tree.is_subgroup_selected("group:A", "S1"));
        assert_eq!(other.filtered_tree_groups().await.len(), 1);
    }

    #[tokio::test]
    async fn test_site_filter_and_palette() {
        let mut config = sample();
        config.groups[0].subgroups[0].items[0].site = Some("Paris".to_string());
        let store = loaded_store(MockBackend::with_config(config)).await;

        store.set_site_filter("Tokyo").await;
        assert_eq!(store.ui_snapshot().await.site_filter, "all");

        store.set_site_filter("PARIS").await;
        let groups = store.filtered_tree_groups().await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].subgroups[0].items.len(), 1);

        let results = store.search_palette("item").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "I1");
    }
}
