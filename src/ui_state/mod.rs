//! Persisted UI State
//!
//! Navigation state (active page, tree filter, selection, expanded groups)
//! is remembered per route in a single versioned blob:
//!
//! ```json
//! { "version": 2, "byRoute": { "/": { "activePageId": "home", ... } } }
//! ```
//!
//! Persistence is best effort. Unreadable or malformed blobs load as empty
//! state and write failures are only logged.

mod kv;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

use crate::view::SelectedNode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Storage key of the per-route UI state blob
pub const UI_STATE_STORAGE_KEY: &str = "oko:dashboard-ui-state:v1";

/// Current blob format version
pub const UI_STATE_VERSION: u32 = 2;

/// Route used for state saved before per-route scoping existed
pub const ROOT_ROUTE: &str = "/";

/// UI state remembered for one route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedUiState {
    pub active_page_id: String,
    pub tree_filter: String,
    pub site_filter: String,
    pub edit_mode: bool,
    pub selected_node: SelectedNode,
    pub expanded_groups: BTreeMap<String, bool>,

    /// Presentation preferences this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Versioned map of route → UI state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedUiStateByRoute {
    pub version: u32,
    pub by_route: BTreeMap<String, PersistedUiState>,
}

impl Default for PersistedUiStateByRoute {
    fn default() -> Self {
        Self {
            version: UI_STATE_VERSION,
            by_route: BTreeMap::new(),
        }
    }
}

impl PersistedUiStateByRoute {
    /// Decode a stored blob, accepting the legacy single-snapshot shape
    pub fn from_json(raw: &str) -> Self {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable UI state");
                return Self::default();
            }
        };
        let Value::Object(record) = parsed else {
            return Self::default();
        };

        match record.get("byRoute") {
            Some(Value::Object(raw_by_route)) => {
                let by_route = raw_by_route
                    .iter()
                    .filter(|(route, _)| !route.trim().is_empty())
                    .filter_map(|(route, snapshot)| {
                        if !snapshot.is_object() {
                            return None;
                        }
                        serde_json::from_value(snapshot.clone())
                            .ok()
                            .map(|state| (route.trim().to_string(), state))
                    })
                    .collect();

                let version = record
                    .get("version")
                    .and_then(Value::as_u64)
                    .filter(|v| *v > 0)
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(UI_STATE_VERSION);

                Self { version, by_route }
            }
            _ => match serde_json::from_value::<PersistedUiState>(Value::Object(record)) {
                Ok(legacy) => {
                    let mut state = Self::default();
                    state.by_route.insert(ROOT_ROUTE.to_string(), legacy);
                    state
                }
                Err(_) => Self::default(),
            },
        }
    }

    /// Snapshot for a route, falling back to the root route
    pub fn snapshot_for(&self, route: &str) -> Option<&PersistedUiState> {
        self.by_route
            .get(&resolve_ui_route_key(route))
            .or_else(|| self.by_route.get(ROOT_ROUTE))
    }
}

/// Normalize a route into a UI state key
///
/// Drops query and fragment, forces a leading `/`, strips a trailing `/` and
/// maps anything empty to `/`.
pub fn resolve_ui_route_key(route: &str) -> String {
    let trimmed = route.trim();
    let base = trimmed.split(['?', '#']).next().unwrap_or("");
    if base.is_empty() {
        return ROOT_ROUTE.to_string();
    }

    let prefixed = if base.starts_with('/') {
        base.to_string()
    } else {
        format!("/{}", base)
    };
    if prefixed.len() <= 1 {
        return ROOT_ROUTE.to_string();
    }

    match prefixed.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => prefixed,
    }
}

/// Per-route UI state backed by a [`KeyValueStore`]
pub struct UiStatePersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
    state: PersistedUiStateByRoute,
}

impl UiStatePersistence {
    /// Load the blob stored under `key`
    pub fn open(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match store.get(&key) {
            Ok(Some(raw)) => PersistedUiStateByRoute::from_json(&raw),
            Ok(None) => PersistedUiStateByRoute::default(),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "UI state unavailable");
                PersistedUiStateByRoute::default()
            }
        };

        Self { store, key, state }
    }

    pub fn state(&self) -> &PersistedUiStateByRoute {
        &self.state
    }

    /// Snapshot for a route, falling back to the root route
    pub fn snapshot_for(&self, route: &str) -> Option<&PersistedUiState> {
        self.state.snapshot_for(route)
    }

    /// Remember a snapshot for a route and write the blob
    pub fn remember(&mut self, route: &str, snapshot: PersistedUiState) {
        self.state.version = UI_STATE_VERSION;
        self.state.by_route.insert(resolve_ui_route_key(route), snapshot);
        self.flush();
    }

    fn flush(&self) {
        let payload = match serde_json::to_string(&self.state) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to encode UI state");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &payload) {
            tracing::debug!(key = %self.key, error = %e, "Failed to persist UI state");
        }
    }
}
