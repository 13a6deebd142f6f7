//! Dashboard store
//!
//! Holds the committed config for one dashboard and runs every edit through
//! a transactional mutate → normalize → persist pipeline with rollback.

mod dashboard;
mod error;
mod status;

pub use dashboard::{DashboardStore, StoreSettings};
pub use error::{DashboardError, DashboardResult};
pub use status::{SaveState, SaveStatus};
