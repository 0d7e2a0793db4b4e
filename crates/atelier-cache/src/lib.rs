//! # Atelier Cache
//!
//! 實際用量彙總的重算觸發與寫回

pub mod dirty_tracking;
pub mod refresh;
pub mod store;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use refresh::{AggregateRefresher, FittingEvent};
pub use store::{CatalogSource, FittingStore, InMemoryStore, ProjectStore};
