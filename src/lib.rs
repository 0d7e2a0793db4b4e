//! # Atelier
//!
//! 成衣工坊報價與用料核算引擎
//!
//! - [`model`]：資料模型、配置與錯誤類型
//! - [`calc`]：報價、用料彙總、採購清單與差異核對
//! - [`cache`]：量身記錄異動後的重算與寫回

pub use atelier_cache as cache;
pub use atelier_calc as calc;
pub use atelier_core as model;

pub use atelier_cache::{AggregateRefresher, FittingEvent, InMemoryStore};
pub use atelier_calc::{CostingEngine, CostingReport};
pub use atelier_core::{CostingConfig, CostingError, Result};
