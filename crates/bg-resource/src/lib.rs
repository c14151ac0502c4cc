//! bg-resource: lazily loaded, shared component and connector types.
//!
//! Provides:
//! - `ResourceCache`, a type-erased registry of loaders with a weak-reference
//!   cache per resource type
//! - `ComponentType` / `ConnectorType` resources and their loaders
//! - dotted resource ids and their on-disk paths
//! - asset directory configuration
//!
//! # Example
//!
//! ```no_run
//! use bg_resource::{AssetConfig, ComponentType, ResourceCache};
//!
//! let cache = ResourceCache::with_assets(&AssetConfig::default());
//! let resistor = cache.get::<ComponentType>("passive.resistor_0805").unwrap();
//! println!("{} has {} ports", resistor.name(), resistor.ports().len());
//! ```

pub mod cache;
pub mod component;
pub mod config;
pub mod connector;
pub mod error;
pub mod id;
pub mod purchase;
mod scan;

// Re-exports for ergonomics
pub use cache::{RESOURCE_EXTENSION, ResourceCache, ResourceLoader, ResourceTypeId};
pub use component::{ComponentLoader, ComponentType, Port, PortIdx};
pub use config::AssetConfig;
pub use connector::{ConnectorLoader, ConnectorType};
pub use error::{LoadError, ResourceError, ResourceResult};
pub use purchase::{PurchaseData, PurchaseItem};
