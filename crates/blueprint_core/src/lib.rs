//! d3-blueprint core
//!
//! The pieces every other blueprint crate builds on:
//!
//! - **Errors**: one error enum whose messages carry the `[d3-blueprint]` tag
//! - **Configuration**: a named property store with read/write transforms
//! - **Lifecycle vocabulary**: the closed set of data-join phase keys
//! - **Event dispatch**: namespaced publish/subscribe
//!
//! # Example
//!
//! ```rust
//! use blueprint_core::{ConfigDefine, ConfigManager};
//!
//! let mut config = ConfigManager::new();
//! config
//!     .define("width", ConfigDefine::new(400.0f64).setter(|w: f64| w.max(0.0)))
//!     .unwrap();
//!
//! config.set("width", -10.0f64).unwrap();
//! assert_eq!(config.get::<f64>("width").unwrap(), 0.0);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod value;

pub use config::{ConfigBatch, ConfigDefine, ConfigManager, ConfigSnapshot};
pub use error::{BlueprintError, Result, TAG};
pub use events::{Dispatcher, EventKind, EventName};
pub use lifecycle::{assert_lifecycle_event, is_valid_lifecycle_event, LifecycleEvent, Phase};
pub use value::AttrValue;
