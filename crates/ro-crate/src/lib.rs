//! RO-Crate metadata documents as a typed entity graph.
//!
//! An RO-Crate packages research data with JSON-LD metadata: one
//! `ro-crate-metadata.json` document whose `@graph` holds a metadata
//! descriptor, a root dataset and any number of data and contextual
//! entities. This crate models that document in memory, loads and
//! saves it, and validates it against the RO-Crate 1.2 profile.
//!
//! # Quick start
//!
//! ```
//! use ro_crate::{RoCrate, model::factory};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut krate = RoCrate::new(dir.path()).unwrap();
//! krate.add_default_profile().unwrap();
//!
//! let root = krate.root_dataset_mut().unwrap();
//! root.set_property("name", "My Research Project")
//!     .set_property("description", "Example RO-Crate")
//!     .set_property("datePublished", "2024-01-15")
//!     .set_property("license", json!({ "@id": "https://spdx.org/licenses/MIT" }));
//!
//! let mut alice = factory::person("#alice");
//! alice.set_property("name", "Alice Smith");
//! krate.add_entity(alice).unwrap();
//! krate
//!     .root_dataset_mut()
//!     .unwrap()
//!     .add_property_pair("creator", "#alice", Some(true));
//!
//! let path = krate.save().unwrap();
//! assert!(path.exists());
//! ```
//!
//! # Modules
//!
//! - [`model`]: entities, property values and the typed constructors
//! - [`rocrate`]: the crate aggregate with load/save
//! - [`validate`]: the profile validator
//! - [`preview`]: static HTML preview generation
//! - [`util`]: ISO 8601 and URI checks, JSON flatten/unflatten

pub mod error;
pub mod model;
pub mod preview;
pub mod rocrate;
pub mod util;
pub mod validate;

#[cfg(feature = "remote")]
mod remote;

pub use error::{Error, Result};
pub use model::{Entity, Item, PropertyValue};
pub use rocrate::{CrateOptions, RoCrate};

/// Version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// RO-Crate specification version this library targets.
pub const SPEC_VERSION: &str = "1.2";
