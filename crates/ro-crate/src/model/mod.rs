//! Data model types for the metadata graph.
//!
//! - [`Entity`]: one graph node (id, types, properties)
//! - [`Item`] / [`PropertyValue`]: literal-or-reference property values
//! - [`factory`]: typed constructors for the common node kinds

pub mod entity;
pub mod factory;
pub mod item;

pub use entity::Entity;
pub use item::{Item, PropertyValue};
