//! The graph node abstraction: identity, type list, property map.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::model::{Item, PropertyValue};

/// One JSON-LD graph member with an id, an ordered set of types and a
/// key-value property map.
///
/// Entities are exclusively owned by a [`crate::RoCrate`], keyed by id.
/// All node kinds (dataset, file, person, ...) share this one
/// representation and differ only in their type list; see
/// [`crate::model::factory`] for the typed constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: String,
    types: Vec<String>,
    properties: IndexMap<String, PropertyValue>,
}

impl Entity {
    /// Creates an entity with the given id and type list.
    pub fn new(id: impl Into<String>, types: impl IntoIterator<Item = impl Into<String>>) -> Entity {
        Entity {
            id: id.into(),
            types: types.into_iter().map(Into::into).collect(),
            properties: IndexMap::new(),
        }
    }

    /// Returns the entity id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the entity id.
    ///
    /// The owning crate keys entities by the id they were registered
    /// under; renaming a registered entity leaves the registry key
    /// untouched and is caught by the duplicate-id validation rule.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Entity {
        self.id = id.into();
        self
    }

    /// Returns the type list in insertion order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Replaces the whole type list.
    pub fn set_types(&mut self, types: impl IntoIterator<Item = impl Into<String>>) -> &mut Entity {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a type, silently skipping duplicates.
    pub fn add_type(&mut self, ty: impl Into<String>) -> &mut Entity {
        let ty = ty.into();
        if !self.types.contains(&ty) {
            self.types.push(ty);
        }
        self
    }

    /// Removes a type, silently skipping absent ones.
    pub fn remove_type(&mut self, ty: &str) -> &mut Entity {
        self.types.retain(|t| t != ty);
        self
    }

    /// Returns true when `ty` is one of the entity's types.
    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }

    /// Returns the stored value for `key`, or `None` when absent.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Returns the full property map in insertion order.
    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// Returns true when the entity carries `key`.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Sets `key` to `value`, overwriting any previous value.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> &mut Entity {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Removes `key` entirely, silently skipping absent keys.
    pub fn remove_property(&mut self, key: &str) -> &mut Entity {
        self.properties.shift_remove(key);
        self
    }

    /// Appends one literal-or-reference pair to a list-valued property.
    ///
    /// `is_reference` selects the pair shape: `Some(true)` appends a
    /// reference to `value`, `Some(false)` the literal `value`, and
    /// `None` infers the shape from the list's first element. A pair
    /// already present is skipped. When `key` is unset, an explicit
    /// shape creates a fresh one-element list; without one the call is
    /// a no-op, since the shape of the new list is unknowable. Appending
    /// into a scalar-valued or emptied property is also a no-op.
    pub fn add_property_pair(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        is_reference: Option<bool>,
    ) -> &mut Entity {
        let value = value.into();

        let Some(existing) = self.properties.get_mut(key) else {
            if let Some(as_reference) = is_reference {
                let item = make_item(value, as_reference);
                self.properties
                    .insert(key.to_string(), PropertyValue::List(vec![item]));
            }
            return self;
        };

        let PropertyValue::List(items) = existing else {
            return self;
        };
        if items.is_empty() {
            return self;
        }

        let as_reference = match is_reference {
            Some(flag) => flag,
            None => items[0].is_reference(),
        };
        let item = make_item(value, as_reference);
        if !items.contains(&item) {
            items.push(item);
        }
        self
    }

    /// Removes one pair from a list-valued property.
    ///
    /// The list is searched first for a literal equal to `value`, then
    /// for a reference to `value`; the first match is removed and the
    /// remaining items close the gap in order. Removing the last pair
    /// deletes the property. Unset or non-list properties are left
    /// untouched.
    pub fn remove_property_pair(&mut self, key: &str, value: impl Into<Value>) -> &mut Entity {
        let value = value.into();

        let Some(PropertyValue::List(items)) = self.properties.get_mut(key) else {
            return self;
        };

        let literal = Item::Literal(value.clone());
        let reference = make_item(value, true);
        let position = items
            .iter()
            .position(|item| *item == literal)
            .or_else(|| items.iter().position(|item| *item == reference));
        if let Some(index) = position {
            items.remove(index);
            if items.is_empty() {
                self.properties.shift_remove(key);
            }
        }
        self
    }

    /// Encodes this entity as a graph node: `@id`, `@type` (omitted
    /// when the type list is empty) and every property in order.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut node = Map::new();
        node.insert("@id".to_string(), Value::String(self.id.clone()));
        if !self.types.is_empty() {
            node.insert(
                "@type".to_string(),
                Value::Array(self.types.iter().cloned().map(Value::String).collect()),
            );
        }
        for (key, value) in &self.properties {
            node.insert(key.clone(), value.to_json());
        }
        node
    }

    pub(crate) fn properties_mut(&mut self) -> &mut IndexMap<String, PropertyValue> {
        &mut self.properties
    }
}

/// Builds the pair item for `value` in the requested shape. References
/// take the string form of the value.
fn make_item(value: Value, as_reference: bool) -> Item {
    if as_reference {
        let id = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Item::Reference(id)
    } else {
        Item::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn targets(entity: &Entity, key: &str) -> Vec<String> {
        entity
            .property(key)
            .and_then(PropertyValue::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_reference().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_add_type_skips_duplicates() {
        let mut person = Entity::new("#alice", ["Person"]);
        person.add_type("Person").add_type("Creator");
        assert_eq!(person.types(), &["Person", "Creator"]);
        person.remove_type("Creator").remove_type("Missing");
        assert_eq!(person.types(), &["Person"]);
    }

    #[test]
    fn test_add_property_pair_creates_and_infers() {
        let mut root = Entity::new("./", ["Dataset"]);
        // unknown shape on a fresh property: no-op
        root.add_property_pair("creator", "#alice", None);
        assert!(root.property("creator").is_none());

        root.add_property_pair("creator", "#alice", Some(true));
        root.add_property_pair("creator", "#bob", None);
        root.add_property_pair("creator", "#bob", None); // duplicate skipped
        assert_eq!(targets(&root, "creator"), ["#alice", "#bob"]);
    }

    #[test]
    fn test_add_property_pair_literal_inference() {
        let mut author = Entity::new("#bob", ["Person"]);
        // starts empty, so the first call without a flag is a no-op
        author.add_property_pair("knows", "#alan", None);
        author.add_property_pair("knows", "#alice", Some(false));
        author
            .add_property_pair("knows", "#alice", None)
            .add_property_pair("knows", "#cathy", None);

        let items = author.property("knows").unwrap().as_list().unwrap();
        assert_eq!(items[0], Item::literal("#alice"));
        assert_eq!(items[1], Item::literal("#cathy"));
    }

    #[test]
    fn test_add_property_pair_ignores_scalars_and_emptied_lists() {
        let mut entity = Entity::new("#x", ["Thing"]);
        entity.set_property("name", "fixed");
        entity.add_property_pair("name", "other", Some(false));
        assert_eq!(entity.property("name").unwrap().single_str(), Some("fixed"));

        entity.set_property("tags", PropertyValue::List(vec![]));
        entity.add_property_pair("tags", "a", Some(false));
        assert_eq!(entity.property("tags").unwrap().as_list().unwrap().len(), 0);
    }

    #[test]
    fn test_remove_property_pair_repacks_and_deletes() {
        let mut root = Entity::new("./", ["Dataset"]);
        root.set_property("creator", json!([{ "@id": "#cathy" }, { "@id": "#alice" }]));
        root.remove_property_pair("creator", "#bob"); // absent: no-op
        root.remove_property_pair("creator", "#cathy");
        assert_eq!(targets(&root, "creator"), ["#alice"]);

        root.remove_property_pair("creator", "#alice");
        assert!(root.property("creator").is_none());
    }

    #[test]
    fn test_remove_property_pair_prefers_literal_match() {
        let mut entity = Entity::new("#x", ["Thing"]);
        entity.set_property("mixed", json!(["#a", { "@id": "#a" }]));
        entity.remove_property_pair("mixed", "#a");
        let items = entity.property("mixed").unwrap().as_list().unwrap();
        assert_eq!(items, &[Item::reference("#a")]);
    }

    #[test]
    fn test_pair_protocol_reference_scenario() {
        let mut root = Entity::new("./", ["Dataset"]);
        root.add_property_pair("creator", "#alice", Some(true))
            .add_property_pair("creator", "#bob", None)
            .add_property_pair("creator", "#cathy", None)
            .remove_property_pair("creator", "#alice")
            .add_property_pair("creator", "#alice", Some(true))
            .add_property_pair("creator", "#bob", None);

        assert_eq!(targets(&root, "creator"), ["#bob", "#cathy", "#alice"]);
    }

    #[test]
    fn test_to_json_shape() {
        let mut entity = Entity::new("#alice", ["Person"]);
        entity.set_property("name", "Alice Smith");
        let node = entity.to_json();
        assert_eq!(node["@id"], json!("#alice"));
        assert_eq!(node["@type"], json!(["Person"]));
        assert_eq!(node["name"], json!("Alice Smith"));

        let untyped = Entity::new("#t", Vec::<String>::new()).to_json();
        assert!(!untyped.contains_key("@type"));
    }
}
