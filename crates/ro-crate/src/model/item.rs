//! Property values for crate entities.
//!
//! JSON-LD shorthand allows a property to hold a bare literal, a bare
//! reference object, or a list mixing both. The model keeps that shape
//! explicit: each list member is an [`Item`] (literal or reference) and
//! the whole property is a [`PropertyValue`] (single or list).

use serde_json::{Map, Value, json};

/// One member of a property value: a literal JSON value or a
/// cross-reference to another entity.
///
/// A JSON object is a reference exactly when it has the single key
/// `@id` holding a string; every other JSON value is a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A literal value (string, number, bool, or a non-reference object).
    Literal(Value),
    /// A reference record `{"@id": "<id>"}` pointing at another entity.
    Reference(String),
}

impl Item {
    /// Creates a reference item pointing at `id`.
    pub fn reference(id: impl Into<String>) -> Item {
        Item::Reference(id.into())
    }

    /// Creates a literal item.
    pub fn literal(value: impl Into<Value>) -> Item {
        Item::Literal(value.into())
    }

    /// Classifies a decoded JSON value.
    pub fn from_json(value: Value) -> Item {
        match reference_id(&value) {
            Some(id) => Item::Reference(id.to_string()),
            None => Item::Literal(value),
        }
    }

    /// Encodes this item back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Item::Literal(value) => value.clone(),
            Item::Reference(id) => json!({ "@id": id }),
        }
    }

    /// Returns the referenced id when this item is a reference.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Item::Reference(id) => Some(id),
            Item::Literal(_) => None,
        }
    }

    /// Returns true for [`Item::Reference`].
    pub fn is_reference(&self) -> bool {
        matches!(self, Item::Reference(_))
    }
}

/// Returns the target id when `value` is a reference record.
fn reference_id(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("@id")?.as_str()
}

/// The stored value of one entity property.
///
/// Loading normalizes every property to the `List` form; saving
/// collapses one-element lists back to `Single` (except `hasPart`).
/// `Single` therefore shows up freshly set properties and denormalized
/// documents, `List` everything the pair protocol manages.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A bare literal or reference, JSON-LD shorthand for one value.
    Single(Item),
    /// An ordered list of literal-or-reference pairs.
    List(Vec<Item>),
}

impl PropertyValue {
    /// Creates a single-reference value, the shape `add_profile` emits.
    pub fn reference(id: impl Into<String>) -> PropertyValue {
        PropertyValue::Single(Item::reference(id))
    }

    /// Classifies a decoded JSON property value.
    pub fn from_json(value: Value) -> PropertyValue {
        match value {
            Value::Array(items) => {
                PropertyValue::List(items.into_iter().map(Item::from_json).collect())
            }
            other => PropertyValue::Single(Item::from_json(other)),
        }
    }

    /// Encodes this value back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Single(item) => item.to_json(),
            PropertyValue::List(items) => Value::Array(items.iter().map(Item::to_json).collect()),
        }
    }

    /// Returns the list items when this value is a list.
    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            PropertyValue::List(items) => Some(items),
            PropertyValue::Single(_) => None,
        }
    }

    /// Extracts the single reference target, accepting both the bare
    /// shorthand and the normalized one-element list.
    pub fn single_reference(&self) -> Option<&str> {
        match self {
            PropertyValue::Single(item) => item.as_reference(),
            PropertyValue::List(items) => match items.as_slice() {
                [item] => item.as_reference(),
                _ => None,
            },
        }
    }

    /// Extracts the single string literal, accepting both the bare
    /// shorthand and the normalized one-element list.
    pub fn single_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Single(Item::Literal(value)) => value.as_str(),
            PropertyValue::List(items) => match items.as_slice() {
                [Item::Literal(value)] => value.as_str(),
                _ => None,
            },
            _ => None,
        }
    }

    /// All reference targets carried by this value, in order.
    pub fn reference_targets(&self) -> Vec<&str> {
        match self {
            PropertyValue::Single(item) => item.as_reference().into_iter().collect(),
            PropertyValue::List(items) => items.iter().filter_map(Item::as_reference).collect(),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> PropertyValue {
        PropertyValue::from_json(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> PropertyValue {
        PropertyValue::Single(Item::Literal(Value::String(value.to_string())))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> PropertyValue {
        PropertyValue::Single(Item::Literal(Value::String(value)))
    }
}

impl From<Item> for PropertyValue {
    fn from(item: Item) -> PropertyValue {
        PropertyValue::Single(item)
    }
}

impl From<Vec<Item>> for PropertyValue {
    fn from(items: Vec<Item>) -> PropertyValue {
        PropertyValue::List(items)
    }
}

impl From<Map<String, Value>> for PropertyValue {
    fn from(map: Map<String, Value>) -> PropertyValue {
        PropertyValue::Single(Item::from_json(Value::Object(map)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_classification() {
        assert_eq!(
            Item::from_json(json!({ "@id": "#alice" })),
            Item::Reference("#alice".to_string())
        );
        // extra keys make the object a literal, not a reference
        assert_eq!(
            Item::from_json(json!({ "@id": "#alice", "name": "Alice" })),
            Item::Literal(json!({ "@id": "#alice", "name": "Alice" }))
        );
        assert_eq!(
            Item::from_json(json!("plain")),
            Item::Literal(json!("plain"))
        );
    }

    #[test]
    fn test_property_value_from_json() {
        let value = PropertyValue::from_json(json!([{ "@id": "#a" }, "literal"]));
        assert_eq!(
            value.as_list().unwrap(),
            &[Item::reference("#a"), Item::literal("literal")]
        );

        let single = PropertyValue::from_json(json!({ "@id": "./" }));
        assert_eq!(single.single_reference(), Some("./"));
    }

    #[test]
    fn test_single_extraction_accepts_both_shapes() {
        let bare = PropertyValue::from_json(json!("2024-01-01"));
        let wrapped = PropertyValue::List(vec![Item::literal("2024-01-01")]);
        assert_eq!(bare.single_str(), Some("2024-01-01"));
        assert_eq!(wrapped.single_str(), Some("2024-01-01"));

        let bare_ref = PropertyValue::reference("./");
        let wrapped_ref = PropertyValue::List(vec![Item::reference("./")]);
        assert_eq!(bare_ref.single_reference(), Some("./"));
        assert_eq!(wrapped_ref.single_reference(), Some("./"));

        let two = PropertyValue::List(vec![Item::reference("a"), Item::reference("b")]);
        assert_eq!(two.single_reference(), None);
        assert_eq!(two.reference_targets(), vec!["a", "b"]);
    }

    #[test]
    fn test_round_trip() {
        let original = json!([{ "@id": "#a" }, "x", 3, { "nested": true }]);
        let value = PropertyValue::from_json(original.clone());
        assert_eq!(value.to_json(), original);
    }
}
