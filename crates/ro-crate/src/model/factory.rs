//! Typed constructors for the common node kinds.
//!
//! All node kinds share the [`Entity`] representation; these functions
//! only pre-populate the fixed type list (and, for publications,
//! enforce the restricted type choice at construction).

use crate::error::{Error, Result};
use crate::model::Entity;

/// Id of the metadata descriptor node.
pub const DESCRIPTOR_ID: &str = "ro-crate-metadata.json";

/// Legacy descriptor id from RO-Crate 1.0 and before.
pub const LEGACY_DESCRIPTOR_ID: &str = "ro-crate-metadata.jsonld";

/// Id of the optional preview/website node.
pub const PREVIEW_ID: &str = "ro-crate-preview.html";

/// Default id of the root dataset.
pub const ROOT_ID: &str = "./";

/// Creates the metadata descriptor (`CreativeWork`).
pub fn descriptor() -> Entity {
    Entity::new(DESCRIPTOR_ID, ["CreativeWork"])
}

/// Creates a dataset (directory) entity.
pub fn dataset(id: impl Into<String>) -> Entity {
    Entity::new(id, ["Dataset"])
}

/// Creates the root dataset with the default id `./`.
pub fn root_dataset() -> Entity {
    dataset(ROOT_ID)
}

/// Creates a file data entity.
pub fn file(id: impl Into<String>) -> Entity {
    Entity::new(id, ["File"])
}

/// Creates a person contextual entity.
pub fn person(id: impl Into<String>) -> Entity {
    Entity::new(id, ["Person"])
}

/// Creates an organization contextual entity.
pub fn organization(id: impl Into<String>) -> Entity {
    Entity::new(id, ["Organization"])
}

/// Creates a contact point contextual entity.
pub fn contact_point(id: impl Into<String>) -> Entity {
    Entity::new(id, ["ContactPoint"])
}

/// Creates a place contextual entity.
pub fn place(id: impl Into<String>) -> Entity {
    Entity::new(id, ["Place"])
}

/// Creates a contextual entity with an arbitrary type list.
pub fn contextual(
    id: impl Into<String>,
    types: impl IntoIterator<Item = impl Into<String>>,
) -> Entity {
    Entity::new(id, types)
}

/// Creates a publication entity.
///
/// Only `ScholarlyArticle` and `CreativeWork` are allowed as the
/// semantic type; anything else fails with
/// [`Error::PublicationType`].
pub fn publication(id: impl Into<String>, semantic_type: &str) -> Result<Entity> {
    if semantic_type != "ScholarlyArticle" && semantic_type != "CreativeWork" {
        return Err(Error::PublicationType(semantic_type.to_string()));
    }
    Ok(Entity::new(id, [semantic_type]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_types() {
        assert_eq!(descriptor().types(), &["CreativeWork"]);
        assert_eq!(descriptor().id(), DESCRIPTOR_ID);
        assert_eq!(root_dataset().id(), ROOT_ID);
        assert_eq!(root_dataset().types(), &["Dataset"]);
        assert_eq!(file("data.csv").types(), &["File"]);
        assert_eq!(person("#alice").types(), &["Person"]);
        assert_eq!(contact_point("#mail").types(), &["ContactPoint"]);
    }

    #[test]
    fn test_publication_type_restriction() {
        assert_eq!(
            publication("#paper", "ScholarlyArticle").unwrap().types(),
            &["ScholarlyArticle"]
        );
        assert!(publication("#paper", "CreativeWork").is_ok());
        assert!(matches!(
            publication("#paper", "Dataset"),
            Err(Error::PublicationType(_))
        ));
    }
}
