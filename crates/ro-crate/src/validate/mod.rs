//! Profile validation for metadata documents.
//!
//! [`validate`] inspects a [`RoCrate`] and returns human-readable
//! violation messages; an empty list means the document satisfies the
//! profile. The checks are diagnostic only and never fail: every rule
//! that cannot be evaluated (missing entity, wrong value shape) turns
//! into a message instead of an error, so callers always get the full
//! picture in one pass.
//!
//! Values are read through [`PropertyValue::single_str`] and
//! [`PropertyValue::single_reference`], so both the list-normalized
//! in-memory shape and the bare shorthand of a freshly denormalized
//! document validate identically.

use std::collections::HashSet;

use crate::model::{Entity, PropertyValue};
use crate::rocrate::RoCrate;
use crate::util::is_valid_iso8601_date;

/// Accepted targets for the `actionStatus` property of curation
/// actions, under both URI schemes in circulation.
const ACTION_STATUS_URIS: [&str; 8] = [
    "http://schema.org/ActiveActionStatus",
    "http://schema.org/CompletedActionStatus",
    "http://schema.org/FailedActionStatus",
    "http://schema.org/PotentialActionStatus",
    "https://schema.org/ActiveActionStatus",
    "https://schema.org/CompletedActionStatus",
    "https://schema.org/FailedActionStatus",
    "https://schema.org/PotentialActionStatus",
];

/// Checks the crate against the profile rules and returns every
/// violation found, in rule order.
pub fn validate(krate: &RoCrate) -> Vec<String> {
    let mut violations = Vec::new();

    let descriptor = krate.entity(krate.descriptor_id());
    let root = krate.entity(krate.root_id());
    if descriptor.is_none() {
        violations.push("Missing metadata descriptor".to_string());
    }
    if root.is_none() {
        violations.push("Missing root dataset".to_string());
    }

    for entity in krate.entities() {
        if entity.id().is_empty() {
            violations.push("There is an entity without an id.".to_string());
        }
        if entity.types().is_empty() {
            violations.push(format!(
                "There is an entity without a type using id: {}.",
                entity.id()
            ));
        }
    }

    if let Some(descriptor) = descriptor {
        check_descriptor(descriptor, krate.root_id(), &mut violations);
    }
    if let Some(root) = root {
        check_root(root, krate, &mut violations);
    }

    check_duplicate_ids(krate, &mut violations);
    for entity in krate.entities() {
        if entity.has_type("CreateAction") || entity.has_type("UpdateAction") {
            check_action(entity, &mut violations);
        }
        if entity.has_type("ComputerLanguage") || entity.has_type("SoftwareApplication") {
            check_language(entity, &mut violations);
        }
    }

    violations
}

fn check_descriptor(descriptor: &Entity, root_id: &str, violations: &mut Vec<String>) {
    if descriptor.id() != crate::model::factory::DESCRIPTOR_ID
        && descriptor.id() != crate::model::factory::LEGACY_DESCRIPTOR_ID
    {
        violations.push("The descriptor's id is invalid.".to_string());
    }
    if descriptor.types() != ["CreativeWork"] {
        violations.push("The descriptor's type is invalid.".to_string());
    }

    match descriptor.property("about") {
        Some(about) => {
            if about.single_reference() != Some(root_id) {
                violations.push("The descriptor's about property is invalid.".to_string());
            }
        }
        None => {
            violations.push("The descriptor does not have an about property.".to_string());
        }
    }

    if !descriptor.has_property("conformsTo") {
        violations.push("The conformsTo property for the descriptor is missing.".to_string());
    }
}

fn check_root(root: &Entity, krate: &RoCrate, violations: &mut Vec<String>) {
    if !root.has_type("Dataset") {
        violations.push("The root data entity's type is invalid.".to_string());
    }
    if !root.has_property("name") {
        violations.push("The root data entity does not have a name property.".to_string());
    }
    if !root.has_property("description") {
        violations.push("The root data entity does not have a description property.".to_string());
    }

    match root.property("datePublished") {
        None => {
            violations
                .push("The root data entity does not have a datePublished property.".to_string());
        }
        Some(value) => match value.single_str() {
            Some(date) => {
                if !is_valid_iso8601_date(date) {
                    violations.push(
                        "The root data entity's datePublished property is not in ISO 8601 date format."
                            .to_string(),
                    );
                }
            }
            None => {
                violations.push(
                    "The root data entity's datePublished property is not a string.".to_string(),
                );
            }
        },
    }

    if !root.has_property("license") {
        violations.push("The root data entity does not have a license property.".to_string());
    }

    if let Some(conforms_to) = root.property("conformsTo") {
        check_root_profiles(conforms_to, krate, violations);
    }
}

/// Every profile the root dataset declares must resolve to a registered
/// `Profile` entity.
fn check_root_profiles(conforms_to: &PropertyValue, krate: &RoCrate, violations: &mut Vec<String>) {
    let is_profile_entity = |target: &str| {
        krate
            .entity(target)
            .is_some_and(|entity| entity.has_type("Profile"))
    };

    match conforms_to {
        PropertyValue::Single(item) => {
            let found = item.as_reference().is_some_and(is_profile_entity);
            if !found {
                violations
                    .push("The contextual entity for the profile is missing.".to_string());
            }
        }
        PropertyValue::List(items) => {
            for item in items {
                let found = item.as_reference().is_some_and(is_profile_entity);
                if !found {
                    violations
                        .push("The contextual entity for a profile is missing.".to_string());
                }
            }
        }
    }
}

/// Registry keys always differ, but renaming a registered entity can
/// introduce id collisions the registry cannot see.
fn check_duplicate_ids(krate: &RoCrate, violations: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for entity in krate.entities() {
        if !seen.insert(entity.id()) {
            violations.push("There are multiple entities using the same @id value.".to_string());
            return;
        }
    }
}

fn check_action(action: &Entity, violations: &mut Vec<String>) {
    if !action.has_property("object") {
        violations.push("There is no object property for a curation action.".to_string());
    }

    if let Some(start) = action.property("startTime") {
        let valid = start.single_str().is_some_and(is_valid_iso8601_date);
        if !valid {
            violations
                .push("An action's startTime property is not in ISO 8601 date format.".to_string());
        }
    }
    if let Some(end) = action.property("endTime") {
        let valid = end.single_str().is_some_and(is_valid_iso8601_date);
        if !valid {
            violations
                .push("An action's endTime property is not in ISO 8601 date format.".to_string());
        }
    }

    if let Some(status) = action.property("actionStatus") {
        let valid = status
            .single_reference()
            .is_some_and(|target| ACTION_STATUS_URIS.contains(&target));
        if !valid {
            violations.push("An action's actionStatus property is invalid.".to_string());
        }
    }
}

fn check_language(language: &Entity, violations: &mut Vec<String>) {
    for property in ["name", "url", "version"] {
        if !language.has_property(property) {
            violations.push(format!(
                "The {property} property for the contextual entity of type ComputerLanguage and/or SoftwareApplication is missing."
            ));
        }
    }
}
