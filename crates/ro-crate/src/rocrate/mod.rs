//! The crate aggregate: owns all entities and drives load/save.
//!
//! A [`RoCrate`] is constructed either empty (fresh descriptor and root
//! dataset) or from an existing `ro-crate-metadata.json`. Loading
//! normalizes every property value into the list form the pair protocol
//! expects; saving denormalizes back to JSON-LD shorthand, validates,
//! orders the graph and writes the document.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::factory::{self, DESCRIPTOR_ID, PREVIEW_ID, ROOT_ID};
use crate::model::{Entity, PropertyValue};
use crate::validate;

/// Profile URI declared on freshly created descriptors.
pub const DEFAULT_PROFILE: &str = "https://w3id.org/ro/crate/1.2";

/// Context URI used when a loaded document declares none.
pub const DEFAULT_CONTEXT: &str = "https://w3id.org/ro/crate/1.2/context";

/// File name of the emitted metadata document.
pub const OUTPUT_FILE: &str = "ro-crate-metadata-out.json";

/// The part-of relationship key that is never collapsed to shorthand.
const HAS_PART: &str = "hasPart";

/// Serialized form of the metadata document.
#[derive(Serialize)]
struct Document {
    #[serde(rename = "@context")]
    context: Value,
    #[serde(rename = "@graph")]
    graph: Vec<Value>,
}

/// Construction flags for [`RoCrate::with_options`].
#[derive(Debug, Clone, Copy)]
pub struct CrateOptions {
    /// Load `ro-crate-metadata.json` from the base path when present.
    pub load_existing: bool,
    /// Attached package (metadata lives next to the data). Detached
    /// packages require a file-name prefix at save time.
    pub attached: bool,
    /// Register the preview/website entity at initialization.
    pub preview: bool,
}

impl Default for CrateOptions {
    fn default() -> CrateOptions {
        CrateOptions {
            load_existing: false,
            attached: true,
            preview: false,
        }
    }
}

/// The in-memory metadata document: an entity graph with two
/// distinguished members, the metadata descriptor and the root dataset.
#[derive(Debug, Clone)]
pub struct RoCrate {
    base_path: PathBuf,
    entities: IndexMap<String, Entity>,
    context: Value,
    descriptor_id: String,
    root_id: String,
    website_id: Option<String>,
    attached: bool,
    last_errors: Vec<String>,
}

impl RoCrate {
    /// Creates a fresh attached crate at `base_path`, creating the
    /// directory when missing.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<RoCrate> {
        RoCrate::with_options(base_path, CrateOptions::default())
    }

    /// Creates a crate with explicit construction flags.
    pub fn with_options(base_path: impl Into<PathBuf>, options: CrateOptions) -> Result<RoCrate> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|source| Error::FileAccess {
                path: base_path.clone(),
                source,
            })?;
        }

        let mut krate = RoCrate {
            base_path,
            entities: IndexMap::new(),
            context: Value::String(DEFAULT_CONTEXT.to_string()),
            descriptor_id: DESCRIPTOR_ID.to_string(),
            root_id: ROOT_ID.to_string(),
            website_id: None,
            attached: options.attached,
            last_errors: Vec::new(),
        };

        if options.load_existing {
            if krate.metadata_path().exists() {
                krate.load_metadata()?;
                return Ok(krate);
            }
            warn!(
                "metadata file not found at {}, initializing a new crate",
                krate.metadata_path().display()
            );
        }
        krate.initialize_new(options.preview)?;
        Ok(krate)
    }

    /// Loads an existing crate, failing when the metadata file is
    /// missing instead of falling back to a fresh one.
    pub fn load(base_path: impl Into<PathBuf>) -> Result<RoCrate> {
        let base_path = base_path.into();
        let metadata = base_path.join(DESCRIPTOR_ID);
        if !metadata.exists() {
            return Err(Error::FileAccess {
                path: metadata,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "metadata file not found"),
            });
        }
        RoCrate::with_options(
            base_path,
            CrateOptions {
                load_existing: true,
                ..CrateOptions::default()
            },
        )
    }

    /// Path of the metadata document this crate loads from.
    pub fn metadata_path(&self) -> PathBuf {
        self.base_path.join(DESCRIPTOR_ID)
    }

    fn initialize_new(&mut self, preview: bool) -> Result<()> {
        self.add_entity(factory::descriptor())?;
        self.add_entity(factory::root_dataset())?;

        if preview {
            let mut website = factory::contextual(PREVIEW_ID, ["CreativeWork"]);
            website.set_property("about", PropertyValue::reference(ROOT_ID));
            self.add_entity(website)?;
            self.website_id = Some(PREVIEW_ID.to_string());
        }

        self.normalize_all();
        Ok(())
    }

    fn load_metadata(&mut self) -> Result<()> {
        let path = self.metadata_path();
        let raw = fs::read_to_string(&path).map_err(|source| Error::FileAccess {
            path: path.clone(),
            source,
        })?;
        let document: Value = serde_json::from_str(&raw)?;

        if let Some(context) = document.get("@context") {
            self.context = context.clone();
        }

        self.add_entity(factory::descriptor())?;
        self.add_profile(DEFAULT_PROFILE, ROOT_ID)?;

        let graph = document
            .get("@graph")
            .and_then(Value::as_array)
            .ok_or(Error::Schema {
                keyword: "@graph",
                id: None,
            })?;

        let mut root_id = ROOT_ID.to_string();
        for node in graph {
            let node = node.as_object().ok_or(Error::Schema {
                keyword: "@id",
                id: None,
            })?;
            let id = node.get("@id").and_then(Value::as_str);

            // The profile declaration configures the descriptor instead
            // of registering as a regular entity.
            if id.is_some_and(|id| id.contains(DESCRIPTOR_ID)) && node.contains_key("conformsTo") {
                let profile = node
                    .get("conformsTo")
                    .and_then(reference_target)
                    .unwrap_or(DEFAULT_PROFILE);
                if let Some(about) = node.get("about").and_then(reference_target) {
                    root_id = about.to_string();
                }
                self.add_profile(profile, &root_id)?;
                continue;
            }

            let entity = entity_from_node(node)?;
            self.add_entity(entity)?;
        }

        if !self.entities.contains_key(&root_id) {
            return Err(Error::Reference(root_id));
        }
        self.root_id = root_id;
        self.website_id = self
            .entities
            .contains_key(PREVIEW_ID)
            .then(|| PREVIEW_ID.to_string());

        self.normalize_all();
        debug!(
            "loaded {} entities from {}",
            self.entities.len(),
            path.display()
        );
        Ok(())
    }

    /// Registers an entity, failing when its id is already taken.
    pub fn add_entity(&mut self, entity: Entity) -> Result<()> {
        let id = entity.id().to_string();
        if self.entities.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Returns the entity registered under `id`.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Returns the entity registered under `id` for mutation.
    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Removes the entity registered under `id`, failing when unknown.
    pub fn remove_entity(&mut self, id: &str) -> Result<()> {
        self.entities
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::Reference(id.to_string()))
    }

    /// All entities in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true when no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Id of the metadata descriptor.
    pub fn descriptor_id(&self) -> &str {
        &self.descriptor_id
    }

    /// Id of the root dataset.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The metadata descriptor entity.
    pub fn descriptor(&self) -> Result<&Entity> {
        self.entities
            .get(&self.descriptor_id)
            .ok_or_else(|| Error::Reference(self.descriptor_id.clone()))
    }

    /// The metadata descriptor entity, for mutation.
    pub fn descriptor_mut(&mut self) -> Result<&mut Entity> {
        self.entities
            .get_mut(&self.descriptor_id)
            .ok_or_else(|| Error::Reference(self.descriptor_id.clone()))
    }

    /// The root dataset entity.
    pub fn root_dataset(&self) -> Result<&Entity> {
        self.entities
            .get(&self.root_id)
            .ok_or_else(|| Error::Reference(self.root_id.clone()))
    }

    /// The root dataset entity, for mutation.
    pub fn root_dataset_mut(&mut self) -> Result<&mut Entity> {
        self.entities
            .get_mut(&self.root_id)
            .ok_or_else(|| Error::Reference(self.root_id.clone()))
    }

    /// The preview/website entity, when one is registered.
    pub fn website(&self) -> Option<&Entity> {
        self.website_id.as_deref().and_then(|id| self.entities.get(id))
    }

    /// Declares the profile this document conforms to and the dataset
    /// it is about, on the descriptor.
    pub fn add_profile(&mut self, profile: &str, about: &str) -> Result<()> {
        let descriptor = self.descriptor_mut()?;
        descriptor.set_property("conformsTo", PropertyValue::reference(profile));
        descriptor.set_property("about", PropertyValue::reference(about));
        Ok(())
    }

    /// Declares the default profile about the default root dataset.
    pub fn add_default_profile(&mut self) -> Result<()> {
        self.add_profile(DEFAULT_PROFILE, ROOT_ID)
    }

    /// The document's `@context` value.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Replaces the document's `@context` value.
    pub fn set_context(&mut self, context: impl Into<Value>) -> &mut RoCrate {
        self.context = context.into();
        self
    }

    /// The filesystem directory this crate reads from and writes to.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Replaces the filesystem directory for subsequent saves.
    pub fn set_base_path(&mut self, base_path: impl Into<PathBuf>) -> &mut RoCrate {
        self.base_path = base_path.into();
        self
    }

    /// Violations recorded by the most recent save attempt.
    pub fn last_errors(&self) -> &[String] {
        &self.last_errors
    }

    /// Validates the current state without touching the filesystem.
    pub fn validate(&self) -> Vec<String> {
        validate::validate(self)
    }

    /// Saves the metadata document to the base path with the default
    /// file name.
    pub fn save(&mut self) -> Result<PathBuf> {
        self.save_to(None, "")
    }

    /// Saves the metadata document.
    ///
    /// `target` overrides the base path; `prefix` prepends the output
    /// file name and is mandatory for detached packages. The save
    /// aborts without writing when validation reports any violation;
    /// the violations travel in the returned [`Error::Validation`] and
    /// stay retrievable through [`RoCrate::last_errors`].
    pub fn save_to(&mut self, target: Option<&Path>, prefix: &str) -> Result<PathBuf> {
        self.last_errors.clear();
        self.denormalize_all();

        if !self.attached && prefix.is_empty() {
            return Err(Error::DetachedPrefix);
        }

        self.last_errors = self.validate();
        if !self.last_errors.is_empty() {
            return Err(Error::Validation(self.last_errors.clone()));
        }

        let target = target.unwrap_or(&self.base_path).to_path_buf();
        if !target.is_dir() {
            fs::create_dir_all(&target).map_err(|source| Error::FileAccess {
                path: target.clone(),
                source,
            })?;
        }

        let document = Document {
            context: self.context.clone(),
            graph: self.ordered_graph(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        let file_name = if prefix.is_empty() {
            OUTPUT_FILE.to_string()
        } else {
            format!("{prefix}-{OUTPUT_FILE}")
        };
        let path = target.join(file_name);
        fs::write(&path, json).map_err(|source| Error::FileAccess {
            path: path.clone(),
            source,
        })?;
        debug!("wrote metadata document to {}", path.display());
        Ok(path)
    }

    /// Diagnostics-returning save: validation violations come back as a
    /// list instead of an error. Structural and file errors still fail.
    pub fn save_with_errors(&mut self) -> Result<Vec<String>> {
        match self.save() {
            Ok(_) => Ok(Vec::new()),
            Err(Error::Validation(violations)) => Ok(violations),
            Err(other) => Err(other),
        }
    }

    /// Orders the graph for emission: descriptor, optional website,
    /// root dataset, top-level Dataset/File entities, then everything
    /// else. Within the trailing groups registration order is kept.
    fn ordered_graph(&self) -> Vec<Value> {
        let descriptor_pos = self.entities.values().position(|entity| {
            entity.id().contains(DESCRIPTOR_ID) && entity.has_property("conformsTo")
        });
        let root_id = descriptor_pos
            .and_then(|pos| self.entities[pos].property("about"))
            .and_then(PropertyValue::single_reference)
            .unwrap_or_default();

        let website_pos = self.entities.values().position(|entity| {
            entity.has_type("CreativeWork")
                && !entity.has_property("conformsTo")
                && entity
                    .property("about")
                    .and_then(PropertyValue::single_reference)
                    == Some(root_id)
        });

        let mut first = Vec::new();
        let mut second = Vec::new();
        let mut last = Vec::new();
        if let Some(pos) = descriptor_pos {
            first.push(self.entities[pos].to_json());
        }
        if let Some(pos) = website_pos {
            first.push(self.entities[pos].to_json());
        }

        let mut root = None;
        for (pos, entity) in self.entities.values().enumerate() {
            if Some(pos) == descriptor_pos || Some(pos) == website_pos {
                continue;
            }
            if entity.has_type("Dataset") && entity.id() == root_id {
                root = Some(entity.to_json());
                continue;
            }
            if (entity.has_type("Dataset") || entity.has_type("File"))
                && !entity.id().starts_with('#')
            {
                second.push(entity.to_json());
            } else {
                last.push(entity.to_json());
            }
        }
        first.extend(root);

        first
            .into_iter()
            .chain(second)
            .chain(last)
            .map(Value::Object)
            .collect()
    }

    /// Wraps every bare property value into a one-element list,
    /// reconciling JSON-LD shorthand with the pair protocol.
    fn normalize_all(&mut self) {
        for entity in self.entities.values_mut() {
            for value in entity.properties_mut().values_mut() {
                if let PropertyValue::Single(item) = value {
                    *value = PropertyValue::List(vec![item.clone()]);
                }
            }
        }
    }

    /// Collapses one-element lists back to bare shorthand, except for
    /// `hasPart`, which stays a list by convention.
    fn denormalize_all(&mut self) {
        for entity in self.entities.values_mut() {
            for (key, value) in entity.properties_mut().iter_mut() {
                if key == HAS_PART {
                    continue;
                }
                if let PropertyValue::List(items) = value {
                    if let [item] = items.as_slice() {
                        *value = PropertyValue::Single(item.clone());
                    }
                }
            }
        }
    }
}

/// Reconstructs a generic entity from a decoded graph node.
pub(crate) fn entity_from_node(node: &Map<String, Value>) -> Result<Entity> {
    let id = node
        .get("@id")
        .and_then(Value::as_str)
        .ok_or(Error::Schema {
            keyword: "@id",
            id: None,
        })?;

    let types = match node.get("@type") {
        Some(Value::String(ty)) => vec![ty.clone()],
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    if types.is_empty() {
        return Err(Error::Schema {
            keyword: "@type",
            id: Some(id.to_string()),
        });
    }

    let mut entity = Entity::new(id, types);
    for (key, value) in node {
        if key != "@id" && key != "@type" {
            entity.set_property(key.clone(), PropertyValue::from_json(value.clone()));
        }
    }
    Ok(entity)
}

/// Extracts the `@id` of a reference-valued node property, accepting a
/// bare reference record or a list of them (first wins).
fn reference_target(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.get("@id").and_then(Value::as_str),
        Value::Array(items) => items.first().and_then(reference_target),
        _ => None,
    }
}
