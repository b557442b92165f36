//! Remote entity import (feature `remote`).
//!
//! Fetches a single JSON-LD node over HTTP and registers it as a
//! contextual entity, list-normalized like a loaded one.

use log::debug;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Entity, PropertyValue};
use crate::rocrate::{self, RoCrate};

impl RoCrate {
    /// Fetches the JSON-LD node at `url` and registers it.
    ///
    /// The response body must be a single object carrying `@id` and
    /// `@type`; its properties are normalized to the list form before
    /// registration. Fails with [`Error::RemoteFetch`] on transport or
    /// HTTP errors and with [`Error::DuplicateId`] when the fetched id
    /// is already taken.
    pub fn import_remote_entity(&mut self, url: &str) -> Result<&Entity> {
        let body: Value = reqwest::blocking::get(url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.json())
            .map_err(|source| Error::RemoteFetch {
                url: url.to_string(),
                source,
            })?;

        let node = body.as_object().ok_or(Error::Schema {
            keyword: "@id",
            id: None,
        })?;
        let mut entity = rocrate::entity_from_node(node)?;
        for value in entity.properties_mut().values_mut() {
            if let PropertyValue::Single(item) = value {
                *value = PropertyValue::List(vec![item.clone()]);
            }
        }

        let id = entity.id().to_string();
        self.add_entity(entity)?;
        debug!("imported remote entity {id} from {url}");
        self.entity(&id).ok_or(Error::Reference(id))
    }
}
