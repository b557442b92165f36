//! Static HTML preview for a saved metadata document.
//!
//! Reads `ro-crate-metadata.json` from a crate directory and renders a
//! single self-contained page: the root dataset first, then a section
//! per remaining entity. References between entities become in-page
//! anchors, absolute URIs become external links, everything else is
//! escaped text. The page is written as `ro-crate-preview-out.html`
//! next to the metadata document.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::factory::{DESCRIPTOR_ID, ROOT_ID};
use crate::util::is_valid_url;

/// File name of the generated preview page.
pub const PREVIEW_OUTPUT_FILE: &str = "ro-crate-preview-out.html";

/// Generates the preview page for the crate at `base_path` and returns
/// the path of the written file.
pub fn generate(base_path: impl AsRef<Path>) -> Result<PathBuf> {
    let base_path = base_path.as_ref();
    let metadata_path = base_path.join(DESCRIPTOR_ID);
    let raw = fs::read_to_string(&metadata_path).map_err(|source| Error::FileAccess {
        path: metadata_path.clone(),
        source,
    })?;
    let document: Value = serde_json::from_str(&raw)?;

    let graph = document
        .get("@graph")
        .and_then(Value::as_array)
        .ok_or(Error::Schema {
            keyword: "@graph",
            id: None,
        })?;

    let mut entities: IndexMap<&str, &Map<String, Value>> = IndexMap::new();
    for node in graph {
        if let Some(node) = node.as_object() {
            if let Some(id) = node.get("@id").and_then(Value::as_str) {
                entities.insert(id, node);
            }
        }
    }

    let root_id = find_root_id(&entities);
    let terms = term_uris(document.get("@context"));
    let html = render_page(&entities, root_id, &terms);

    let output = base_path.join(PREVIEW_OUTPUT_FILE);
    fs::write(&output, html).map_err(|source| Error::FileAccess {
        path: output.clone(),
        source,
    })?;
    debug!("wrote preview page to {}", output.display());
    Ok(output)
}

/// Resolves the root dataset id through the descriptor's about
/// reference, falling back to the conventional `./`.
fn find_root_id<'a>(entities: &IndexMap<&'a str, &Map<String, Value>>) -> &'a str {
    for (id, node) in entities {
        if id.contains(DESCRIPTOR_ID) && node.contains_key("conformsTo") {
            if let Some(about) = node.get("about").and_then(reference_id) {
                // reborrow through the index so the lifetime follows the graph
                return entities
                    .keys()
                    .find(|key| **key == about)
                    .copied()
                    .unwrap_or(ROOT_ID);
            }
        }
    }
    ROOT_ID
}

/// Extracts term documentation URIs from an object-form `@context`.
fn term_uris(context: Option<&Value>) -> IndexMap<String, String> {
    let mut terms = IndexMap::new();
    let Some(Value::Object(map)) = context else {
        return terms;
    };
    for (term, value) in map {
        let uri = match value {
            Value::String(uri) => Some(uri.clone()),
            Value::Object(definition) => definition
                .get("@id")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        if let Some(uri) = uri {
            terms.insert(term.clone(), uri);
        }
    }
    terms
}

fn render_page(
    entities: &IndexMap<&str, &Map<String, Value>>,
    root_id: &str,
    terms: &IndexMap<String, String>,
) -> String {
    let root = entities.get(root_id).copied();
    let title = root
        .and_then(|node| node.get("name"))
        .and_then(single_str)
        .unwrap_or("RO-Crate preview");
    let description = root
        .and_then(|node| node.get("description"))
        .and_then(single_str)
        .unwrap_or("");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(title));
    if !description.is_empty() {
        let _ = writeln!(html, "<p>{}</p>", escape(description));
    }

    if let Some(root) = root {
        render_entity(&mut html, root_id, root, entities, terms);
    }
    for (id, node) in entities {
        if *id == root_id {
            continue;
        }
        render_entity(&mut html, id, node, entities, terms);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_entity(
    html: &mut String,
    id: &str,
    node: &Map<String, Value>,
    entities: &IndexMap<&str, &Map<String, Value>>,
    terms: &IndexMap<String, String>,
) {
    let _ = writeln!(html, "<section id=\"{}\">", escape(id));
    let _ = writeln!(html, "<h2>{}</h2>", escape(id));
    html.push_str("<ul>\n");
    for (key, value) in node {
        if key == "@id" {
            continue;
        }
        let label = match terms.get(key.as_str()) {
            Some(uri) => format!(
                "<a href=\"{}\">{}</a>",
                escape(uri),
                escape(key)
            ),
            None => escape(key),
        };
        let _ = writeln!(
            html,
            "<li><strong>{label}</strong>: {}</li>",
            render_value(value, entities)
        );
    }
    html.push_str("</ul>\n</section>\n");
}

/// Renders one property value: references link to the target section
/// (labelled by its name when it has one), absolute URIs link out,
/// lists recurse.
fn render_value(value: &Value, entities: &IndexMap<&str, &Map<String, Value>>) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, entities))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => match reference_id(value) {
            Some(target) => {
                let label = entities
                    .get(target)
                    .and_then(|node| node.get("name"))
                    .and_then(single_str)
                    .unwrap_or(target);
                format!("<a href=\"#{}\">{}</a>", escape(target), escape(label))
            }
            None => escape(&value.to_string()),
        },
        Value::String(text) if is_valid_url(text) => {
            format!("<a href=\"{}\">{}</a>", escape(text), escape(text))
        }
        Value::String(text) => escape(text),
        other => escape(&other.to_string()),
    }
}

fn reference_id(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("@id")?.as_str()
}

fn single_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Array(items) => match items.as_slice() {
            [Value::String(text)] => Some(text),
            _ => None,
        },
        _ => None,
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_document(dir: &Path, document: &Value) {
        fs::write(
            dir.join(DESCRIPTOR_ID),
            serde_json::to_string_pretty(document).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_generate_renders_root_and_links() {
        let dir = tempdir().unwrap();
        write_document(
            dir.path(),
            &json!({
                "@context": "https://w3id.org/ro/crate/1.2/context",
                "@graph": [
                    {
                        "@id": "ro-crate-metadata.json",
                        "@type": "CreativeWork",
                        "conformsTo": { "@id": "https://w3id.org/ro/crate/1.2" },
                        "about": { "@id": "./" }
                    },
                    {
                        "@id": "./",
                        "@type": "Dataset",
                        "name": "Maps & Surveys",
                        "description": "Survey <data>",
                        "creator": { "@id": "#alice" },
                        "url": "https://example.org/crate"
                    },
                    {
                        "@id": "#alice",
                        "@type": "Person",
                        "name": "Alice Smith"
                    }
                ]
            }),
        );

        let path = generate(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(PREVIEW_OUTPUT_FILE));
        let html = fs::read_to_string(path).unwrap();

        assert!(html.contains("<title>Maps &amp; Surveys</title>"));
        assert!(html.contains("Survey &lt;data&gt;"));
        // reference rendered as an in-page anchor labelled by name
        assert!(html.contains("<a href=\"##alice\">Alice Smith</a>"));
        // absolute URIs link out
        assert!(html.contains("<a href=\"https://example.org/crate\">"));
        // the root section comes before the person section
        let root_pos = html.find("<section id=\"./\">").unwrap();
        let alice_pos = html.find("<section id=\"#alice\">").unwrap();
        assert!(root_pos < alice_pos);
    }

    #[test]
    fn test_object_context_terms_become_links() {
        let dir = tempdir().unwrap();
        write_document(
            dir.path(),
            &json!({
                "@context": { "name": "https://schema.org/name" },
                "@graph": [
                    {
                        "@id": "ro-crate-metadata.json",
                        "@type": "CreativeWork",
                        "conformsTo": { "@id": "https://w3id.org/ro/crate/1.2" },
                        "about": { "@id": "./" }
                    },
                    { "@id": "./", "@type": "Dataset", "name": "Named" }
                ]
            }),
        );

        let html = fs::read_to_string(generate(dir.path()).unwrap()).unwrap();
        assert!(html.contains("<a href=\"https://schema.org/name\">name</a>"));
    }

    #[test]
    fn test_generate_missing_metadata_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            generate(dir.path()),
            Err(Error::FileAccess { .. })
        ));
    }
}
