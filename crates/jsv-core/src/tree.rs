//! # Schema Trees and Reference Resolution
//!
//! A [`SchemaTree`] pairs a loaded schema document with a current location
//! inside it and the reference-resolution context needed to follow `$ref`.
//!
//! ## Documents
//!
//! Every document lives in a [`SchemaStore`], keyed by URI. A document whose
//! root carries an `id` or `$id` string is registered under that URI as
//! well. The store is populated up front and never fetches anything: a
//! `$ref` to a document that is not loaded is a resolution error.
//!
//! ## Reference Resolution
//!
//! A `$ref` value has the form `<uri>#<json-pointer>`. An empty `<uri>`
//! addresses the current document; a relative one is joined onto the
//! current document's base URI. Resolution follows `$ref` hops until it
//! reaches a node without one. Each hop records the location it left in
//! the tree's visited path; reaching a location already on that path is a
//! cycle and fails with [`ResolutionError::Cycle`] instead of recursing.
//!
//! The visited path belongs to a single resolution chain. Navigating into a
//! child starts a fresh chain, so recursive schemas that descend into the
//! instance (`{"properties": {"next": {"$ref": "#"}}}`) are not cycles.
//!
//! Trees are immutable; navigation and resolution return new trees sharing
//! the same `Arc`-held documents.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use url::Url;

use crate::error::{ResolutionError, StoreError};
use crate::pointer::JsonPointer;

static NULL: Value = Value::Null;

/// The URI used for documents registered without one.
pub const ANONYMOUS_URI: &str = "";

/// A read-only collection of schema documents addressable by URI.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    documents: HashMap<String, Arc<Value>>,
}

impl SchemaStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under `uri` and under its root `id`/`$id`.
    ///
    /// Registering the same content twice under one URI is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateDocument`] if different content is
    /// already registered under either URI.
    pub fn register(&mut self, uri: &str, document: Value) -> Result<Arc<Value>, StoreError> {
        let uri = normalize_uri(uri);
        let document = Arc::new(document);
        self.insert(&uri, Arc::clone(&document))?;

        if let Some(id) = declared_id(&document) {
            let id_uri = match Url::parse(&uri) {
                Ok(base) => base.join(id).map(|u| normalize_uri(u.as_str())),
                Err(_) => Ok(normalize_uri(id)),
            }
            .map_err(|e| StoreError::InvalidUri {
                uri: id.to_string(),
                reason: e.to_string(),
            })?;
            if id_uri != uri {
                self.insert(&id_uri, Arc::clone(&document))?;
            }
        }
        Ok(document)
    }

    fn insert(&mut self, uri: &str, document: Arc<Value>) -> Result<(), StoreError> {
        if let Some(existing) = self.documents.get(uri) {
            if existing.as_ref() != document.as_ref() {
                return Err(StoreError::DuplicateDocument {
                    uri: uri.to_string(),
                });
            }
            return Ok(());
        }
        self.documents.insert(uri.to_string(), document);
        Ok(())
    }

    /// Look up a document by URI. The fragment, if any, is ignored.
    pub fn get(&self, uri: &str) -> Option<&Arc<Value>> {
        self.documents.get(&normalize_uri(uri))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// An absolute location inside the store: document URI plus pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaLocation {
    pub uri: String,
    pub pointer: JsonPointer,
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.uri, self.pointer)
    }
}

/// A schema document, a location inside it, and the `$ref` chain that led there.
#[derive(Clone)]
pub struct SchemaTree {
    store: Arc<SchemaStore>,
    uri: Arc<str>,
    document: Arc<Value>,
    location: JsonPointer,
    visited: Vec<SchemaLocation>,
}

impl SchemaTree {
    /// Open the document registered under `uri` at its root.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::UnknownDocument`] if nothing is registered
    /// under `uri`.
    pub fn open(store: Arc<SchemaStore>, uri: &str) -> Result<Self, ResolutionError> {
        let uri = normalize_uri(uri);
        let document = store
            .get(&uri)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownDocument {
                reference: uri.clone(),
                uri: uri.clone(),
            })?;
        Ok(Self {
            store,
            uri: Arc::from(uri.as_str()),
            document,
            location: JsonPointer::root(),
            visited: Vec::new(),
        })
    }

    /// A tree over a single anonymous document, with no other documents
    /// available for `$ref`.
    pub fn anonymous(document: Value) -> Self {
        let document = Arc::new(document);
        let mut store = SchemaStore::new();
        store
            .documents
            .insert(ANONYMOUS_URI.to_string(), Arc::clone(&document));
        Self {
            store: Arc::new(store),
            uri: Arc::from(ANONYMOUS_URI),
            document,
            location: JsonPointer::root(),
            visited: Vec::new(),
        }
    }

    /// The node at the current location, or `null` if the location does
    /// not exist in the document.
    pub fn node(&self) -> &Value {
        self.location.get(&self.document).unwrap_or(&NULL)
    }

    /// The node as an object map, if it is one.
    pub fn object(&self) -> Option<&Map<String, Value>> {
        self.node().as_object()
    }

    /// A child tree at `location/token`. Starts a fresh resolution chain.
    pub fn navigate(&self, token: impl Into<String>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            uri: Arc::clone(&self.uri),
            document: Arc::clone(&self.document),
            location: self.location.append(token),
            visited: Vec::new(),
        }
    }

    /// A child tree at `location/index`.
    pub fn navigate_index(&self, index: usize) -> Self {
        self.navigate(index.to_string())
    }

    /// The URI of the document this tree points into.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The URI relative references are joined onto: the root `id`/`$id` if
    /// it is absolute, otherwise the document URI.
    pub fn base_uri(&self) -> &str {
        declared_id(&self.document)
            .filter(|id| Url::parse(id).is_ok())
            .unwrap_or(&self.uri[..])
    }

    pub fn location(&self) -> &JsonPointer {
        &self.location
    }

    pub fn document(&self) -> &Arc<Value> {
        &self.document
    }

    pub fn store(&self) -> &Arc<SchemaStore> {
        &self.store
    }

    /// Locations left by `$ref` hops on the current resolution chain.
    pub fn visited(&self) -> &[SchemaLocation] {
        &self.visited
    }

    /// The absolute location of the current node.
    pub fn schema_location(&self) -> SchemaLocation {
        SchemaLocation {
            uri: self.uri.to_string(),
            pointer: self.location.clone(),
        }
    }

    /// The `$ref` member of the current node, if any.
    pub fn reference(&self) -> Option<&Value> {
        self.object().and_then(|m| m.get("$ref"))
    }

    /// Follow `$ref` hops until reaching a node without one.
    ///
    /// Returns a clone of `self` if the current node has no `$ref`.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::InvalidRef`]: `$ref` is not a string, or not a
    ///   usable URI reference with a JSON Pointer fragment.
    /// - [`ResolutionError::UnknownDocument`]: the target document is not
    ///   in the store.
    /// - [`ResolutionError::NotFound`]: the pointer does not resolve.
    /// - [`ResolutionError::Cycle`]: the chain revisits a location.
    pub fn resolve(&self) -> Result<Self, ResolutionError> {
        let mut current = self.clone();
        while let Some(reference) = current.reference() {
            let reference = reference.as_str().ok_or_else(|| ResolutionError::InvalidRef {
                reference: reference.to_string(),
                reason: "$ref must be a string".to_string(),
            })?;
            let target = current.target_of(reference)?;

            let mut visited = current.visited.clone();
            visited.push(current.schema_location());
            if visited.contains(&target) {
                let mut path: Vec<String> = visited.iter().map(ToString::to_string).collect();
                path.push(target.to_string());
                tracing::warn!(reference, cycle = %path.join(" -> "), "reference cycle detected");
                return Err(ResolutionError::Cycle {
                    reference: reference.to_string(),
                    path,
                });
            }

            let document = current
                .store
                .get(&target.uri)
                .cloned()
                .ok_or_else(|| ResolutionError::UnknownDocument {
                    reference: reference.to_string(),
                    uri: target.uri.clone(),
                })?;
            target
                .pointer
                .resolve(&document)
                .map_err(|source| ResolutionError::NotFound {
                    reference: reference.to_string(),
                    source,
                })?;

            tracing::trace!(reference, from = %current.schema_location(), to = %target, "followed $ref");
            current = Self {
                store: Arc::clone(&current.store),
                uri: Arc::from(target.uri.as_str()),
                document,
                location: target.pointer,
                visited,
            };
        }
        Ok(current)
    }

    /// Compute the absolute location a `$ref` string designates.
    fn target_of(&self, reference: &str) -> Result<SchemaLocation, ResolutionError> {
        let (doc_part, fragment) = match reference.split_once('#') {
            Some((doc, frag)) => (doc, frag),
            None => (reference, ""),
        };

        let uri = if doc_part.is_empty() {
            self.uri.to_string()
        } else {
            match Url::parse(self.base_uri()) {
                Ok(base) => base
                    .join(doc_part)
                    .map(|u| normalize_uri(u.as_str()))
                    .map_err(|e| ResolutionError::InvalidRef {
                        reference: reference.to_string(),
                        reason: e.to_string(),
                    })?,
                Err(_) => normalize_uri(doc_part),
            }
        };

        let pointer = JsonPointer::from_fragment(fragment).map_err(|e| {
            ResolutionError::InvalidRef {
                reference: reference.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(SchemaLocation { uri, pointer })
    }

    /// The `schema` member of a processing message:
    /// `{"loadingURI": "<uri>#", "pointer": "<ptr>"}`.
    pub fn as_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("loadingURI".to_string(), Value::String(format!("{}#", self.uri)));
        node.insert("pointer".to_string(), Value::String(self.location.to_string()));
        Value::Object(node)
    }
}

impl fmt::Debug for SchemaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTree")
            .field("uri", &self.uri)
            .field("location", &self.location.to_string())
            .field("visited", &self.visited)
            .finish()
    }
}

impl fmt::Display for SchemaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.uri, self.location)
    }
}

/// Strip the fragment; absolute URIs are normalized by the `url` crate.
fn normalize_uri(uri: &str) -> String {
    let without_fragment = uri.split_once('#').map_or(uri, |(base, _)| base);
    match Url::parse(without_fragment) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => without_fragment.to_string(),
    }
}

fn declared_id(document: &Value) -> Option<&str> {
    let root = document.as_object()?;
    root.get("$id")
        .or_else(|| root.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty() && !id.starts_with('#'))
}
