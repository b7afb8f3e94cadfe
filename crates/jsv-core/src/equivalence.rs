//! # Structural Equivalence
//!
//! Two independently built [`SchemaTree`]s can denote the same logical
//! schema: the same subschema text at two locations, or a `$ref` and the
//! node it points to. Validator caching keys on that logical identity, not
//! on where a tree happens to point.
//!
//! ## Definition
//!
//! Trees are equivalent iff their nodes, after following any `$ref` chain
//! at the current location, are deep-equal JSON. When the node contains a
//! `$ref` anywhere below it, the base URI those references are relative to
//! must also match, since identical text can then mean different things in
//! different documents. Sibling keywords of a followed `$ref` play no part.
//!
//! [`SchemaContext`] adds the instance type. It is a value type whose `Eq`
//! and `Hash` are structural; [`SchemaTree`] itself keeps no `PartialEq`,
//! and exposes the comparison as the explicit [`tree_equivalent`] /
//! [`tree_hash`] pair instead.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::Value;

use crate::instance::InstanceType;
use crate::tree::SchemaTree;

/// The tree with its `$ref` chain followed, or the tree itself if the
/// chain does not resolve.
fn dereferenced(tree: &SchemaTree) -> SchemaTree {
    tree.resolve().unwrap_or_else(|_| tree.clone())
}

/// The base URI, if the node's meaning depends on it.
fn scope_of(tree: &SchemaTree) -> Option<Arc<str>> {
    contains_ref(tree.node()).then(|| Arc::from(tree.base_uri()))
}

/// Structural equivalence of two schema trees.
pub fn tree_equivalent(a: &SchemaTree, b: &SchemaTree) -> bool {
    let a = dereferenced(a);
    let b = dereferenced(b);
    a.node() == b.node() && scope_of(&a) == scope_of(&b)
}

/// A hash consistent with [`tree_equivalent`].
pub fn tree_hash(tree: &SchemaTree) -> u64 {
    let tree = dereferenced(tree);
    scoped_hash(tree.node(), scope_of(&tree).as_deref())
}

fn scoped_hash(node: &Value, scope: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    scope.hash(&mut hasher);
    hasher.write_u64(value_hash(node));
    hasher.finish()
}

/// A hash of JSON content consistent with `Value`'s `PartialEq`: object
/// member order is irrelevant, and numbers hash by numeric value.
pub fn value_hash(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_value_into(value, &mut hasher);
    hasher.finish()
}

fn hash_value_into<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Number(n) => {
            state.write_u8(2);
            if let Some(u) = n.as_u64() {
                state.write_u8(0);
                state.write_u64(u);
            } else if let Some(i) = n.as_i64() {
                state.write_u8(1);
                state.write_i64(i);
            } else if let Some(f) = n.as_f64() {
                // -0.0 == 0.0
                let f = if f == 0.0 { 0.0 } else { f };
                state.write_u8(2);
                state.write_u64(f.to_bits());
            }
        }
        Value::String(s) => {
            state.write_u8(3);
            s.hash(state);
        }
        Value::Array(items) => {
            state.write_u8(4);
            state.write_usize(items.len());
            for item in items {
                hash_value_into(item, state);
            }
        }
        Value::Object(map) => {
            state.write_u8(5);
            state.write_usize(map.len());
            // Order-independent combination of per-member hashes.
            let combined = map.iter().fold(0u64, |acc, (k, v)| {
                let mut member = DefaultHasher::new();
                k.hash(&mut member);
                hash_value_into(v, &mut member);
                acc.wrapping_add(member.finish())
            });
            state.write_u64(combined);
        }
    }
}

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

/// The validator cache key: a schema tree plus the type of the instance
/// being validated against it.
///
/// Equality and hashing are structural (see the module docs). The tree's
/// `$ref` chain is followed at construction; the dereferenced tree is what
/// [`SchemaContext::schema`] returns.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    schema: SchemaTree,
    instance_type: InstanceType,
    scope: Option<Arc<str>>,
    hash: u64,
}

impl SchemaContext {
    pub fn new(schema: &SchemaTree, instance_type: InstanceType) -> Self {
        let schema = dereferenced(schema);
        let scope = scope_of(&schema);
        let tree_hash = scoped_hash(schema.node(), scope.as_deref());
        let hash = tree_hash
            .wrapping_mul(31)
            .wrapping_add(instance_type as u64);
        Self {
            schema,
            instance_type,
            scope,
            hash,
        }
    }

    /// The dereferenced schema tree.
    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    pub fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    /// The precomputed structural hash.
    pub fn structural_hash(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for SchemaContext {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.instance_type == other.instance_type
            && self.scope == other.scope
            && self.schema.node() == other.schema.node()
    }
}

impl Eq for SchemaContext {}

impl Hash for SchemaContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
