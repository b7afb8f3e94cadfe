//! # jsv-core: Foundational Types for the jsv Schema Engine
//!
//! The leaf crate of the workspace. It defines how schemas are addressed
//! and navigated, how two schema locations are compared for caching, and
//! how diagnostics are collected and escalated.
//!
//! ## Key Design Principles
//!
//! 1. **Immutable trees.** A [`SchemaTree`] never changes; navigation and
//!    `$ref` resolution return new trees sharing `Arc`-held documents.
//!
//! 2. **Cycle detection as data flow.** Every `$ref` hop extends an explicit
//!    visited path carried by value in the tree. A reference loop is a
//!    [`ResolutionError::Cycle`], never unbounded recursion.
//!
//! 3. **Structural cache keys.** [`SchemaContext`] compares by dereferenced
//!    content plus instance type. Tree equality stays an explicit operation
//!    ([`tree_equivalent`]) rather than an overridden `PartialEq`.
//!
//! 4. **Explicit abort path.** [`ProcessingReport::log`] returns a `Result`;
//!    reaching the exception threshold is an `Err` propagated with `?`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod equivalence;
pub mod error;
pub mod instance;
pub mod message;
pub mod pointer;
pub mod report;
pub mod tree;

// Re-export primary types for ergonomic imports.
pub use equivalence::{tree_equivalent, tree_hash, value_hash, SchemaContext};
pub use error::{PointerError, ProcessingException, ResolutionError, StoreError};
pub use instance::InstanceType;
pub use message::{Domain, LogLevel, ProcessingMessage};
pub use pointer::JsonPointer;
pub use report::{LogOutcome, ProcessingReport};
pub use tree::{SchemaLocation, SchemaStore, SchemaTree, ANONYMOUS_URI};
