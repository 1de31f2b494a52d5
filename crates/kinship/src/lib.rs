//! Kinship - a family relationship graph.
//!
//! The library keeps parent, child and partner relationships mirrored on
//! both people they connect, materializes a family tree into a renderable
//! rooted tree, and finds the shortest relationship path between two people.
//! The `kinship` binary is a CLI over a JSONL-backed store.
//!
//! ```
//! use kinship::domain::{NewPerson, ScopeId};
//! use kinship::graph::RelationshipGraph;
//! use kinship::store::InMemoryPersonStore;
//! use kinship::tree::TreeBuilder;
//!
//! let scope = ScopeId::new("smith");
//! let mut graph = RelationshipGraph::with_id_prefix(InMemoryPersonStore::new(), "smith");
//! let parent = graph.add_person(NewPerson::new("John", scope.clone()), &[])?;
//! let child = graph.add_person(NewPerson::new("Anne", scope.clone()), &[parent.clone()])?;
//!
//! let snapshot = graph.snapshot(&scope)?;
//! let tree = TreeBuilder::new(&snapshot).build(&[])?;
//! assert_eq!(tree.id.as_ref(), Some(&parent));
//! assert_eq!(tree.child_ids(), vec![&child]);
//! # Ok::<(), kinship::error::Error>(())
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod path;
pub mod snapshot;
pub mod store;
pub mod tree;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
