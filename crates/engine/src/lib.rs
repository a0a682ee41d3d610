//! Query resolution engine for chainql
//!
//! This crate turns a query tree into a response against one pinned
//! checkpoint:
//! - Query, QueryNode: the requested selection tree
//! - schema: the node types, their fields, and the feature gating them
//! - validate: depth, node-count, page-size and feature checks before resolution
//! - Page, Connection: cursor pagination over ordered scans
//! - TypeResolver: package-aware layouts, abilities and canonical types
//! - capability: the field groups objects share across their projections
//! - Resolver: the concurrent resolver and its field error policy
//!
//! The engine never writes. Simulated writes reach it through an overlay
//! store handed to [`Resolver::with_store`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod limits;
pub mod pagination;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod typing;
pub mod validate;

pub use limits::{EngineConfig, Feature, Limits};
pub use pagination::{Connection, Edge, Page, PageArgs, PageInfo, PageState};
pub use query::{Query, QueryNode};
pub use resolver::{FieldError, PathSegment, QueryResponse, Resolver};
pub use schema::{NodeType, Shape};
pub use typing::TypeResolver;
pub use validate::{validate, validate_rooted};
