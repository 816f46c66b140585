//! netseg Core
//!
//! Declares a network segment (subnet, route table, association and static
//! routes) as plain data. The resulting graph is handed to an orchestration
//! engine; nothing here talks to a cloud API.

pub mod config;
pub mod error;
pub mod graph;
pub mod resource;
pub mod schema;
pub mod segment;

pub use error::{SegmentError, SegmentResult};
pub use graph::{Dependency, DependencyGraph, ResourceGraph};
pub use resource::{Resource, ResourceId, Value};
pub use segment::{
    Label, Labels, NetworkSegment, NetworkSegmentSpec, RouteSpec, TargetBinding, TargetKind,
    define, resolve_target, to_label_list,
};
