//! netseg AWS Cloud Control Provider
//!
//! Maps segment declarations onto AWS CloudFormation resource types.
//!
//! ## Module Structure
//!
//! - `schemas` - Resource schemas and their CloudFormation type names
//! - `template` - Template rendering
//! - `validation` - Pre-flight checks against the schemas

pub mod schemas;
pub mod template;
pub mod validation;

// Re-export main types
pub use template::{TemplateError, logical_id, render_template};
pub use validation::validate_graph;
