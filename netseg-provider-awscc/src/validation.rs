//! Validation - Pre-flight checks of a declaration graph against the schemas
//!
//! These checks catch what the provider would reject at apply time: malformed
//! CIDR blocks, missing attributes, ambiguous route targets and names that
//! cannot become logical ids. Segment definition does not run them.

use std::collections::HashMap;

use netseg_core::graph::ResourceGraph;
use netseg_core::resource::{ROUTE, Resource};
use netseg_core::segment::TargetKind;

use crate::schemas::get_schema_config;
use crate::template::logical_id;

/// Check every resource of the graph.
///
/// Each message is prefixed with the resource it concerns
/// (e.g., "ec2_route[app.route_0]: ...").
pub fn validate_graph(graph: &ResourceGraph) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut owners: HashMap<String, &str> = HashMap::new();
    for resource in graph.resources() {
        validate_resource(resource, &mut errors);

        match logical_id(&resource.id.name) {
            Ok(id) => {
                if let Some(first) = owners.insert(id.clone(), &resource.id.name) {
                    errors.push(format!(
                        "{}: logical id '{}' is already used by '{}'",
                        resource.id, id, first
                    ));
                }
            }
            Err(e) => errors.push(format!("{}: {}", resource.id, e)),
        }
    }

    for (id, dep) in graph.unresolved_references() {
        errors.push(format!(
            "{}: '{}' references undeclared resource '{}'",
            id, dep.used_in, dep.target
        ));
    }

    if let Err(e) = graph.dependency_order() {
        errors.push(e.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_resource(resource: &Resource, errors: &mut Vec<String>) {
    let Some(config) = get_schema_config(&resource.id.resource_type) else {
        errors.push(format!(
            "{}: unknown resource type '{}'",
            resource.id, resource.id.resource_type
        ));
        return;
    };

    if let Err(type_errors) = config.schema.validate(&resource.attributes) {
        for error in type_errors {
            errors.push(format!("{}: {}", resource.id, error));
        }
    }

    if resource.id.resource_type == ROUTE {
        let targets: Vec<&str> = TargetKind::attributes()
            .into_iter()
            .filter(|attr| resource.attributes.contains_key(*attr))
            .collect();
        if targets.len() != 1 {
            errors.push(format!(
                "{}: expected exactly one route target, found {}",
                resource.id,
                if targets.is_empty() {
                    "none".to_string()
                } else {
                    targets.join(", ")
                }
            ));
        }
    }
}
