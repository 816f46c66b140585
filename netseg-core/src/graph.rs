//! Graph - Resource declarations and the dependencies between them
//!
//! Dependencies are never declared explicitly. They are derived from the
//! `ResourceRef` values a resource carries, so the ordering the orchestration
//! engine sees is a property of the data rather than of construction order.

use std::collections::{HashMap, VecDeque};

use crate::error::SegmentError;
use crate::resource::{Resource, ResourceId, Value};

/// Dependency between resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Target resource name
    pub target: String,
    /// Referenced attribute (e.g., "id")
    pub attribute: String,
    /// Where this reference is used (e.g., "route_table_id")
    pub used_in: String,
}

/// Dependency graph keyed by resource name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// Resource name -> list of dependencies
    pub edges: HashMap<String, Vec<Dependency>>,
    /// Reverse edges: target -> list of resources that depend on it
    pub reverse_edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Add a dependency edge
    pub fn add_edge(&mut self, from: String, dependency: Dependency) {
        let target = dependency.target.clone();
        self.edges.entry(from.clone()).or_default().push(dependency);
        self.reverse_edges.entry(target).or_default().push(from);
    }

    /// Get direct dependencies of a resource
    pub fn dependencies_of(&self, resource: &str) -> &[Dependency] {
        self.edges.get(resource).map_or(&[], |v| v.as_slice())
    }

    /// Get resources that depend on this resource
    pub fn dependents_of(&self, resource: &str) -> &[String] {
        self.reverse_edges
            .get(resource)
            .map_or(&[], |v| v.as_slice())
    }
}

/// Ordered set of resource declarations plus their dependency graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    dependencies: DependencyGraph,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource, recording an edge for every reference it carries.
    ///
    /// Resource names are unique within a graph.
    pub fn add(&mut self, resource: Resource) -> Result<&ResourceId, SegmentError> {
        let name = resource.id.name.clone();
        if self.index.contains_key(&name) {
            return Err(SegmentError::DuplicateResource(name));
        }

        let mut deps = Vec::new();
        for (key, value) in &resource.attributes {
            collect_dependencies(key, value, &mut deps);
        }
        // Attribute iteration order is unstable; edges are kept sorted
        deps.sort_by(|a, b| (&a.target, &a.used_in).cmp(&(&b.target, &b.used_in)));
        for dep in deps {
            self.dependencies.add_edge(name.clone(), dep);
        }

        log::debug!("declared {}", resource.id);
        self.index.insert(name, self.resources.len());
        self.resources.push(resource);
        Ok(&self.resources[self.resources.len() - 1].id)
    }

    /// Move every resource of `other` into this graph, preserving order
    pub fn extend(&mut self, other: ResourceGraph) -> Result<(), SegmentError> {
        for resource in other.resources {
            self.add(resource)?;
        }
        Ok(())
    }

    /// Resources in declaration order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.index.get(name).map(|&i| &self.resources[i])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    /// Resources of the given type, in declaration order
    pub fn of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a Resource> {
        self.resources
            .iter()
            .filter(move |r| r.id.resource_type == resource_type)
    }

    pub fn count_of(&self, resource_type: &str) -> usize {
        self.of_type(resource_type).count()
    }

    /// References whose target is not declared in this graph
    pub fn unresolved_references(&self) -> Vec<(&ResourceId, &Dependency)> {
        let mut unresolved = Vec::new();
        for resource in &self.resources {
            for dep in self.dependencies.dependencies_of(&resource.id.name) {
                if !self.index.contains_key(&dep.target) {
                    unresolved.push((&resource.id, dep));
                }
            }
        }
        unresolved
    }

    /// Resources ordered so that every resource follows the ones it references.
    ///
    /// Ties are broken by declaration order, so the result is deterministic.
    /// References to resources outside the graph are ignored.
    pub fn dependency_order(&self) -> Result<Vec<&Resource>, SegmentError> {
        let mut in_degree: Vec<usize> = vec![0; self.resources.len()];
        for (i, resource) in self.resources.iter().enumerate() {
            in_degree[i] = self
                .dependencies
                .dependencies_of(&resource.id.name)
                .iter()
                .filter(|d| self.index.contains_key(&d.target))
                .count();
        }

        let mut ready: VecDeque<usize> = (0..self.resources.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut ordered = Vec::with_capacity(self.resources.len());

        while let Some(i) = ready.pop_front() {
            let resource = &self.resources[i];
            ordered.push(resource);

            let mut unlocked = Vec::new();
            for dependent in self.dependencies.dependents_of(&resource.id.name) {
                if let Some(&j) = self.index.get(dependent) {
                    in_degree[j] -= 1;
                    if in_degree[j] == 0 {
                        unlocked.push(j);
                    }
                }
            }
            unlocked.sort_unstable();
            ready.extend(unlocked);
        }

        if ordered.len() != self.resources.len() {
            let stuck = self
                .resources
                .iter()
                .enumerate()
                .filter(|(i, _)| in_degree[*i] > 0)
                .map(|(_, r)| r.id.name.clone())
                .collect();
            return Err(SegmentError::DependencyCycle(stuck));
        }

        Ok(ordered)
    }
}

fn collect_dependencies(used_in: &str, value: &Value, out: &mut Vec<Dependency>) {
    match value {
        Value::ResourceRef(target, attribute) => out.push(Dependency {
            target: target.clone(),
            attribute: attribute.clone(),
            used_in: used_in.to_string(),
        }),
        Value::List(items) => {
            for item in items {
                collect_dependencies(used_in, item, out);
            }
        }
        Value::Map(map) => {
            for v in map.values() {
                collect_dependencies(used_in, v, out);
            }
        }
        Value::String(_) | Value::Bool(_) => {}
    }
}
