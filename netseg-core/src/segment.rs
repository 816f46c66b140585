//! Segment - Subnet, route table, association and routes as one construct
//!
//! [`define`] turns a [`NetworkSegmentSpec`] into a [`NetworkSegment`]: four
//! kinds of declarations wired together through identity references. The
//! construct holds no state beyond the graph it returns; re-running it with
//! the same spec yields the same graph.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};
use crate::graph::ResourceGraph;
use crate::resource::{
    ROUTE, ROUTE_TABLE, Resource, ResourceId, SUBNET, SUBNET_ROUTE_TABLE_ASSOCIATION, Value,
};

/// Label name -> label value. Sorted, so conversions are deterministic.
pub type Labels = BTreeMap<String, String>;

/// Next-hop category of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetKind {
    TransitGateway,
    VpcEndpoint,
    InternetGateway,
    NatGateway,
}

impl TargetKind {
    pub const ALL: [TargetKind; 4] = [
        TargetKind::TransitGateway,
        TargetKind::VpcEndpoint,
        TargetKind::InternetGateway,
        TargetKind::NatGateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::TransitGateway => "transit-gateway",
            TargetKind::VpcEndpoint => "vpc-endpoint",
            TargetKind::InternetGateway => "internet-gateway",
            TargetKind::NatGateway => "nat-gateway",
        }
    }

    /// Route attribute that carries the target id for this kind
    pub fn attribute(&self) -> &'static str {
        match self {
            TargetKind::TransitGateway => "transit_gateway_id",
            TargetKind::VpcEndpoint => "vpc_endpoint_id",
            TargetKind::InternetGateway => "gateway_id",
            TargetKind::NatGateway => "nat_gateway_id",
        }
    }

    /// Every route attribute that can carry a target id
    pub fn attributes() -> [&'static str; 4] {
        Self::ALL.map(|kind| kind.attribute())
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SegmentError::UnsupportedTargetKind(s.to_string()))
    }
}

impl TryFrom<String> for TargetKind {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetKind> for String {
    fn from(kind: TargetKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A single static route
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub destination_block: String,
    pub target_kind: TargetKind,
    pub target_id: String,
}

impl RouteSpec {
    pub fn new(
        destination_block: impl Into<String>,
        target_kind: TargetKind,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            destination_block: destination_block.into(),
            target_kind,
            target_id: target_id.into(),
        }
    }

    /// Build a route from an untyped target kind
    pub fn parse(
        destination_block: impl Into<String>,
        target_kind: &str,
        target_id: impl Into<String>,
    ) -> SegmentResult<Self> {
        Ok(Self::new(destination_block, target_kind.parse()?, target_id))
    }
}

/// Input of [`define`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSegmentSpec {
    /// Parent network id
    pub network_id: String,
    /// CIDR block of the subnet, passed through verbatim
    pub address_block: String,
    /// Availability zone
    pub zone: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_labels: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_table_labels: Option<Labels>,
}

impl NetworkSegmentSpec {
    pub fn new(
        network_id: impl Into<String>,
        address_block: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            address_block: address_block.into(),
            zone: zone.into(),
            routes: Vec::new(),
            subnet_labels: None,
            route_table_labels: None,
        }
    }

    pub fn with_route(mut self, route: RouteSpec) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_subnet_labels(mut self, labels: Labels) -> Self {
        self.subnet_labels = Some(labels);
        self
    }

    pub fn with_route_table_labels(mut self, labels: Labels) -> Self {
        self.route_table_labels = Some(labels);
        self
    }
}

/// Target reference of a route: the attribute to set and the id it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBinding {
    pub attribute: &'static str,
    pub target_id: String,
}

/// Map a route to its single target-reference attribute
pub fn resolve_target(route: &RouteSpec) -> TargetBinding {
    TargetBinding {
        attribute: route.target_kind.attribute(),
        target_id: route.target_id.clone(),
    }
}

/// One resolved label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    fn to_value(&self) -> Value {
        Value::Map(
            [
                ("key".to_string(), Value::string(&self.key)),
                ("value".to_string(), Value::string(&self.value)),
            ]
            .into_iter()
            .collect(),
        )
    }
}

/// Convert a label mapping to a list of pairs.
///
/// `None` stays `None`: the provider treats "no labels" and "empty label set"
/// differently.
pub fn to_label_list(labels: Option<&Labels>) -> Option<Vec<Label>> {
    labels.map(|labels| {
        labels
            .iter()
            .map(|(key, value)| Label {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    })
}

fn labels_value(labels: Option<&Labels>) -> Option<Value> {
    to_label_list(labels).map(|list| Value::List(list.iter().map(Label::to_value).collect()))
}

fn require(field: &str, value: &str) -> SegmentResult<()> {
    if value.trim().is_empty() {
        Err(SegmentError::missing_field(field))
    } else {
        Ok(())
    }
}

fn validate_routes(routes: &[RouteSpec], offset: usize) -> SegmentResult<()> {
    for (i, route) in routes.iter().enumerate() {
        let i = offset + i;
        require(&format!("routes[{}].destination_block", i), &route.destination_block)?;
        require(&format!("routes[{}].target_id", i), &route.target_id)?;
    }
    Ok(())
}

/// A defined segment: its declarations and the handles other definitions use
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSegment {
    name: String,
    subnet: ResourceId,
    route_table: ResourceId,
    association: ResourceId,
    routes: Vec<RouteSpec>,
    graph: ResourceGraph,
}

/// Declare a subnet, its route table, the association and one route per entry.
///
/// Every resource name derives from `name`, so the same input always produces
/// the same identities. The subnet never assigns public IPs on launch.
pub fn define(name: &str, spec: NetworkSegmentSpec) -> SegmentResult<NetworkSegment> {
    require("name", name)?;
    require("network_id", &spec.network_id)?;
    require("address_block", &spec.address_block)?;
    require("zone", &spec.zone)?;
    validate_routes(&spec.routes, 0)?;

    let mut graph = ResourceGraph::new();

    let subnet = graph
        .add(
            Resource::new(SUBNET, format!("{}.subnet", name))
                .with_attribute("vpc_id", Value::string(&spec.network_id))
                .with_attribute("cidr_block", Value::string(&spec.address_block))
                .with_attribute("availability_zone", Value::string(&spec.zone))
                .with_attribute("map_public_ip_on_launch", Value::Bool(false))
                .with_optional_attribute("tags", labels_value(spec.subnet_labels.as_ref())),
        )?
        .clone();

    let route_table = graph
        .add(
            Resource::new(ROUTE_TABLE, format!("{}.route_table", name))
                .with_attribute("vpc_id", Value::string(&spec.network_id))
                .with_optional_attribute("tags", labels_value(spec.route_table_labels.as_ref())),
        )?
        .clone();

    let association = graph
        .add(
            Resource::new(
                SUBNET_ROUTE_TABLE_ASSOCIATION,
                format!("{}.association", name),
            )
            .with_attribute("subnet_id", Value::id_of(&subnet))
            .with_attribute("route_table_id", Value::id_of(&route_table)),
        )?
        .clone();

    let mut segment = NetworkSegment {
        name: name.to_string(),
        subnet,
        route_table,
        association,
        routes: Vec::with_capacity(spec.routes.len()),
        graph,
    };

    for route in spec.routes {
        segment.declare_route(route)?;
    }

    log::info!(
        "defined segment '{}' with {} resources ({} routes)",
        segment.name,
        segment.graph.len(),
        segment.routes.len()
    );
    Ok(segment)
}

impl NetworkSegment {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the subnet resource
    pub fn subnet(&self) -> &ResourceId {
        &self.subnet
    }

    /// Handle of the route table resource
    pub fn route_table(&self) -> &ResourceId {
        &self.route_table
    }

    pub fn association(&self) -> &ResourceId {
        &self.association
    }

    /// Routes declared so far, in declaration order
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }

    /// Append routes to the route table without touching existing ones.
    ///
    /// Routes identical to one already declared are skipped, so repeating a
    /// call is a no-op. New routes continue the index sequence. The batch is
    /// validated up front and a failing batch declares nothing. Returns the
    /// number of routes declared.
    pub fn add_routes(&mut self, routes: &[RouteSpec]) -> SegmentResult<usize> {
        validate_routes(routes, self.routes.len())?;

        let mut added = 0;
        for route in routes {
            if self.routes.contains(route) {
                log::warn!(
                    "segment '{}': route to {} via {} {} already declared, skipping",
                    self.name,
                    route.destination_block,
                    route.target_kind,
                    route.target_id
                );
                continue;
            }
            self.declare_route(route.clone())?;
            added += 1;
        }
        Ok(added)
    }

    fn declare_route(&mut self, route: RouteSpec) -> SegmentResult<()> {
        let target = resolve_target(&route);
        let index = self.routes.len();

        self.graph.add(
            Resource::new(ROUTE, format!("{}.route_{}", self.name, index))
                .with_attribute("route_table_id", Value::id_of(&self.route_table))
                .with_attribute(
                    "destination_cidr_block",
                    Value::string(&route.destination_block),
                )
                .with_attribute(target.attribute, Value::String(target.target_id)),
        )?;
        self.routes.push(route);
        Ok(())
    }
}
