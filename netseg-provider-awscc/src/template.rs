//! Template - Render a declaration graph as a CloudFormation-style template
//!
//! Dependencies stay implicit: references render as `Ref` / `Fn::GetAtt` and
//! no `DependsOn` is ever emitted.

use std::collections::HashMap;

use heck::ToUpperCamelCase;
use serde_json::{Map, Value as Json, json};
use thiserror::Error;

use netseg_core::error::SegmentError;
use netseg_core::graph::ResourceGraph;
use netseg_core::resource::{ROUTE_TABLE, Resource, ResourceId, SUBNET, Value};

use crate::schemas::{AwsccSchemaConfig, configs};

/// CloudFormation template format version
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Longest logical id CloudFormation accepts
pub const MAX_LOGICAL_ID_LEN: usize = 255;

/// Errors raised while rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("{resource}: Unknown attribute '{attribute}'")]
    UnknownAttribute {
        resource: ResourceId,
        attribute: String,
    },

    #[error("{resource}: Reference to undeclared resource '{target}'")]
    UnresolvedReference { resource: ResourceId, target: String },

    #[error(
        "Name '{name}' gives logical id '{logical_id}': logical ids are 1-255 ASCII letters and digits"
    )]
    InvalidLogicalId { name: String, logical_id: String },

    #[error("Logical id '{logical_id}' is shared by '{first}' and '{second}'")]
    LogicalIdCollision {
        logical_id: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Graph(#[from] SegmentError),
}

/// Logical id for a resource name (e.g., "app.route_0" -> "AppRoute0")
///
/// Case conversion keeps non-ASCII letters, so the result is checked against
/// what CloudFormation accepts.
pub fn logical_id(name: &str) -> Result<String, TemplateError> {
    let id = name.to_upper_camel_case();
    if id.is_empty()
        || id.len() > MAX_LOGICAL_ID_LEN
        || !id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(TemplateError::InvalidLogicalId {
            name: name.to_string(),
            logical_id: id,
        });
    }
    Ok(id)
}

/// Resource name -> logical id for every resource of the graph
fn logical_ids(graph: &ResourceGraph) -> Result<HashMap<String, String>, TemplateError> {
    let mut ids = HashMap::new();
    let mut owners: HashMap<String, String> = HashMap::new();
    for resource in graph.resources() {
        let id = logical_id(&resource.id.name)?;
        if let Some(first) = owners.insert(id.clone(), resource.id.name.clone()) {
            return Err(TemplateError::LogicalIdCollision {
                logical_id: id,
                first,
                second: resource.id.name.clone(),
            });
        }
        ids.insert(resource.id.name.clone(), id);
    }
    Ok(ids)
}

/// Render every resource of the graph.
///
/// Subnets and route tables are exported as outputs so enclosing stacks can
/// attach further resources to them.
pub fn render_template(graph: &ResourceGraph) -> Result<Json, TemplateError> {
    // Cycles are rejected before anything is rendered
    graph.dependency_order()?;

    let configs: HashMap<String, AwsccSchemaConfig> = configs()
        .into_iter()
        .map(|c| (c.schema.resource_type.clone(), c))
        .collect();
    let ids = logical_ids(graph)?;

    let mut resources = Map::new();
    let mut outputs = Map::new();

    for resource in graph.resources() {
        let config = configs
            .get(&resource.id.resource_type)
            .ok_or_else(|| TemplateError::UnknownResourceType(resource.id.resource_type.clone()))?;
        let id = &ids[&resource.id.name];

        let properties = render_properties(resource, config, &ids)?;
        resources.insert(
            id.clone(),
            json!({
                "Type": config.aws_type_name,
                "Properties": properties,
            }),
        );

        if resource.id.resource_type == SUBNET || resource.id.resource_type == ROUTE_TABLE {
            outputs.insert(
                format!("{}Id", id),
                json!({ "Value": { "Ref": id } }),
            );
        }
        log::debug!("rendered {} as {}", resource.id, config.aws_type_name);
    }

    Ok(json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Resources": resources,
        "Outputs": outputs,
    }))
}

fn render_properties(
    resource: &Resource,
    config: &AwsccSchemaConfig,
    ids: &HashMap<String, String>,
) -> Result<Map<String, Json>, TemplateError> {
    let mut properties = Map::new();

    for (name, value) in &resource.attributes {
        let provider_name = config
            .schema
            .attributes
            .get(name)
            .and_then(|a| a.provider_name.clone())
            .ok_or_else(|| TemplateError::UnknownAttribute {
                resource: resource.id.clone(),
                attribute: name.clone(),
            })?;
        properties.insert(provider_name, to_json(resource, value, ids)?);
    }

    Ok(properties)
}

fn to_json(
    resource: &Resource,
    value: &Value,
    ids: &HashMap<String, String>,
) -> Result<Json, TemplateError> {
    Ok(match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Bool(b) => Json::Bool(*b),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|v| to_json(resource, v, ids))
                .collect::<Result<_, _>>()?,
        ),
        // Tag maps use {"Key", "Value"}
        Value::Map(map) => {
            let mut object = Map::new();
            for (k, v) in map {
                object.insert(k.to_upper_camel_case(), to_json(resource, v, ids)?);
            }
            Json::Object(object)
        }
        Value::ResourceRef(target, attribute) => {
            let Some(target_id) = ids.get(target) else {
                return Err(TemplateError::UnresolvedReference {
                    resource: resource.id.clone(),
                    target: target.clone(),
                });
            };
            if attribute == "id" {
                json!({ "Ref": target_id })
            } else {
                json!({ "Fn::GetAtt": [target_id, attribute.to_upper_camel_case()] })
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netseg_core::segment::{Labels, NetworkSegmentSpec, RouteSpec, TargetKind, define};

    fn scenario() -> ResourceGraph {
        let spec = NetworkSegmentSpec::new("vpc-1", "10.0.1.0/24", "us-east-1a")
            .with_route(RouteSpec::new("0.0.0.0/0", TargetKind::InternetGateway, "igw-123"))
            .with_subnet_labels(
                [("env".to_string(), "prod".to_string())]
                    .into_iter()
                    .collect::<Labels>(),
            );
        define("app", spec).unwrap().into_graph()
    }

    #[test]
    fn logical_ids_are_upper_camel_case() {
        assert_eq!(logical_id("app.subnet").unwrap(), "AppSubnet");
        assert_eq!(logical_id("app.route_table").unwrap(), "AppRouteTable");
        assert_eq!(logical_id("app.route_0").unwrap(), "AppRoute0");
        assert_eq!(logical_id("edge-1.subnet").unwrap(), "Edge1Subnet");
    }

    #[test]
    fn logical_ids_reject_what_cloudformation_rejects() {
        assert!(matches!(
            logical_id("café.subnet"),
            Err(TemplateError::InvalidLogicalId { logical_id, .. }) if logical_id == "CaféSubnet"
        ));
        assert!(logical_id("...").is_err());
        assert!(logical_id(&"a".repeat(MAX_LOGICAL_ID_LEN)).is_ok());
        assert!(logical_id(&"a".repeat(MAX_LOGICAL_ID_LEN + 1)).is_err());
    }

    #[test]
    fn non_ascii_segment_name_fails_to_render() {
        let spec = NetworkSegmentSpec::new("vpc-1", "10.0.1.0/24", "us-east-1a");
        let graph = define("café", spec).unwrap().into_graph();

        let err = render_template(&graph).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidLogicalId { ref name, .. } if name == "café.subnet"
        ));
    }

    #[test]
    fn rendered_logical_ids_are_ascii_alphanumeric() {
        let template = render_template(&scenario()).unwrap();
        for id in template["Resources"].as_object().unwrap().keys() {
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()), "{}", id);
        }
    }

    #[test]
    fn renders_all_resources() {
        let template = render_template(&scenario()).unwrap();
        let resources = template["Resources"].as_object().unwrap();

        assert_eq!(resources.len(), 4);
        assert_eq!(resources["AppSubnet"]["Type"], "AWS::EC2::Subnet");
        assert_eq!(resources["AppRouteTable"]["Type"], "AWS::EC2::RouteTable");
        assert_eq!(
            resources["AppAssociation"]["Type"],
            "AWS::EC2::SubnetRouteTableAssociation"
        );
        assert_eq!(resources["AppRoute0"]["Type"], "AWS::EC2::Route");
        assert_eq!(template["AWSTemplateFormatVersion"], TEMPLATE_FORMAT_VERSION);
    }

    #[test]
    fn subnet_properties() {
        let template = render_template(&scenario()).unwrap();
        let props = &template["Resources"]["AppSubnet"]["Properties"];

        assert_eq!(props["VpcId"], "vpc-1");
        assert_eq!(props["CidrBlock"], "10.0.1.0/24");
        assert_eq!(props["AvailabilityZone"], "us-east-1a");
        assert_eq!(props["MapPublicIpOnLaunch"], false);
        assert_eq!(props["Tags"], json!([{ "Key": "env", "Value": "prod" }]));
    }

    #[test]
    fn references_render_as_ref() {
        let template = render_template(&scenario()).unwrap();
        let resources = &template["Resources"];

        assert_eq!(
            resources["AppAssociation"]["Properties"],
            json!({
                "SubnetId": { "Ref": "AppSubnet" },
                "RouteTableId": { "Ref": "AppRouteTable" },
            })
        );
        assert_eq!(
            resources["AppRoute0"]["Properties"],
            json!({
                "RouteTableId": { "Ref": "AppRouteTable" },
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": "igw-123",
            })
        );
        assert!(resources["AppRoute0"].get("DependsOn").is_none());
    }

    #[test]
    fn route_table_without_labels_has_no_tags() {
        let template = render_template(&scenario()).unwrap();
        let props = template["Resources"]["AppRouteTable"]["Properties"]
            .as_object()
            .unwrap();
        assert!(!props.contains_key("Tags"));
    }

    #[test]
    fn handles_are_exported() {
        let template = render_template(&scenario()).unwrap();
        let outputs = template["Outputs"].as_object().unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs["AppSubnetId"], json!({ "Value": { "Ref": "AppSubnet" } }));
        assert_eq!(
            outputs["AppRouteTableId"],
            json!({ "Value": { "Ref": "AppRouteTable" } })
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let first = serde_json::to_string_pretty(&render_template(&scenario()).unwrap()).unwrap();
        let second = serde_json::to_string_pretty(&render_template(&scenario()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_resource_type_fails() {
        let mut graph = ResourceGraph::new();
        graph.add(Resource::new("ec2_vpn_gateway", "vgw")).unwrap();
        assert!(matches!(
            render_template(&graph),
            Err(TemplateError::UnknownResourceType(t)) if t == "ec2_vpn_gateway"
        ));
    }

    #[test]
    fn unresolved_reference_fails() {
        let mut graph = ResourceGraph::new();
        graph
            .add(
                Resource::new(netseg_core::resource::ROUTE, "r")
                    .with_attribute(
                        "route_table_id",
                        Value::ResourceRef("missing".to_string(), "id".to_string()),
                    )
                    .with_attribute("destination_cidr_block", Value::string("0.0.0.0/0")),
            )
            .unwrap();
        assert!(matches!(
            render_template(&graph),
            Err(TemplateError::UnresolvedReference { target, .. }) if target == "missing"
        ));
    }

    #[test]
    fn colliding_logical_ids_fail() {
        let mut graph = ResourceGraph::new();
        graph.add(Resource::new(SUBNET, "app.subnet")).unwrap();
        graph.add(Resource::new(SUBNET, "app_subnet")).unwrap();
        assert!(matches!(
            render_template(&graph),
            Err(TemplateError::LogicalIdCollision { logical_id, .. }) if logical_id == "AppSubnet"
        ));
    }
}
