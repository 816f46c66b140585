//! AWS Cloud Control resource schemas for the segment resource types

use netseg_core::schema::ResourceSchema;

pub mod route;
pub mod route_table;
pub mod subnet;
pub mod subnet_route_table_association;

/// AWS Cloud Control schema configuration
///
/// Pairs a ResourceSchema with the CloudFormation type it renders to.
pub struct AwsccSchemaConfig {
    /// AWS CloudFormation type name (e.g., "AWS::EC2::Subnet")
    pub aws_type_name: &'static str,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

/// Returns all schema configs
pub fn configs() -> Vec<AwsccSchemaConfig> {
    vec![
        subnet::ec2_subnet_config(),
        route_table::ec2_route_table_config(),
        subnet_route_table_association::ec2_subnet_route_table_association_config(),
        route::ec2_route_config(),
    ]
}

/// Look up the config for a resource type (e.g., "ec2_route")
pub fn get_schema_config(resource_type: &str) -> Option<AwsccSchemaConfig> {
    configs()
        .into_iter()
        .find(|c| c.schema.resource_type == resource_type)
}
