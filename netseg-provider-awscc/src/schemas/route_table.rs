//! route_table schema definition (AWS::EC2::RouteTable)

use super::AwsccSchemaConfig;
use netseg_core::resource::ROUTE_TABLE;
use netseg_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Returns the schema config for ec2_route_table (AWS::EC2::RouteTable)
pub fn ec2_route_table_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::RouteTable",
        schema: ResourceSchema::new(ROUTE_TABLE)
            .attribute(
                AttributeSchema::new("vpc_id", AttributeType::String)
                    .required()
                    .with_provider_name("VpcId"),
            )
            .attribute(
                AttributeSchema::new("tags", types::tags())
                    .with_provider_name("Tags"),
            ),
    }
}
