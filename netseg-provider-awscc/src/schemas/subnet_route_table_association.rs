//! subnet_route_table_association schema definition (AWS::EC2::SubnetRouteTableAssociation)

use super::AwsccSchemaConfig;
use netseg_core::resource::SUBNET_ROUTE_TABLE_ASSOCIATION;
use netseg_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Returns the schema config for ec2_subnet_route_table_association
pub fn ec2_subnet_route_table_association_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::SubnetRouteTableAssociation",
        schema: ResourceSchema::new(SUBNET_ROUTE_TABLE_ASSOCIATION)
            .attribute(
                AttributeSchema::new("route_table_id", AttributeType::String)
                    .required()
                    .with_provider_name("RouteTableId"),
            )
            .attribute(
                AttributeSchema::new("subnet_id", AttributeType::String)
                    .required()
                    .with_provider_name("SubnetId"),
            ),
    }
}
