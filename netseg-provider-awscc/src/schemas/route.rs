//! route schema definition (AWS::EC2::Route)

use super::AwsccSchemaConfig;
use netseg_core::resource::ROUTE;
use netseg_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Returns the schema config for ec2_route (AWS::EC2::Route)
pub fn ec2_route_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::Route",
        schema: ResourceSchema::new(ROUTE)
            .attribute(
                AttributeSchema::new("route_table_id", AttributeType::String)
                    .required()
                    .with_provider_name("RouteTableId"),
            )
            .attribute(
                AttributeSchema::new("destination_cidr_block", types::cidr())
                    .required()
                    .with_provider_name("DestinationCidrBlock"),
            )
            .attribute(
                AttributeSchema::new("transit_gateway_id", AttributeType::String)
                    .with_provider_name("TransitGatewayId"),
            )
            .attribute(
                AttributeSchema::new("vpc_endpoint_id", AttributeType::String)
                    .with_provider_name("VpcEndpointId"),
            )
            .attribute(
                AttributeSchema::new("gateway_id", AttributeType::String)
                    .with_provider_name("GatewayId"),
            )
            .attribute(
                AttributeSchema::new("nat_gateway_id", AttributeType::String)
                    .with_provider_name("NatGatewayId"),
            ),
    }
}

