//! subnet schema definition (AWS::EC2::Subnet)

use super::AwsccSchemaConfig;
use netseg_core::resource::SUBNET;
use netseg_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Returns the schema config for ec2_subnet (AWS::EC2::Subnet)
pub fn ec2_subnet_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::Subnet",
        schema: ResourceSchema::new(SUBNET)
            .attribute(
                AttributeSchema::new("vpc_id", AttributeType::String)
                    .required()
                    .with_provider_name("VpcId"),
            )
            .attribute(
                AttributeSchema::new("cidr_block", types::cidr())
                    .required()
                    .with_provider_name("CidrBlock"),
            )
            .attribute(
                AttributeSchema::new("availability_zone", AttributeType::String)
                    .required()
                    .with_provider_name("AvailabilityZone"),
            )
            .attribute(
                AttributeSchema::new("map_public_ip_on_launch", AttributeType::Bool)
                    .with_provider_name("MapPublicIpOnLaunch"),
            )
            .attribute(
                AttributeSchema::new("tags", types::tags())
                    .with_provider_name("Tags"),
            ),
    }
}
