use log::debug;
use stack_defs::ec2::{Eip, NatGateway, Route, RouteTable, SubnetRouteTableAssociation};
use stack_defs::{Resource, Template, TemplateError};

use crate::network::{
    add_environment_parameters, add_public_network, add_public_network_outputs, add_subnet,
    add_subnet_output, application_tags, SubnetLayout, ANYWHERE,
};

pub const DESCRIPTION: &str = "Base infrastructure Stack implementing VPC Scenario 2 with 2 private subnets";

const PRIVATE_SUBNETS: [SubnetLayout; 2] = [
    SubnetLayout {
        name: "PrivateSubnet1",
        cidr: "10.0.1.0/24",
        zone: "a",
        name_tag: "private-az1-10.0.1.0",
        public: false,
    },
    SubnetLayout {
        name: "PrivateSubnet2",
        cidr: "10.0.2.0/24",
        zone: "b",
        name_tag: "private-az2-10.0.2.0",
        public: false,
    },
];

/// VPC with a public and a private subnet in two availability zones. Each
/// private subnet routes to the internet through a NAT gateway placed in the
/// public subnet of its zone.
pub fn generate_template() -> Result<Template, TemplateError> {
    let mut template = Template::new();
    template.set_description(DESCRIPTION);

    let region = add_environment_parameters(&mut template)?;

    let network = add_public_network(&mut template, &region)?;

    let mut private_subnets = Vec::with_capacity(PRIVATE_SUBNETS.len());
    for (index, (public_subnet, layout)) in network
        .public_subnets
        .iter()
        .zip(PRIVATE_SUBNETS.iter())
        .enumerate()
    {
        let zone = index + 1;
        debug!("Adding NAT tier for zone {}", layout.zone);

        let eip = template.add_resource(
            Resource::new(format!("NatEip{}", zone), Eip::vpc())?.depends_on(&network.attachment),
        )?;
        let nat = template.add_resource(Resource::new(
            format!("Nat{}", zone),
            NatGateway::new(eip.attribute("AllocationId"), public_subnet.reference()),
        )?)?;

        let subnet = add_subnet(&mut template, &network.vpc, &region, layout)?;
        let route_table = template.add_resource(Resource::new(
            format!("PrivateRouteTable{}", zone),
            RouteTable::new(network.vpc.reference()).tags(application_tags()),
        )?)?;
        template.add_resource(Resource::new(
            format!("NatRoute{}", zone),
            Route::new(route_table.reference(), ANYWHERE).nat_gateway(nat.reference()),
        )?)?;
        template.add_resource(Resource::new(
            format!("PrivateSubnetRouteTableAssociation{}", zone),
            SubnetRouteTableAssociation::new(subnet.reference(), route_table.reference()),
        )?)?;

        private_subnets.push(subnet);
    }

    add_public_network_outputs(&mut template, &network)?;
    for subnet in &private_subnets {
        add_subnet_output(&mut template, subnet, "Private subnet ID")?;
    }

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_resource_counts() {
        let template = generate_template().unwrap();

        assert_eq!(template.resources().count(), 21);
        assert_eq!(template.resources_of_type("AWS::EC2::Subnet").count(), 4);
        assert_eq!(template.resources_of_type("AWS::EC2::NatGateway").count(), 2);
        assert_eq!(template.resources_of_type("AWS::EC2::RouteTable").count(), 3);
        assert_eq!(template.parameters().count(), 2);
        assert_eq!(
            template.outputs().map(|o| o.name()).collect::<Vec<_>>(),
            vec![
                "VPCId",
                "PublicSubnet1",
                "PublicSubnet2",
                "StackID",
                "PrivateSubnet1",
                "PrivateSubnet2"
            ]
        );
    }

    #[test]
    fn test_private_subnet_routes_through_nat_of_its_zone() {
        let template = generate_template().unwrap();

        let nat = template.resource("Nat2").unwrap();
        assert_eq!(
            nat.properties(),
            &json!({
                "AllocationId": {"Fn::GetAtt": ["NatEip2", "AllocationId"]},
                "SubnetId": {"Ref": "PublicSubnet2"}
            })
        );

        let route = template.resource("NatRoute2").unwrap();
        assert_eq!(route.properties()["NatGatewayId"], json!({"Ref": "Nat2"}));
        assert_eq!(
            route.properties()["RouteTableId"],
            json!({"Ref": "PrivateRouteTable2"})
        );

        let subnet = template.resource("PrivateSubnet2").unwrap();
        assert_eq!(subnet.properties()["MapPublicIpOnLaunch"], json!(false));
        assert_eq!(subnet.properties()["CidrBlock"], json!("10.0.2.0/24"));
    }

    #[test]
    fn test_nat_addresses_wait_for_attachment() {
        let template = generate_template().unwrap();
        for name in ["NatEip1", "NatEip2"] {
            let eip = template.resource(name).unwrap();
            assert_eq!(eip.dependencies(), ["AttachGateway"]);
            assert_eq!(eip.properties(), &json!({"Domain": "vpc"}));
        }
    }
}
