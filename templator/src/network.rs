use stack_defs::ec2::{
    InternetGateway, Route, RouteTable, Subnet, SubnetRouteTableAssociation, Vpc,
    VpcGatewayAttachment,
};
use stack_defs::{
    Expr, LogicalId, Output, Parameter, Resource, Tags, Template, TemplateError, AWS_STACK_ID,
    AWS_STACK_NAME,
};

pub(crate) const VPC_CIDR: &str = "10.0.0.0/16";
pub(crate) const ANYWHERE: &str = "0.0.0.0/0";

/// One subnet of the VPC, placed in `<region><zone>`.
pub(crate) struct SubnetLayout {
    pub name: &'static str,
    pub cidr: &'static str,
    pub zone: &'static str,
    pub name_tag: &'static str,
    pub public: bool,
}

pub(crate) const PUBLIC_SUBNETS: [SubnetLayout; 2] = [
    SubnetLayout {
        name: "PublicSubnet1",
        cidr: "10.0.0.0/24",
        zone: "a",
        name_tag: "public-10.0.0.0",
        public: true,
    },
    SubnetLayout {
        name: "PublicSubnet2",
        cidr: "10.0.3.0/24",
        zone: "b",
        name_tag: "public-10.0.3.0",
        public: true,
    },
];

/// Handles of the internet facing tier shared by the infrastructure stacks.
pub(crate) struct PublicNetwork {
    pub vpc: LogicalId,
    pub attachment: LogicalId,
    pub public_subnets: Vec<LogicalId>,
}

pub(crate) fn application_tags() -> Tags {
    Tags::new().with("Application", Expr::reference(AWS_STACK_ID))
}

/// `Fn::Join` of the region parameter and a zone letter, e.g. `eu-west-1a`.
pub(crate) fn availability_zone(region: &LogicalId, zone: &str) -> Expr {
    Expr::join("", vec![region.reference(), Expr::from(zone)])
}

/// `EnvName` and `AWSRegion`, returning the region used to place subnets.
pub(crate) fn add_environment_parameters(
    template: &mut Template,
) -> Result<LogicalId, TemplateError> {
    template.add_parameter(
        Parameter::string("EnvName").description("The name of the environment being deployed."),
    )?;
    template.add_parameter(
        Parameter::string("AWSRegion")
            .description("The name of the region the environment should be deployed."),
    )
}

pub(crate) fn add_subnet(
    template: &mut Template,
    vpc: &LogicalId,
    region: &LogicalId,
    layout: &SubnetLayout,
) -> Result<LogicalId, TemplateError> {
    template.add_resource(Resource::new(
        layout.name,
        Subnet::new(vpc.reference(), layout.cidr)
            .availability_zone(availability_zone(region, layout.zone))
            .map_public_ip_on_launch(layout.public)
            .tags(application_tags().with("Name", layout.name_tag)),
    )?)
}

/// VPC, internet gateway, public route table and the public subnets.
pub(crate) fn add_public_network(
    template: &mut Template,
    region: &LogicalId,
) -> Result<PublicNetwork, TemplateError> {
    let vpc = template.add_resource(Resource::new(
        "VPC",
        Vpc::new(VPC_CIDR)
            .enable_dns_hostnames(true)
            .tags(application_tags()),
    )?)?;

    let internet_gateway = template.add_resource(Resource::new(
        "InternetGateway",
        InternetGateway::new().tags(application_tags()),
    )?)?;

    let attachment = template.add_resource(Resource::new(
        "AttachGateway",
        VpcGatewayAttachment::internet_gateway(vpc.reference(), internet_gateway.reference()),
    )?)?;

    let public_route_table = template.add_resource(Resource::new(
        "PublicRouteTable",
        RouteTable::new(vpc.reference()).tags(application_tags()),
    )?)?;

    // The gateway can only be a route target once it is attached to the VPC.
    template.add_resource(
        Resource::new(
            "Route",
            Route::new(public_route_table.reference(), ANYWHERE)
                .gateway(internet_gateway.reference()),
        )?
        .depends_on(&attachment),
    )?;

    let mut public_subnets = Vec::with_capacity(PUBLIC_SUBNETS.len());
    for (index, layout) in PUBLIC_SUBNETS.iter().enumerate() {
        let subnet = add_subnet(template, &vpc, region, layout)?;
        template.add_resource(Resource::new(
            format!("SubnetRouteTableAssociation{}", index + 1),
            SubnetRouteTableAssociation::new(subnet.reference(), public_route_table.reference()),
        )?)?;
        public_subnets.push(subnet);
    }

    Ok(PublicNetwork {
        vpc,
        attachment,
        public_subnets,
    })
}

pub(crate) fn add_subnet_output(
    template: &mut Template,
    subnet: &LogicalId,
    description: &str,
) -> Result<LogicalId, TemplateError> {
    template.add_output(Output::new(subnet.as_str(), subnet.reference()).description(description))
}

/// `VPCId`, one output per public subnet and `StackID`.
pub(crate) fn add_public_network_outputs(
    template: &mut Template,
    network: &PublicNetwork,
) -> Result<(), TemplateError> {
    template.add_output(Output::new("VPCId", network.vpc.reference()).description("VPC Id"))?;
    for subnet in &network.public_subnets {
        add_subnet_output(template, subnet, "Public subnet ID")?;
    }
    template.add_output(
        Output::new("StackID", Expr::reference(AWS_STACK_NAME)).description("Stack ID"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn public_network() -> (Template, PublicNetwork) {
        let mut template = Template::new();
        let region = add_environment_parameters(&mut template).unwrap();
        let network = add_public_network(&mut template, &region).unwrap();
        (template, network)
    }

    #[test]
    fn test_public_network_resources() {
        let (template, network) = public_network();

        assert_eq!(network.vpc.as_str(), "VPC");
        assert_eq!(network.attachment.as_str(), "AttachGateway");
        assert_eq!(
            network
                .public_subnets
                .iter()
                .map(LogicalId::as_str)
                .collect::<Vec<_>>(),
            vec!["PublicSubnet1", "PublicSubnet2"]
        );
        assert_eq!(template.resources().count(), 9);
        assert!(template.to_value().is_ok());
    }

    #[test]
    fn test_route_waits_for_attachment() {
        let (template, _) = public_network();
        let route = template.resource("Route").unwrap();
        assert_eq!(route.dependencies(), ["AttachGateway"]);
        assert_eq!(
            route.properties()["GatewayId"],
            json!({"Ref": "InternetGateway"})
        );
    }

    #[test]
    fn test_subnet_zone_follows_region_parameter() {
        let (template, _) = public_network();
        assert_eq!(
            template.resource("PublicSubnet2").unwrap().properties()["AvailabilityZone"],
            json!({"Fn::Join": ["", [{"Ref": "AWSRegion"}, "b"]]})
        );
    }
}
