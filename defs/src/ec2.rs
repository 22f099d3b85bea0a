//! Property sets of the EC2 resource types used by the stack templates.
//!
//! Each struct serializes to the provider's `Properties` object. Required
//! properties are constructor arguments, optional ones are builder methods.

use serde::Serialize;

use crate::{Expr, ResourceProperties, Tags};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    cidr_block: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_dns_hostnames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl Vpc {
    pub fn new(cidr_block: impl Into<Expr>) -> Self {
        Vpc {
            cidr_block: cidr_block.into(),
            enable_dns_hostnames: None,
            tags: None,
        }
    }

    pub fn enable_dns_hostnames(mut self, enabled: bool) -> Self {
        self.enable_dns_hostnames = Some(enabled);
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

impl ResourceProperties for Vpc {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::VPC";
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternetGateway {
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl InternetGateway {
    pub fn new() -> Self {
        InternetGateway::default()
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

impl ResourceProperties for InternetGateway {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::InternetGateway";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcGatewayAttachment {
    vpc_id: Expr,
    internet_gateway_id: Expr,
}

impl VpcGatewayAttachment {
    pub fn internet_gateway(vpc_id: impl Into<Expr>, gateway_id: impl Into<Expr>) -> Self {
        VpcGatewayAttachment {
            vpc_id: vpc_id.into(),
            internet_gateway_id: gateway_id.into(),
        }
    }
}

impl ResourceProperties for VpcGatewayAttachment {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::VPCGatewayAttachment";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTable {
    vpc_id: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl RouteTable {
    pub fn new(vpc_id: impl Into<Expr>) -> Self {
        RouteTable {
            vpc_id: vpc_id.into(),
            tags: None,
        }
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

impl ResourceProperties for RouteTable {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::RouteTable";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    route_table_id: Expr,
    destination_cidr_block: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway_id: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nat_gateway_id: Option<Expr>,
}

impl Route {
    pub fn new(route_table_id: impl Into<Expr>, destination_cidr_block: impl Into<Expr>) -> Self {
        Route {
            route_table_id: route_table_id.into(),
            destination_cidr_block: destination_cidr_block.into(),
            gateway_id: None,
            nat_gateway_id: None,
        }
    }

    /// Internet gateway target.
    pub fn gateway(mut self, gateway_id: impl Into<Expr>) -> Self {
        self.gateway_id = Some(gateway_id.into());
        self
    }

    pub fn nat_gateway(mut self, nat_gateway_id: impl Into<Expr>) -> Self {
        self.nat_gateway_id = Some(nat_gateway_id.into());
        self
    }
}

impl ResourceProperties for Route {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::Route";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    vpc_id: Expr,
    cidr_block: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability_zone: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_public_ip_on_launch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl Subnet {
    pub fn new(vpc_id: impl Into<Expr>, cidr_block: impl Into<Expr>) -> Self {
        Subnet {
            vpc_id: vpc_id.into(),
            cidr_block: cidr_block.into(),
            availability_zone: None,
            map_public_ip_on_launch: None,
            tags: None,
        }
    }

    pub fn availability_zone(mut self, zone: impl Into<Expr>) -> Self {
        self.availability_zone = Some(zone.into());
        self
    }

    pub fn map_public_ip_on_launch(mut self, enabled: bool) -> Self {
        self.map_public_ip_on_launch = Some(enabled);
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

impl ResourceProperties for Subnet {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::Subnet";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociation {
    subnet_id: Expr,
    route_table_id: Expr,
}

impl SubnetRouteTableAssociation {
    pub fn new(subnet_id: impl Into<Expr>, route_table_id: impl Into<Expr>) -> Self {
        SubnetRouteTableAssociation {
            subnet_id: subnet_id.into(),
            route_table_id: route_table_id.into(),
        }
    }
}

impl ResourceProperties for SubnetRouteTableAssociation {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::SubnetRouteTableAssociation";
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Eip {
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_id: Option<Expr>,
}

impl Eip {
    /// Elastic IP allocated for use in a VPC.
    pub fn vpc() -> Self {
        Eip {
            domain: Some("vpc".to_string()),
            ..Default::default()
        }
    }

    pub fn instance(mut self, instance_id: impl Into<Expr>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }
}

impl ResourceProperties for Eip {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::EIP";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NatGateway {
    allocation_id: Expr,
    subnet_id: Expr,
}

impl NatGateway {
    pub fn new(allocation_id: impl Into<Expr>, subnet_id: impl Into<Expr>) -> Self {
        NatGateway {
            allocation_id: allocation_id.into(),
            subnet_id: subnet_id.into(),
        }
    }
}

impl ResourceProperties for NatGateway {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::NatGateway";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpProtocol {
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "udp")]
    Udp,
    #[serde(rename = "icmp")]
    Icmp,
    #[serde(rename = "-1")]
    All,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupRule {
    ip_protocol: IpProtocol,
    from_port: i32,
    to_port: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cidr_ip: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_security_group_id: Option<Expr>,
}

impl SecurityGroupRule {
    fn ports(ip_protocol: IpProtocol, from_port: i32, to_port: i32) -> Self {
        SecurityGroupRule {
            ip_protocol,
            from_port,
            to_port,
            cidr_ip: None,
            destination_security_group_id: None,
        }
    }

    pub fn cidr(
        ip_protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        cidr_ip: impl Into<Expr>,
    ) -> Self {
        SecurityGroupRule {
            cidr_ip: Some(cidr_ip.into()),
            ..SecurityGroupRule::ports(ip_protocol, from_port, to_port)
        }
    }

    /// Single port open to `cidr_ip`.
    pub fn port(ip_protocol: IpProtocol, port: i32, cidr_ip: impl Into<Expr>) -> Self {
        SecurityGroupRule::cidr(ip_protocol, port, port, cidr_ip)
    }

    /// ICMP echo request, every code.
    pub fn icmp_echo(cidr_ip: impl Into<Expr>) -> Self {
        SecurityGroupRule::cidr(IpProtocol::Icmp, 8, -1, cidr_ip)
    }

    /// Egress rule whose peer is another security group.
    pub fn to_group(
        ip_protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        group_id: impl Into<Expr>,
    ) -> Self {
        SecurityGroupRule {
            destination_security_group_id: Some(group_id.into()),
            ..SecurityGroupRule::ports(ip_protocol, from_port, to_port)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    group_description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    security_group_ingress: Vec<SecurityGroupRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    security_group_egress: Vec<SecurityGroupRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vpc_id: Option<Expr>,
}

impl SecurityGroup {
    pub fn new(group_description: impl Into<String>) -> Self {
        SecurityGroup {
            group_description: group_description.into(),
            security_group_ingress: vec![],
            security_group_egress: vec![],
            vpc_id: None,
        }
    }

    pub fn vpc(mut self, vpc_id: impl Into<Expr>) -> Self {
        self.vpc_id = Some(vpc_id.into());
        self
    }

    pub fn ingress(mut self, rule: SecurityGroupRule) -> Self {
        self.security_group_ingress.push(rule);
        self
    }

    pub fn egress(mut self, rule: SecurityGroupRule) -> Self {
        self.security_group_egress.push(rule);
        self
    }
}

impl ResourceProperties for SecurityGroup {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::SecurityGroup";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    // The provider schema types the index as a string.
    device_index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subnet_id: Option<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    group_set: Vec<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    associate_public_ip_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete_on_termination: Option<bool>,
}

impl NetworkInterface {
    pub fn new(device_index: u32) -> Self {
        NetworkInterface {
            device_index: device_index.to_string(),
            subnet_id: None,
            group_set: vec![],
            associate_public_ip_address: None,
            delete_on_termination: None,
        }
    }

    pub fn subnet(mut self, subnet_id: impl Into<Expr>) -> Self {
        self.subnet_id = Some(subnet_id.into());
        self
    }

    pub fn security_group(mut self, group_id: impl Into<Expr>) -> Self {
        self.group_set.push(group_id.into());
        self
    }

    pub fn associate_public_ip_address(mut self, enabled: bool) -> Self {
        self.associate_public_ip_address = Some(enabled);
        self
    }

    pub fn delete_on_termination(mut self, enabled: bool) -> Self {
        self.delete_on_termination = Some(enabled);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    image_id: Expr,
    instance_type: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iam_instance_profile: Option<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    network_interfaces: Vec<NetworkInterface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl Instance {
    pub fn new(image_id: impl Into<Expr>, instance_type: impl Into<Expr>) -> Self {
        Instance {
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            key_name: None,
            iam_instance_profile: None,
            network_interfaces: vec![],
            user_data: None,
            tags: None,
        }
    }

    pub fn key_name(mut self, key_name: impl Into<Expr>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn iam_instance_profile(mut self, profile: impl Into<Expr>) -> Self {
        self.iam_instance_profile = Some(profile.into());
        self
    }

    pub fn network_interface(mut self, interface: NetworkInterface) -> Self {
        self.network_interfaces.push(interface);
        self
    }

    /// Must already be base64 encoded, usually through `Expr::base64`.
    pub fn user_data(mut self, user_data: impl Into<Expr>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

impl ResourceProperties for Instance {
    const RESOURCE_TYPE: &'static str = "AWS::EC2::Instance";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AWS_STACK_ID;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_public_subnet_properties() {
        let subnet = Subnet::new(Expr::reference("VPC"), "10.0.0.0/24")
            .availability_zone(Expr::join(
                "",
                vec![Expr::reference("AWSRegion"), Expr::from("a")],
            ))
            .map_public_ip_on_launch(true)
            .tags(
                Tags::new()
                    .with("Name", "public-10.0.0.0")
                    .with("Application", Expr::reference(AWS_STACK_ID)),
            );

        assert_eq!(
            serde_json::to_value(&subnet).unwrap(),
            json!({
                "VpcId": {"Ref": "VPC"},
                "CidrBlock": "10.0.0.0/24",
                "AvailabilityZone": {"Fn::Join": ["", [{"Ref": "AWSRegion"}, "a"]]},
                "MapPublicIpOnLaunch": true,
                "Tags": [
                    {"Key": "Application", "Value": {"Ref": "AWS::StackId"}},
                    {"Key": "Name", "Value": "public-10.0.0.0"}
                ]
            })
        );
    }

    #[test]
    fn test_security_group_rules() {
        let group = SecurityGroup::new("Security group for instances in the private subnet(s)")
            .vpc(Expr::reference("VPCId"))
            .ingress(SecurityGroupRule::icmp_echo("0.0.0.0/0"))
            .egress(SecurityGroupRule::port(IpProtocol::Udp, 53, "0.0.0.0/0"))
            .egress(SecurityGroupRule::to_group(
                IpProtocol::Tcp,
                0,
                65535,
                Expr::reference("PublicSecurityGroup"),
            ));

        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "GroupDescription": "Security group for instances in the private subnet(s)",
                "VpcId": {"Ref": "VPCId"},
                "SecurityGroupIngress": [
                    {"IpProtocol": "icmp", "FromPort": 8, "ToPort": -1, "CidrIp": "0.0.0.0/0"}
                ],
                "SecurityGroupEgress": [
                    {"IpProtocol": "udp", "FromPort": 53, "ToPort": 53, "CidrIp": "0.0.0.0/0"},
                    {
                        "IpProtocol": "tcp",
                        "FromPort": 0,
                        "ToPort": 65535,
                        "DestinationSecurityGroupId": {"Ref": "PublicSecurityGroup"}
                    }
                ]
            })
        );
    }

    #[test]
    fn test_instance_network_interface() {
        let instance = Instance::new(Expr::reference("AmiIdLinux"), Expr::reference("InstanceType"))
            .network_interface(
                NetworkInterface::new(0)
                    .subnet(Expr::reference("PublicSubnet"))
                    .security_group(Expr::reference("PublicSecurityGroup"))
                    .associate_public_ip_address(false)
                    .delete_on_termination(true),
            );

        assert_eq!(
            serde_json::to_value(&instance).unwrap()["NetworkInterfaces"],
            json!([{
                "DeviceIndex": "0",
                "SubnetId": {"Ref": "PublicSubnet"},
                "GroupSet": [{"Ref": "PublicSecurityGroup"}],
                "AssociatePublicIpAddress": false,
                "DeleteOnTermination": true
            }])
        );
    }

    #[test]
    fn test_gateway_attachment_and_routes() {
        let attachment = VpcGatewayAttachment::internet_gateway(
            Expr::reference("VPC"),
            Expr::reference("InternetGateway"),
        );
        assert_eq!(
            serde_json::to_value(&attachment).unwrap(),
            json!({"VpcId": {"Ref": "VPC"}, "InternetGatewayId": {"Ref": "InternetGateway"}})
        );

        let route = Route::new(Expr::reference("PrivateRouteTable1"), "0.0.0.0/0")
            .nat_gateway(Expr::reference("Nat1"));
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({
                "RouteTableId": {"Ref": "PrivateRouteTable1"},
                "DestinationCidrBlock": "0.0.0.0/0",
                "NatGatewayId": {"Ref": "Nat1"}
            })
        );
    }

    #[test]
    fn test_vpc_eip_bound_to_instance() {
        let eip = Eip::vpc().instance(Expr::reference("CSSServerInstance"));
        assert_eq!(
            serde_json::to_value(&eip).unwrap(),
            json!({"Domain": "vpc", "InstanceId": {"Ref": "CSSServerInstance"}})
        );
    }
}
