use stack_defs::ec2::{
    Eip, Instance, IpProtocol, NetworkInterface, SecurityGroup, SecurityGroupRule,
};
use stack_defs::{
    AuthenticationBlock, Expr, Init, InitCommand, InitConfig, InitFile, LogicalId, Output,
    Parameter, ParameterType, Resource, ResourceMetadata, Tags, Template, TemplateError,
    AWS_STACK_ID,
};

use crate::bootstrap::cfn_init_user_data;
use crate::network::ANYWHERE;

pub const DESCRIPTION: &str = "Counter Strike Source Dedicated Server instances Stack implementing a linux server and installing the dedicated server on it";

pub const INSTANCE: &str = "CSSServerInstance";
const S3_CREDENTIALS: &str = "S3AccessCreds";

const INSTANCE_TYPES: [&str; 11] = [
    "t2.nano",
    "t2.micro",
    "t2.small",
    "t2.medium",
    "c3.large",
    "c3.xlarge",
    "c3.2xlarge",
    "c4.large",
    "c4.xlarge",
    "c4.2xlarge",
    "m4.large",
];

const CIDR_PATTERN: &str = r"(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})/(\d{1,2})";

// Game traffic, all open to the world.
const GAME_PORTS: [(IpProtocol, i32); 7] = [
    (IpProtocol::Tcp, 1200),
    (IpProtocol::Udp, 1200),
    (IpProtocol::Udp, 27005),
    (IpProtocol::Tcp, 27015),
    (IpProtocol::Udp, 27015),
    (IpProtocol::Udp, 27020),
    (IpProtocol::Udp, 26901),
];

/// Artifacts the bootstrap agent downloads from the bucket.
struct ServerArtifacts {
    init_config_script: LogicalId,
    install_script: LogicalId,
    mods_archive: LogicalId,
    mapcycle: LogicalId,
    server_config: LogicalId,
    rcon_password: LogicalId,
}

fn add_string_parameter(
    template: &mut Template,
    name: &str,
    description: &str,
) -> Result<LogicalId, TemplateError> {
    template.add_parameter(Parameter::string(name).description(description))
}

fn web_egress(group: SecurityGroup) -> SecurityGroup {
    group
        .egress(SecurityGroupRule::icmp_echo(ANYWHERE))
        .egress(SecurityGroupRule::port(IpProtocol::Tcp, 80, ANYWHERE))
        .egress(SecurityGroupRule::port(IpProtocol::Tcp, 443, ANYWHERE))
}

fn public_security_group(vpc: &LogicalId, ssh_location: &LogicalId) -> SecurityGroup {
    let group = SecurityGroup::new("Security group for instances in the DMZ")
        .vpc(vpc.reference())
        .ingress(SecurityGroupRule::icmp_echo(ANYWHERE))
        .ingress(SecurityGroupRule::port(IpProtocol::Tcp, 22, ssh_location.reference()));
    let group = GAME_PORTS.iter().fold(group, |group, (protocol, port)| {
        group.ingress(SecurityGroupRule::port(*protocol, *port, ANYWHERE))
    });
    web_egress(group)
}

fn private_security_group(vpc: &LogicalId, public_group: &LogicalId) -> SecurityGroup {
    let group = SecurityGroup::new("Security group for instances in the private subnet(s)")
        .vpc(vpc.reference())
        .ingress(SecurityGroupRule::icmp_echo(ANYWHERE));
    web_egress(group)
        .egress(SecurityGroupRule::port(IpProtocol::Tcp, 53, ANYWHERE))
        .egress(SecurityGroupRule::port(IpProtocol::Udp, 53, ANYWHERE))
        .egress(SecurityGroupRule::to_group(
            IpProtocol::Tcp,
            0,
            65535,
            public_group.reference(),
        ))
        .egress(SecurityGroupRule::to_group(
            IpProtocol::Udp,
            0,
            65535,
            public_group.reference(),
        ))
}

fn server_metadata(
    credentials: AuthenticationBlock,
    artifacts: &ServerArtifacts,
) -> ResourceMetadata {
    let config = InitConfig::new()
        .source("/tmp/mods", artifacts.mods_archive.reference())
        .file(
            "/tmp/init-config.sh",
            InitFile::from_source(artifacts.init_config_script.reference())
                .authentication(S3_CREDENTIALS)
                .root_script(),
        )
        .file(
            "/tmp/css-install-script.sh",
            InitFile::from_source(artifacts.install_script.reference())
                .authentication(S3_CREDENTIALS)
                .root_script(),
        )
        .file(
            "/tmp/cfg/mapcycle.txt",
            InitFile::from_source(artifacts.mapcycle.reference()).authentication(S3_CREDENTIALS),
        )
        .file(
            "/tmp/cfg/server.cfg",
            InitFile::from_source(artifacts.server_config.reference())
                .authentication(S3_CREDENTIALS),
        )
        .command(
            "2_run_init-config.sh",
            InitCommand::new("/tmp/init-config.sh")
                .cwd("~")
                .env("RCON_PASSWORD", artifacts.rcon_password.reference()),
        );

    ResourceMetadata::new()
        .authentication(S3_CREDENTIALS, credentials)
        .init(Init::single(config))
}

/// Linux instance in a public subnet of an existing VPC that installs and
/// configures the dedicated server on first boot.
pub fn generate_template() -> Result<Template, TemplateError> {
    let mut template = Template::new();
    template.set_description(DESCRIPTION);

    let access_key = add_string_parameter(&mut template, "AWSAccessKey", "AWS Access Key")?;
    let secret_key = template.add_parameter(
        Parameter::string("AWSSecretKey")
            .description("AWS Secret Key")
            .no_echo(),
    )?;
    let instance_name = template.add_parameter(
        Parameter::string("CSSInstanceName")
            .description("The Name tag for the CSS Server instance.")
            .default("css-server"),
    )?;
    let image = template.add_parameter(
        Parameter::new("AmiIdLinux", ParameterType::ImageId)
            .description("Instances in the DMZ will use this AMI.")
            .default("ami-82f4dae7"),
    )?;
    let instance_type = template.add_parameter(
        Parameter::string("InstanceType")
            .description("Instances launched will use this EC2 Instance type.")
            .allowed_values(INSTANCE_TYPES)
            .default("t2.micro")
            .constraint_description("must be a supported EC2 Instance type"),
    )?;
    let vpc = template.add_parameter(Parameter::string("VPCId"))?;
    let public_subnet = template.add_parameter(Parameter::string("PublicSubnet"))?;
    template.add_parameter(Parameter::string("PrivateSubnet"))?;
    let iam_role = add_string_parameter(
        &mut template,
        "IAMRole",
        "The IAM role associated with the instances.",
    )?;
    let key_name = template.add_parameter(
        Parameter::new("KeyName", ParameterType::KeyPairName)
            .description("Instances in the Auto Scaling Group will use this ssh key."),
    )?;

    let artifacts = ServerArtifacts {
        init_config_script: add_string_parameter(
            &mut template,
            "CSSInitConfigScript",
            "File containing initial configuration script",
        )?,
        install_script: add_string_parameter(
            &mut template,
            "CSSInstallScript",
            "File containing installation script for CSS server",
        )?,
        mods_archive: add_string_parameter(
            &mut template,
            "CSSModsTgz",
            "File containing mods of the CSS server",
        )?,
        mapcycle: add_string_parameter(
            &mut template,
            "CSSMapcycleTxt",
            "mapcycle.txt of the CSS server",
        )?,
        server_config: add_string_parameter(
            &mut template,
            "CSSServerCfg",
            "server.cfg of the CSS server",
        )?,
        rcon_password: template.add_parameter(
            Parameter::string("CSSRconPassword")
                .description("RCON password of the CSS server")
                .no_echo(),
        )?,
    };
    let bucket = add_string_parameter(&mut template, "BucketName", "Name of the S3 Bucket")?;

    let ssh_location = template.add_parameter(
        Parameter::string("SSHLocation")
            .description("The IP address range that can be used to SSH to the EC2 instances")
            .length(9, 18)
            .default(ANYWHERE)
            .allowed_pattern(CIDR_PATTERN)
            .constraint_description("must be a valid IP CIDR range of the form x.x.x.x/x."),
    )?;

    let public_group = template.add_resource(Resource::new(
        "PublicSecurityGroup",
        public_security_group(&vpc, &ssh_location),
    )?)?;
    template.add_resource(Resource::new(
        "PrivateSecurityGroup",
        private_security_group(&vpc, &public_group),
    )?)?;

    let credentials =
        AuthenticationBlock::s3_access_keys(access_key.reference(), secret_key.reference())
            .bucket(bucket.reference());
    let instance = template.add_resource(
        Resource::new(
            INSTANCE,
            Instance::new(image.reference(), instance_type.reference())
                .key_name(key_name.reference())
                .iam_instance_profile(iam_role.reference())
                .network_interface(
                    NetworkInterface::new(0)
                        .subnet(public_subnet.reference())
                        .security_group(public_group.reference())
                        .associate_public_ip_address(false)
                        .delete_on_termination(true),
                )
                .tags(
                    Tags::new()
                        .with("Name", instance_name.reference())
                        .with("Application", Expr::reference(AWS_STACK_ID)),
                )
                .user_data(cfn_init_user_data(INSTANCE)),
        )?
        .metadata(server_metadata(credentials, &artifacts)),
    )?;

    let address = template.add_resource(Resource::new(
        "IPAddress",
        Eip::vpc().instance(instance.reference()),
    )?)?;
    template.add_output(
        Output::new("InstanceIp", address.reference()).description("Linux Instance IP"),
    )?;

    Ok(template)
}
