use stack_defs::{Template, TemplateError};

use crate::network::{add_environment_parameters, add_public_network, add_public_network_outputs};

pub const DESCRIPTION: &str = "Minimal infrastructure Stack with a VPC and 2 public subnets";

/// Public tier of the base infrastructure only, without NAT gateways and
/// private subnets.
pub fn generate_template() -> Result<Template, TemplateError> {
    let mut template = Template::new();
    template.set_description(DESCRIPTION);

    let region = add_environment_parameters(&mut template)?;

    let network = add_public_network(&mut template, &region)?;
    add_public_network_outputs(&mut template, &network)?;

    Ok(template)
}
